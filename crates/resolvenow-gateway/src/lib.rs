// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for ResolveNow.
//!
//! REST handlers and the socket surface are thin adapters over
//! [`resolvenow_ledger::ComplaintService`]; identities arrive as signed
//! bearer tokens.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod ws;

pub use auth::{AuthState, TokenSigner};
pub use error::{ApiError, ApiJson};
pub use server::{GatewayConfig, GatewayState, HealthState, build_router, start_server};
