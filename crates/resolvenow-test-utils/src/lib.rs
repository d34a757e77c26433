// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for ResolveNow integration tests.
//!
//! # Components
//!
//! - [`TestHarness`] - temp SQLite store, seeded demo users, event router and service
//! - [`TestClient`] - an in-process socket session with captured events

pub mod client;
pub mod harness;

pub use client::TestClient;
pub use harness::{TestHarness, TestHarnessBuilder};
