// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Real-time fan-out for ResolveNow.
//!
//! Sessions join rooms in the [`RoomRegistry`]; the [`EventRouter`] expands
//! each [`DomainEvent`] into per-room payloads and hands them to a
//! [`BroadcastBackend`]. Delivery is best-effort and at-most-once.

pub mod backend;
pub mod events;
pub mod rooms;
pub mod router;

pub use backend::{BroadcastBackend, DeliveryReport, LocalBroadcast};
pub use events::{DomainEvent, EventKind, OutboundEvent};
pub use rooms::{ConnectionId, RoomKey, RoomRegistry};
pub use router::{DEFAULT_SESSION_BUFFER, EventRouter};
