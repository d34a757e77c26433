// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Complaint lifecycle for ResolveNow.
//!
//! [`ledger`] holds the pure state machine, [`messaging`] the per-complaint
//! threads, and [`ComplaintService`] composes them with the repositories
//! and the event router.

pub mod ledger;
pub mod messaging;
pub mod seed;
pub mod service;
pub mod stats;

pub use messaging::MessagingStore;
pub use seed::{demo_users, seed_demo_users};
pub use service::ComplaintService;
pub use stats::{
    AdminStats, AgentStats, AgentWorkload, ComplaintSummary, SubmitterStats, UserActivity,
};
