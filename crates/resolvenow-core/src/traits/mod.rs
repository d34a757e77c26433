// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for storage backends and external collaborators.
//!
//! Backends implement [`PluginAdapter`] for lifecycle and health, and the
//! repository traits for data access. All use `#[async_trait]` so they can
//! be held as trait objects.

pub mod adapter;
pub mod repository;
pub mod storage;

pub use adapter::PluginAdapter;
pub use repository::{ComplaintRepository, MessageRepository, UserDirectory};
pub use storage::StorageAdapter;
