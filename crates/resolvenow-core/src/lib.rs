// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the ResolveNow complaint subsystem.
//!
//! This crate provides the domain types, the error taxonomy, the access
//! policy, the pure document validation and the repository traits used
//! throughout the workspace. Storage backends implement traits defined here.

pub mod error;
pub mod policy;
pub mod traits;
pub mod types;
pub mod validation;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ErrorKind, ResolveError};
pub use policy::{can_access, ensure_access, ensure_admin};
pub use types::{
    Attachment, Category, Complaint, ComplaintFilter, ComplaintId, ContactMethod, Feedback,
    HealthStatus, Identity, Message, MessageId, NewComplaint, Priority, ReadReceipt, Resolution,
    Role, Status, StatusHistoryEntry, User, UserId,
};
pub use validation::AttachmentPolicy;

pub use traits::{
    ComplaintRepository, MessageRepository, PluginAdapter, StorageAdapter, UserDirectory,
};
