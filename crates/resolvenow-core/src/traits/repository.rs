// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository traits consumed by the ledger.
//!
//! Implementations must make every single-document write atomic. The
//! complaint ordinal counter never decreases, and `mark_read` must append
//! receipts without a read-modify-write cycle so concurrent viewers never
//! corrupt the receipt list.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ResolveError;
use crate::types::{Complaint, ComplaintFilter, ComplaintId, Message, Role, User, UserId};

/// CRUD and query operations over complaint documents.
#[async_trait]
pub trait ComplaintRepository: Send + Sync {
    /// Reserves the next complaint ordinal. Values are strictly increasing
    /// and are never handed out twice, even after deletes.
    async fn next_ordinal(&self) -> Result<u64, ResolveError>;

    /// Inserts a new complaint. Fails if the id already exists.
    async fn create(&self, complaint: &Complaint) -> Result<(), ResolveError>;

    async fn find_by_id(&self, id: &ComplaintId) -> Result<Option<Complaint>, ResolveError>;

    /// Returns matching complaints, newest first.
    async fn find_by_filter(&self, filter: &ComplaintFilter)
    -> Result<Vec<Complaint>, ResolveError>;

    async fn count_by_filter(&self, filter: &ComplaintFilter) -> Result<u64, ResolveError>;

    /// Replaces a stored complaint document (last writer wins).
    async fn save(&self, complaint: &Complaint) -> Result<(), ResolveError>;

    /// Removes a complaint. Returns false when it did not exist.
    async fn delete(&self, id: &ComplaintId) -> Result<bool, ResolveError>;
}

/// Append-only message log with per-reader receipts.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn append(&self, message: &Message) -> Result<(), ResolveError>;

    /// Messages for a complaint in chronological order, oldest first.
    async fn list_for_complaint(&self, id: &ComplaintId) -> Result<Vec<Message>, ResolveError>;

    /// Atomically records `reader` on every message it did not send and has
    /// not yet read. Returns the number of receipts added.
    async fn mark_read(
        &self,
        id: &ComplaintId,
        reader: &UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, ResolveError>;

    /// Messages not sent by `viewer` that lack a receipt from `viewer`.
    async fn unread_count(&self, id: &ComplaintId, viewer: &UserId) -> Result<u64, ResolveError>;

    /// Removes the thread of a deleted complaint. Returns the number removed.
    async fn delete_for_complaint(&self, id: &ComplaintId) -> Result<u64, ResolveError>;
}

/// Read access to user records, plus upsert for seeding.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, ResolveError>;

    /// Users holding `role`, ordered by name.
    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, ResolveError>;

    async fn upsert_user(&self, user: &User) -> Result<(), ResolveError>;
}
