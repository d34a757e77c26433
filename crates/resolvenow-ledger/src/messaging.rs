// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-complaint message threads with read tracking.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use resolvenow_core::validation::normalize_message_text;
use resolvenow_core::{ComplaintId, Message, MessageId, MessageRepository, ResolveError, UserId};

/// Append-only message log on top of a [`MessageRepository`].
///
/// Access checks happen in the service before any call lands here.
#[derive(Clone)]
pub struct MessagingStore {
    repo: Arc<dyn MessageRepository>,
}

impl MessagingStore {
    pub fn new(repo: Arc<dyn MessageRepository>) -> Self {
        Self { repo }
    }

    /// Trims `text` and appends it to the thread.
    pub async fn append_message(
        &self,
        complaint_id: &ComplaintId,
        sender: &UserId,
        text: &str,
    ) -> Result<Message, ResolveError> {
        let text = normalize_message_text(text)?;
        let message = Message {
            id: MessageId::generate(),
            complaint_id: complaint_id.clone(),
            sender: sender.clone(),
            text,
            created_at: Utc::now(),
            read_by: Vec::new(),
        };
        self.repo.append(&message).await?;
        debug!(complaint_id = %complaint_id, message_id = %message.id, "message appended");
        Ok(message)
    }

    /// Chronological thread, oldest first.
    pub async fn list_messages(
        &self,
        complaint_id: &ComplaintId,
    ) -> Result<Vec<Message>, ResolveError> {
        self.repo.list_for_complaint(complaint_id).await
    }

    /// Receipts `reader` on every message sent by someone else.
    pub async fn mark_read(
        &self,
        complaint_id: &ComplaintId,
        reader: &UserId,
    ) -> Result<u64, ResolveError> {
        let added = self.repo.mark_read(complaint_id, reader, Utc::now()).await?;
        if added > 0 {
            debug!(complaint_id = %complaint_id, reader = %reader, added, "messages marked read");
        }
        Ok(added)
    }

    pub async fn unread_count_for(
        &self,
        complaint_id: &ComplaintId,
        viewer: &UserId,
    ) -> Result<u64, ResolveError> {
        self.repo.unread_count(complaint_id, viewer).await
    }

    pub async fn delete_thread(&self, complaint_id: &ComplaintId) -> Result<u64, ResolveError> {
        self.repo.delete_for_complaint(complaint_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvenow_core::ErrorKind;
    use resolvenow_storage::MemoryStore;

    fn store() -> MessagingStore {
        MessagingStore::new(Arc::new(MemoryStore::default()))
    }

    #[tokio::test]
    async fn append_trims_and_rejects_empty() {
        let store = store();
        let id = ComplaintId::from_ordinal(1);
        let msg = store
            .append_message(&id, &UserId::from("u1"), "  Any update?  ")
            .await
            .unwrap();
        assert_eq!(msg.text, "Any update?");
        assert!(msg.read_by.is_empty());

        let err = store
            .append_message(&id, &UserId::from("u1"), "   ")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.list_messages(&id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mark_read_skips_own_messages_and_is_idempotent() {
        let store = store();
        let id = ComplaintId::from_ordinal(1);
        let (u1, a1) = (UserId::from("u1"), UserId::from("a1"));
        store.append_message(&id, &u1, "first").await.unwrap();
        store.append_message(&id, &a1, "second").await.unwrap();
        store.append_message(&id, &u1, "third").await.unwrap();

        assert_eq!(store.unread_count_for(&id, &a1).await.unwrap(), 2);
        assert_eq!(store.mark_read(&id, &a1).await.unwrap(), 2);
        assert_eq!(store.mark_read(&id, &a1).await.unwrap(), 0);
        assert_eq!(store.unread_count_for(&id, &a1).await.unwrap(), 0);

        let thread = store.list_messages(&id).await.unwrap();
        let texts: Vec<_> = thread.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
        for m in &thread {
            assert!(!m.is_read_by(&m.sender));
        }
    }

    #[tokio::test]
    async fn concurrent_readers_do_not_lose_receipts() {
        let store = store();
        let id = ComplaintId::from_ordinal(3);
        store
            .append_message(&id, &UserId::from("u1"), "hello")
            .await
            .unwrap();

        let mut handles = Vec::new();
        for reader in ["a1", "root", "a2", "a3"] {
            let store = store.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                store.mark_read(&id, &UserId::from(reader)).await.unwrap()
            }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap(), 1);
        }
        let thread = store.list_messages(&id).await.unwrap();
        assert_eq!(thread[0].read_by.len(), 4);
    }
}
