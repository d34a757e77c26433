// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementation of the repository traits.
//!
//! State lives in maps guarded by `tokio::sync::RwLock` and is lost on
//! restart. Writes take the write lock for the whole mutation, so each
//! single-document write and each `mark_read` is atomic within the process.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use resolvenow_core::{
    Complaint, ComplaintFilter, ComplaintId, ComplaintRepository, HealthStatus, Message,
    MessageRepository, PluginAdapter, ReadReceipt, ResolveError, Role, StorageAdapter, User,
    UserDirectory, UserId,
};

#[derive(Default)]
pub struct MemoryStore {
    sequence: AtomicU64,
    // Keyed by ordinal so iteration order is creation order.
    complaints: RwLock<BTreeMap<u64, Complaint>>,
    messages: RwLock<HashMap<ComplaintId, Vec<Message>>>,
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn ordinal_of(id: &ComplaintId) -> Result<u64, ResolveError> {
    id.ordinal()
        .ok_or_else(|| ResolveError::Validation(format!("malformed complaint id `{id}`")))
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ResolveError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ResolveError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStore {
    async fn initialize(&self) -> Result<(), ResolveError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), ResolveError> {
        Ok(())
    }
}

#[async_trait]
impl ComplaintRepository for MemoryStore {
    async fn next_ordinal(&self) -> Result<u64, ResolveError> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn create(&self, complaint: &Complaint) -> Result<(), ResolveError> {
        let key = ordinal_of(&complaint.complaint_id)?;
        let mut map = self.complaints.write().await;
        if map.contains_key(&key) {
            return Err(ResolveError::Validation(format!(
                "complaint {} already exists",
                complaint.complaint_id
            )));
        }
        map.insert(key, complaint.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ComplaintId) -> Result<Option<Complaint>, ResolveError> {
        let Some(key) = id.ordinal() else {
            return Ok(None);
        };
        Ok(self.complaints.read().await.get(&key).cloned())
    }

    async fn find_by_filter(
        &self,
        filter: &ComplaintFilter,
    ) -> Result<Vec<Complaint>, ResolveError> {
        let map = self.complaints.read().await;
        Ok(map
            .values()
            .rev()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn count_by_filter(&self, filter: &ComplaintFilter) -> Result<u64, ResolveError> {
        let map = self.complaints.read().await;
        Ok(map.values().filter(|c| filter.matches(c)).count() as u64)
    }

    async fn save(&self, complaint: &Complaint) -> Result<(), ResolveError> {
        let key = ordinal_of(&complaint.complaint_id)?;
        let mut map = self.complaints.write().await;
        match map.get_mut(&key) {
            Some(slot) => {
                *slot = complaint.clone();
                Ok(())
            }
            None => Err(ResolveError::complaint_not_found(&complaint.complaint_id)),
        }
    }

    async fn delete(&self, id: &ComplaintId) -> Result<bool, ResolveError> {
        let Some(key) = id.ordinal() else {
            return Ok(false);
        };
        Ok(self.complaints.write().await.remove(&key).is_some())
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn append(&self, message: &Message) -> Result<(), ResolveError> {
        self.messages
            .write()
            .await
            .entry(message.complaint_id.clone())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn list_for_complaint(&self, id: &ComplaintId) -> Result<Vec<Message>, ResolveError> {
        Ok(self
            .messages
            .read()
            .await
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn mark_read(
        &self,
        id: &ComplaintId,
        reader: &UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, ResolveError> {
        let mut map = self.messages.write().await;
        let Some(thread) = map.get_mut(id) else {
            return Ok(0);
        };
        let mut added = 0;
        for msg in thread.iter_mut().filter(|m| m.is_unread_for(reader)) {
            msg.read_by.push(ReadReceipt {
                reader: reader.clone(),
                read_at: at,
            });
            added += 1;
        }
        Ok(added)
    }

    async fn unread_count(&self, id: &ComplaintId, viewer: &UserId) -> Result<u64, ResolveError> {
        let map = self.messages.read().await;
        Ok(map
            .get(id)
            .map(|thread| thread.iter().filter(|m| m.is_unread_for(viewer)).count() as u64)
            .unwrap_or(0))
    }

    async fn delete_for_complaint(&self, id: &ComplaintId) -> Result<u64, ResolveError> {
        Ok(self
            .messages
            .write()
            .await
            .remove(id)
            .map(|thread| thread.len() as u64)
            .unwrap_or(0))
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, ResolveError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, ResolveError> {
        let mut users: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn upsert_user(&self, user: &User) -> Result<(), ResolveError> {
        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        Ok(())
    }
}
