// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage and repository traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use resolvenow_config::model::StorageConfig;
use resolvenow_core::{
    Complaint, ComplaintFilter, ComplaintId, ComplaintRepository, HealthStatus, Message,
    MessageRepository, PluginAdapter, ResolveError, Role, StorageAdapter, User, UserDirectory,
    UserId,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// The database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, ResolveError> {
        self.db.get().ok_or_else(|| ResolveError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self) -> Result<(), ResolveError> {
        if let Some(db) = self.db.get() {
            db.connection()
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                    Ok(())
                })
                .await
                .map_err(crate::database::map_tr_err)?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ResolveError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ResolveError> {
        self.checkpoint().await
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ResolveError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ResolveError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ResolveError> {
        self.db()?;
        self.checkpoint().await
    }
}

#[async_trait]
impl ComplaintRepository for SqliteStorage {
    async fn next_ordinal(&self) -> Result<u64, ResolveError> {
        queries::complaints::next_ordinal(self.db()?).await
    }

    async fn create(&self, complaint: &Complaint) -> Result<(), ResolveError> {
        if queries::complaints::insert_complaint(self.db()?, complaint).await? {
            Ok(())
        } else {
            Err(ResolveError::Validation(format!(
                "complaint {} already exists",
                complaint.complaint_id
            )))
        }
    }

    async fn find_by_id(&self, id: &ComplaintId) -> Result<Option<Complaint>, ResolveError> {
        queries::complaints::get_complaint(self.db()?, id).await
    }

    async fn find_by_filter(
        &self,
        filter: &ComplaintFilter,
    ) -> Result<Vec<Complaint>, ResolveError> {
        queries::complaints::list_complaints(self.db()?, filter).await
    }

    async fn count_by_filter(&self, filter: &ComplaintFilter) -> Result<u64, ResolveError> {
        queries::complaints::count_complaints(self.db()?, filter).await
    }

    async fn save(&self, complaint: &Complaint) -> Result<(), ResolveError> {
        if queries::complaints::update_complaint(self.db()?, complaint).await? {
            Ok(())
        } else {
            Err(ResolveError::complaint_not_found(&complaint.complaint_id))
        }
    }

    async fn delete(&self, id: &ComplaintId) -> Result<bool, ResolveError> {
        queries::complaints::delete_complaint(self.db()?, id).await
    }
}

#[async_trait]
impl MessageRepository for SqliteStorage {
    async fn append(&self, message: &Message) -> Result<(), ResolveError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    async fn list_for_complaint(&self, id: &ComplaintId) -> Result<Vec<Message>, ResolveError> {
        queries::messages::get_messages_for_complaint(self.db()?, id).await
    }

    async fn mark_read(
        &self,
        id: &ComplaintId,
        reader: &UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, ResolveError> {
        queries::messages::mark_read(self.db()?, id, reader, at).await
    }

    async fn unread_count(&self, id: &ComplaintId, viewer: &UserId) -> Result<u64, ResolveError> {
        queries::messages::unread_count(self.db()?, id, viewer).await
    }

    async fn delete_for_complaint(&self, id: &ComplaintId) -> Result<u64, ResolveError> {
        queries::messages::delete_messages_for_complaint(self.db()?, id).await
    }
}

#[async_trait]
impl UserDirectory for SqliteStorage {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, ResolveError> {
        queries::users::get_user(self.db()?, id).await
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, ResolveError> {
        queries::users::list_users_by_role(self.db()?, role).await
    }

    async fn upsert_user(&self, user: &User) -> Result<(), ResolveError> {
        queries::users::upsert_user(self.db()?, user).await
    }
}
