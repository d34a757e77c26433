// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full complaint stack on a temp SQLite
//! database: storage, seeded demo users, event router and service.

use std::sync::Arc;

use resolvenow_bus::EventRouter;
use resolvenow_config::ResolveNowConfig;
use resolvenow_config::model::StorageConfig;
use resolvenow_core::{AttachmentPolicy, Identity, ResolveError, StorageAdapter, User};
use resolvenow_ledger::{ComplaintService, seed_demo_users};
use resolvenow_storage::SqliteStorage;

use crate::client::TestClient;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    session_buffer: usize,
    attachment_policy: Option<AttachmentPolicy>,
    seed_users: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            session_buffer: resolvenow_bus::DEFAULT_SESSION_BUFFER,
            attachment_policy: None,
            seed_users: true,
        }
    }

    /// Outbound buffer per test session.
    pub fn with_session_buffer(mut self, size: usize) -> Self {
        self.session_buffer = size;
        self
    }

    pub fn with_attachment_policy(mut self, policy: AttachmentPolicy) -> Self {
        self.attachment_policy = Some(policy);
        self
    }

    /// Skip inserting the demo admin, agent and user.
    pub fn without_demo_users(mut self) -> Self {
        self.seed_users = false;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, ResolveError> {
        let temp_dir = tempfile::TempDir::new().map_err(ResolveError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = ResolveNowConfig::default();
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };
        config.realtime.session_buffer = self.session_buffer;

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;

        let users = if self.seed_users {
            seed_demo_users(storage.as_ref()).await?
        } else {
            Vec::new()
        };

        let router = Arc::new(EventRouter::local(self.session_buffer));
        let policy = self
            .attachment_policy
            .unwrap_or_else(|| config.attachments.policy());
        let service =
            ComplaintService::from_store(storage.clone(), router.clone()).with_attachment_policy(policy);

        Ok(TestHarness {
            storage,
            router,
            service,
            users,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment on temp storage.
pub struct TestHarness {
    /// SQLite storage (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    pub router: Arc<EventRouter>,
    pub service: ComplaintService,
    /// Seeded demo users, empty when seeding was skipped.
    pub users: Vec<User>,
    pub config: ResolveNowConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn admin(&self) -> Identity {
        Identity::new("admin", resolvenow_core::Role::Admin)
    }

    pub fn agent(&self) -> Identity {
        Identity::new("agent", resolvenow_core::Role::Agent)
    }

    pub fn user(&self) -> Identity {
        Identity::new("user", resolvenow_core::Role::User)
    }

    /// Opens a session and binds `identity` to it.
    pub fn connect_as(&self, identity: &Identity) -> Result<TestClient, ResolveError> {
        let client = TestClient::connect(&self.service);
        client.authenticate(identity.clone())?;
        Ok(client)
    }

    pub fn connect_anonymous(&self) -> TestClient {
        TestClient::connect(&self.service)
    }

    pub async fn shutdown(&self) -> Result<(), ResolveError> {
        self.storage.close().await
    }
}
