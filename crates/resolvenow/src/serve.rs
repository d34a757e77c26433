// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `resolvenow serve` command.

use std::sync::Arc;

use tracing::{error, info};

use resolvenow_bus::EventRouter;
use resolvenow_config::ResolveNowConfig;
use resolvenow_core::{PluginAdapter, ResolveError, StorageAdapter};
use resolvenow_gateway::{GatewayConfig, GatewayState, HealthState, start_server};
use resolvenow_ledger::ComplaintService;
use resolvenow_storage::SqliteStorage;

use crate::shutdown;

/// Opens storage, builds the event router and service, and serves the
/// gateway until a shutdown signal arrives.
pub async fn run_serve(config: ResolveNowConfig) -> Result<(), ResolveError> {
    init_tracing(&config.server.log_level);

    info!("starting resolvenow serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    info!(path = %config.storage.database_path, "storage ready");

    // The router lives for the whole process and is shared by every
    // component that publishes.
    let router = Arc::new(EventRouter::local(config.realtime.session_buffer));
    let service = ComplaintService::from_store(storage.clone(), router)
        .with_attachment_policy(config.attachments.policy());

    let gateway_config = GatewayConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        signing_key: config.auth.signing_key.clone(),
        cors_permissive: config.server.cors_permissive,
    };
    let state = GatewayState {
        service,
        auth: gateway_config.auth_state()?,
        health: HealthState {
            start_time: std::time::Instant::now(),
            storage: storage.clone(),
        },
    };

    let cancel = shutdown::install_signal_handler();
    let served = start_server(&gateway_config, state, cancel).await;

    if let Err(e) = storage.shutdown().await {
        error!(error = %e, "storage shutdown failed");
    }
    info!("resolvenow stopped");
    served
}

/// `RUST_LOG` wins; otherwise `resolvenow=<log_level>,warn`.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("resolvenow={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
