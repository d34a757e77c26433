// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use resolvenow_core::{PluginAdapter, ResolveError};
use resolvenow_ledger::ComplaintService;

use crate::auth::{AuthState, TokenSigner, auth_middleware};
use crate::handlers;
use crate::ws;

/// State for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    pub start_time: std::time::Instant,
    pub storage: Arc<dyn PluginAdapter>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub service: ComplaintService,
    pub auth: AuthState,
    pub health: HealthState,
}

/// Gateway configuration, mirrored from the `[server]` and `[auth]`
/// sections so this crate does not depend on the config crate.
#[derive(Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub signing_key: Option<String>,
    pub cors_permissive: bool,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "[redacted]"))
            .field("cors_permissive", &self.cors_permissive)
            .finish()
    }
}

impl GatewayConfig {
    pub fn auth_state(&self) -> Result<AuthState, ResolveError> {
        let signer = self.signing_key.as_deref().map(TokenSigner::new).transpose()?;
        if signer.is_none() {
            tracing::warn!("no signing key configured, every API request will be rejected");
        }
        Ok(AuthState::new(signer))
    }
}

/// Builds the full application router.
///
/// - GET /health (public)
/// - /v1/... complaint, agent and admin routes (bearer auth)
/// - GET /ws (auth via query token or an `authenticate` message)
pub fn build_router(state: GatewayState, cors_permissive: bool) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/complaints", post(handlers::submit_complaint))
        .route("/v1/complaints/mine", get(handlers::my_complaints))
        .route("/v1/complaints/mine/stats", get(handlers::my_stats))
        .route(
            "/v1/complaints/{id}",
            get(handlers::get_complaint).delete(handlers::delete_complaint),
        )
        .route(
            "/v1/complaints/{id}/messages",
            get(handlers::list_messages).post(handlers::send_message),
        )
        .route("/v1/complaints/{id}/unread", get(handlers::unread_count))
        .route("/v1/complaints/{id}/feedback", post(handlers::submit_feedback))
        .route("/v1/complaints/{id}/status", put(handlers::transition_status))
        .route("/v1/complaints/{id}/assign", put(handlers::assign_complaint))
        .route("/v1/agent/complaints", get(handlers::assigned_complaints))
        .route("/v1/agent/stats", get(handlers::agent_stats))
        .route("/v1/admin/stats", get(handlers::admin_stats))
        .route("/v1/admin/complaints", get(handlers::all_complaints))
        .route(
            "/v1/admin/agents",
            get(handlers::agents_with_workload).post(handlers::register_agent),
        )
        .route("/v1/admin/users", get(handlers::users_with_complaint_counts))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state.clone());

    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Binds and serves until `shutdown` is cancelled.
pub async fn start_server(
    config: &GatewayConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), ResolveError> {
    let app = build_router(state, config.cors_permissive);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ResolveError::Transport {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| ResolveError::Transport {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway stopped");
    Ok(())
}
