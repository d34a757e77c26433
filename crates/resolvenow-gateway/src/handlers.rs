// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Every `/v1` handler receives the caller's [`Identity`] from the auth
//! middleware and defers all policy decisions to the complaint service.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use resolvenow_core::{
    Attachment, Complaint, ComplaintId, HealthStatus, Identity, Message, NewComplaint, User,
    UserId,
};
use resolvenow_ledger::{
    AdminStats, AgentStats, AgentWorkload, ComplaintSummary, SubmitterStats, UserActivity,
};

use crate::error::{ApiError, ApiJson};
use crate::server::GatewayState;

type ApiResult<T> = Result<T, ApiError>;

fn complaint_id(raw: &str) -> Result<ComplaintId, ApiError> {
    raw.parse::<ComplaintId>().map_err(ApiError::from)
}

/// Request body for POST /v1/complaints.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(flatten)]
    pub fields: NewComplaint,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub agent_id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterAgentRequest {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadResponse {
    pub unread_messages: u64,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let (status, detail) = match state.health.storage.health_check().await {
        Ok(HealthStatus::Healthy) => ("ok", None),
        Ok(HealthStatus::Degraded(d)) => ("degraded", Some(d)),
        Ok(HealthStatus::Unhealthy(d)) => ("unhealthy", Some(d)),
        Err(e) => ("unhealthy", Some(e.to_string())),
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        sessions: state.service.router().registry().session_count(),
        detail,
    })
}

/// POST /v1/complaints
pub async fn submit_complaint(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    ApiJson(body): ApiJson<SubmitRequest>,
) -> ApiResult<(StatusCode, Json<Complaint>)> {
    let complaint = state
        .service
        .submit_complaint(&identity, body.fields, body.attachments)
        .await?;
    Ok((StatusCode::CREATED, Json(complaint)))
}

/// GET /v1/complaints/mine
pub async fn my_complaints(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<ComplaintSummary>>> {
    Ok(Json(state.service.my_complaints(&identity).await?))
}

/// GET /v1/complaints/mine/stats
pub async fn my_stats(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<SubmitterStats>> {
    Ok(Json(state.service.submitter_stats(&identity).await?))
}

/// GET /v1/complaints/{id}
pub async fn get_complaint(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Json<Complaint>> {
    let id = complaint_id(&id)?;
    Ok(Json(state.service.get_complaint(&identity, &id).await?))
}

/// DELETE /v1/complaints/{id}
pub async fn delete_complaint(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = complaint_id(&id)?;
    state.service.delete_complaint(&identity, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/complaints/{id}/messages
///
/// Marks the returned messages as read for the caller.
pub async fn list_messages(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Message>>> {
    let id = complaint_id(&id)?;
    Ok(Json(state.service.list_messages(&identity, &id).await?))
}

/// POST /v1/complaints/{id}/messages
pub async fn send_message(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<MessageRequest>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    let id = complaint_id(&id)?;
    let message = state.service.send_message(&identity, &id, &body.text).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /v1/complaints/{id}/unread
pub async fn unread_count(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Json<UnreadResponse>> {
    let id = complaint_id(&id)?;
    let unread_messages = state.service.unread_count_for(&identity, &id).await?;
    Ok(Json(UnreadResponse { unread_messages }))
}

/// POST /v1/complaints/{id}/feedback
pub async fn submit_feedback(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<FeedbackRequest>,
) -> ApiResult<StatusCode> {
    let id = complaint_id(&id)?;
    state
        .service
        .submit_feedback(&identity, &id, body.rating, body.comment)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /v1/complaints/{id}/status
pub async fn transition_status(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusRequest>,
) -> ApiResult<Json<Complaint>> {
    let id = complaint_id(&id)?;
    let complaint = state
        .service
        .transition_status(&identity, &id, &body.status, body.comment)
        .await?;
    Ok(Json(complaint))
}

/// PUT /v1/complaints/{id}/assign
pub async fn assign_complaint(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<AssignRequest>,
) -> ApiResult<Json<Complaint>> {
    let id = complaint_id(&id)?;
    let complaint = state
        .service
        .assign_complaint(&identity, &id, &body.agent_id)
        .await?;
    Ok(Json(complaint))
}

/// GET /v1/agent/complaints
pub async fn assigned_complaints(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<ComplaintSummary>>> {
    Ok(Json(state.service.assigned_complaints(&identity).await?))
}

/// GET /v1/agent/stats
pub async fn agent_stats(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<AgentStats>> {
    Ok(Json(state.service.agent_stats(&identity).await?))
}

/// GET /v1/admin/stats
pub async fn admin_stats(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<AdminStats>> {
    Ok(Json(state.service.admin_stats(&identity).await?))
}

/// GET /v1/admin/complaints
pub async fn all_complaints(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<ComplaintSummary>>> {
    Ok(Json(state.service.all_complaints(&identity).await?))
}

/// GET /v1/admin/agents
pub async fn agents_with_workload(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<AgentWorkload>>> {
    Ok(Json(state.service.agents_with_workload(&identity).await?))
}

/// POST /v1/admin/agents
pub async fn register_agent(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
    ApiJson(body): ApiJson<RegisterAgentRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let agent = User {
        id: body.id,
        name: body.name,
        email: body.email,
        role: resolvenow_core::Role::Agent,
        phone: body.phone,
    };
    let agent = state.service.register_agent(&identity, agent).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

/// GET /v1/admin/users
pub async fn users_with_complaint_counts(
    State(state): State<GatewayState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<UserActivity>>> {
    Ok(Json(state.service.users_with_complaint_counts(&identity).await?))
}
