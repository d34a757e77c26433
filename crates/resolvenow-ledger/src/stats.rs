// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derived per-user, per-agent and portal-wide counts.
//!
//! Each aggregate is a set of independent count queries. A failed query
//! fails the aggregate and the caller may simply retry it.

use serde::Serialize;

use resolvenow_core::{
    Complaint, ComplaintFilter, ComplaintRepository, ResolveError, Status, User, UserId,
};

/// Dashboard counts for a submitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitterStats {
    pub total: u64,
    pub pending: u64,
    pub assigned: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub closed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStats {
    pub total: u64,
    pub assigned: u64,
    pub in_progress: u64,
    pub resolved: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_complaints: u64,
    pub pending_complaints: u64,
    pub resolved_complaints: u64,
    pub total_users: u64,
    pub total_agents: u64,
}

/// An agent with their open and resolved workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentWorkload {
    #[serde(flatten)]
    pub agent: User,
    pub assigned_complaints: u64,
    pub resolved_complaints: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    #[serde(flatten)]
    pub user: User,
    pub complaints_count: u64,
}

/// A complaint annotated with the viewer's unread badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintSummary {
    #[serde(flatten)]
    pub complaint: Complaint,
    pub unread_messages: u64,
}

async fn count(
    repo: &dyn ComplaintRepository,
    base: &ComplaintFilter,
    statuses: &[Status],
) -> Result<u64, ResolveError> {
    repo.count_by_filter(&base.clone().with_statuses(statuses))
        .await
}

pub(crate) async fn submitter_stats(
    repo: &dyn ComplaintRepository,
    submitter: &UserId,
) -> Result<SubmitterStats, ResolveError> {
    let base = ComplaintFilter::submitted_by(submitter);
    Ok(SubmitterStats {
        total: count(repo, &base, &[]).await?,
        pending: count(repo, &base, &[Status::Pending]).await?,
        assigned: count(repo, &base, &[Status::Assigned]).await?,
        in_progress: count(repo, &base, &[Status::InProgress]).await?,
        resolved: count(repo, &base, &[Status::Resolved]).await?,
        closed: count(repo, &base, &[Status::Closed]).await?,
    })
}

pub(crate) async fn agent_stats(
    repo: &dyn ComplaintRepository,
    agent: &UserId,
) -> Result<AgentStats, ResolveError> {
    let base = ComplaintFilter::assigned_to(agent);
    Ok(AgentStats {
        total: count(repo, &base, &[]).await?,
        assigned: count(repo, &base, &[Status::Assigned]).await?,
        in_progress: count(repo, &base, &[Status::InProgress]).await?,
        resolved: count(repo, &base, &[Status::Resolved]).await?,
    })
}

pub(crate) async fn agent_workload(
    repo: &dyn ComplaintRepository,
    agent: User,
) -> Result<AgentWorkload, ResolveError> {
    let base = ComplaintFilter::assigned_to(&agent.id);
    Ok(AgentWorkload {
        assigned_complaints: count(repo, &base, &[Status::Assigned, Status::InProgress]).await?,
        resolved_complaints: count(repo, &base, &[Status::Resolved]).await?,
        agent,
    })
}

pub(crate) async fn user_activity(
    repo: &dyn ComplaintRepository,
    user: User,
) -> Result<UserActivity, ResolveError> {
    Ok(UserActivity {
        complaints_count: count(repo, &ComplaintFilter::submitted_by(&user.id), &[]).await?,
        user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvenow_core::Role;

    #[test]
    fn workload_flattens_user_fields() {
        let w = AgentWorkload {
            agent: User {
                id: UserId::from("a1"),
                name: "Agent Sarah".into(),
                email: "agent@resolvenow.com".into(),
                role: Role::Agent,
                phone: None,
            },
            assigned_complaints: 2,
            resolved_complaints: 1,
        };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["name"], "Agent Sarah");
        assert_eq!(json["assignedComplaints"], 2);
        assert_eq!(json["resolvedComplaints"], 1);
    }

    #[test]
    fn stats_use_camel_case() {
        let json = serde_json::to_value(SubmitterStats::default()).unwrap();
        assert!(json.get("inProgress").is_some());
        let json = serde_json::to_value(AdminStats::default()).unwrap();
        assert!(json.get("totalAgents").is_some());
    }
}
