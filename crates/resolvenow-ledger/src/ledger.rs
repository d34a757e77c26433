// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status ledger: validates and applies lifecycle transitions to a
//! complaint document.
//!
//! Every function checks all preconditions before touching the document,
//! so a rejected transition leaves the history unchanged. Persisting and
//! publishing are the caller's job.

use chrono::{DateTime, Utc};

use resolvenow_core::validation::validate_rating;
use resolvenow_core::{
    Complaint, Feedback, Identity, Resolution, ResolveError, Role, Status, User, ensure_admin,
};

pub const DEFAULT_RESOLUTION: &str = "Complaint resolved by agent";
pub const FEEDBACK_CLOSE_COMMENT: &str = "Complaint closed after feedback submission";

fn ensure_open(complaint: &Complaint) -> Result<(), ResolveError> {
    if complaint.status.is_terminal() {
        Err(ResolveError::InvalidState(format!(
            "complaint {} is closed",
            complaint.complaint_id
        )))
    } else {
        Ok(())
    }
}

/// Assigns `agent` and moves the complaint to `assigned` from any open state.
pub fn assign(
    complaint: &mut Complaint,
    agent: &User,
    actor: &Identity,
    now: DateTime<Utc>,
) -> Result<(), ResolveError> {
    ensure_admin(actor, "assigning a complaint")?;
    ensure_open(complaint)?;
    if agent.role != Role::Agent {
        return Err(ResolveError::Validation(format!(
            "`{}` is not an agent",
            agent.id
        )));
    }

    complaint.assigned_agent = Some(agent.id.clone());
    complaint.record_transition(
        Status::Assigned,
        Some(format!("Assigned to agent: {}", agent.name)),
        Some(actor.id.clone()),
        now,
    );
    Ok(())
}

/// Moves an open complaint to `target` on behalf of an agent or admin.
///
/// `closed` cannot be requested here; it is reached only through feedback.
pub fn transition(
    complaint: &mut Complaint,
    target: Status,
    comment: Option<String>,
    actor: &Identity,
    now: DateTime<Utc>,
) -> Result<(), ResolveError> {
    match actor.role {
        Role::Admin => {}
        Role::Agent if complaint.assigned_agent.as_ref() == Some(&actor.id) => {}
        Role::Agent => {
            return Err(ResolveError::AccessDenied(format!(
                "complaint {} is not assigned to `{}`",
                complaint.complaint_id, actor.id
            )));
        }
        Role::User => {
            return Err(ResolveError::AccessDenied(
                "only the assigned agent or an admin may change status".into(),
            ));
        }
    }
    if target == Status::Closed {
        return Err(ResolveError::InvalidState(
            "complaints are closed by submitting feedback".into(),
        ));
    }
    ensure_open(complaint)?;
    if target == Status::Assigned && complaint.assigned_agent.is_none() {
        return Err(ResolveError::InvalidState(format!(
            "complaint {} has no agent; use assignment instead",
            complaint.complaint_id
        )));
    }

    let comment = comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    if target == Status::Resolved {
        complaint.resolution = Some(Resolution {
            description: comment
                .clone()
                .unwrap_or_else(|| DEFAULT_RESOLUTION.to_string()),
            resolved_at: now,
            resolved_by: actor.id.clone(),
        });
    }
    complaint.record_transition(target, comment, Some(actor.id.clone()), now);
    Ok(())
}

/// Records the submitter's feedback and closes a resolved complaint.
pub fn submit_feedback(
    complaint: &mut Complaint,
    rating: u8,
    comment: Option<String>,
    actor: &Identity,
    now: DateTime<Utc>,
) -> Result<(), ResolveError> {
    if complaint.submitter != actor.id {
        return Err(ResolveError::AccessDenied(
            "only the submitter may give feedback".into(),
        ));
    }
    if complaint.status != Status::Resolved {
        return Err(ResolveError::InvalidState(format!(
            "feedback requires a resolved complaint, {} is {}",
            complaint.complaint_id, complaint.status
        )));
    }
    validate_rating(rating)?;

    complaint.feedback = Some(Feedback {
        rating,
        comment: comment.filter(|c| !c.trim().is_empty()),
        submitted_at: now,
    });
    complaint.record_transition(
        Status::Closed,
        Some(FEEDBACK_CLOSE_COMMENT.to_string()),
        Some(actor.id.clone()),
        now,
    );
    Ok(())
}
