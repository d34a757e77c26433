// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access policy: who may view or act on a complaint.
//!
//! The grant is derived per request and never persisted. Admins see every
//! complaint, submitters see their own, and agents see only complaints
//! currently assigned to them.

use crate::error::ResolveError;
use crate::types::{Complaint, Identity, Role};

/// Returns true iff `identity` may read or write `complaint`.
pub fn can_access(identity: &Identity, complaint: &Complaint) -> bool {
    match identity.role {
        Role::Admin => true,
        Role::Agent => {
            complaint.assigned_agent.as_ref() == Some(&identity.id)
                || complaint.submitter == identity.id
        }
        Role::User => complaint.submitter == identity.id,
    }
}

/// Like [`can_access`], but surfaces a refusal as [`ResolveError::AccessDenied`].
pub fn ensure_access(identity: &Identity, complaint: &Complaint) -> Result<(), ResolveError> {
    if can_access(identity, complaint) {
        Ok(())
    } else {
        Err(ResolveError::AccessDenied(format!(
            "{} `{}` may not access complaint {}",
            identity.role, identity.id, complaint.complaint_id
        )))
    }
}

/// Requires an admin identity for the named action.
pub fn ensure_admin(identity: &Identity, action: &str) -> Result<(), ResolveError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(ResolveError::AccessDenied(format!(
            "{action} requires the admin role"
        )))
    }
}
