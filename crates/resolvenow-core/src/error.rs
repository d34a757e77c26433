// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the ResolveNow complaint subsystem.
//!
//! The first four variants are the domain taxonomy every inbound action can
//! fail with. They are terminal for the action that raised them and carry
//! enough context for an API layer to render a precise message. The remaining
//! variants cover infrastructure faults.

use strum::Display;
use thiserror::Error;

/// The primary error type used across all ResolveNow crates.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A complaint, message or user does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The acting identity is not permitted to perform the action.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The action is illegal for the complaint's current lifecycle state,
    /// or names a status that does not exist.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Input failed validation (missing field, rating out of range, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport errors (listener bind failure, socket I/O).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Distinguishable failure kind, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AccessDenied,
    InvalidState,
    Validation,
    Config,
    Storage,
    Transport,
    Internal,
}

impl ResolveError {
    /// Shorthand for a missing complaint.
    pub fn complaint_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "complaint",
            id: id.to_string(),
        }
    }

    /// Shorthand for a missing user or agent.
    pub fn user_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "user",
            id: id.to_string(),
        }
    }

    /// Wraps any storage-layer error.
    pub fn storage(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage {
            source: Box::new(e),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AccessDenied(_) => ErrorKind::AccessDenied,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Config(_) => ErrorKind::Config,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// True for the four domain kinds that callers can act on.
    pub fn is_domain(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound
                | ErrorKind::AccessDenied
                | ErrorKind::InvalidState
                | ErrorKind::Validation
        )
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(e: serde_json::Error) -> Self {
        Self::storage(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_render_snake_case() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(ErrorKind::AccessDenied.to_string(), "access_denied");
        assert_eq!(ErrorKind::InvalidState.to_string(), "invalid_state");
        assert_eq!(ErrorKind::Validation.to_string(), "validation");
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = ResolveError::complaint_not_found("CMP000042");
        assert_eq!(err.to_string(), "complaint not found: CMP000042");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.is_domain());
    }

    #[test]
    fn storage_errors_are_not_domain_errors() {
        let err = ResolveError::storage(std::io::Error::other("disk"));
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(!err.is_domain());
    }
}
