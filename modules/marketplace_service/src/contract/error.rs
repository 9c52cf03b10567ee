//! Contract error types for the marketplace service
//!
//! These errors are transport-agnostic; the REST layer maps each kind to an HTTP status.

/// Marketplace domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketplaceError {
    /// Missing or invalid session, or the account is not active
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not permitted (wrong role, not the owner, inactive provider)
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// Entity absent, or deliberately indistinguishable from "not yours"
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Malformed input
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Name already taken inside its uniqueness scope
    #[error("Name already exists: {name}")]
    DuplicateName { name: String },

    /// Uniqueness or state conflict other than naming
    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    /// Delete blocked by dependent rows
    #[error("Cannot delete {resource}: {count} dependent record(s) exist")]
    HasDependents { resource: String, count: u64 },

    /// Illegal order status move
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Internal error")]
    Internal,
}

impl MarketplaceError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn has_dependents(resource: &str, count: u64) -> Self {
        Self::HasDependents {
            resource: resource.to_string(),
            count,
        }
    }
}
