//! Identity provider abstraction
//!
//! Sessions are issued by the external auth provider. This module only resolves
//! a presented session token to the principal it belongs to.

use crate::contract::Principal;
use async_trait::async_trait;

/// Error type for identity lookups
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Resolves session tokens to principals
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns `None` for unknown or expired tokens
    async fn authenticate(&self, token: &str) -> Result<Option<Principal>, IdentityError>;
}
