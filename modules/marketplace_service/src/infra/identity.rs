//! Session-table backed identity provider

use crate::contract::{Principal, Role, UserStatus};
use crate::domain::identity::{IdentityError, IdentityProvider};
use crate::infra::storage::entity::{session, user};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;

/// Resolves tokens against the `sessions` table written by the auth provider
pub struct SessionIdentityProvider {
    db: Arc<DatabaseConnection>,
}

impl SessionIdentityProvider {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentityProvider {
    async fn authenticate(&self, token: &str) -> Result<Option<Principal>, IdentityError> {
        let found = session::Entity::find()
            .filter(session::Column::Token.eq(token))
            .filter(session::Column::ExpiresAt.gt(Utc::now()))
            .find_also_related(user::Entity)
            .one(&*self.db)
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let Some((_, Some(account))) = found else {
            return Ok(None);
        };

        // Disabled or moderated accounts cannot hold a session
        if !account.is_active || account.status != UserStatus::Active.as_str() {
            tracing::debug!(user_id = %account.id, "session belongs to a disabled account");
            return Ok(None);
        }

        let role = match account.role.parse::<Role>() {
            Ok(role) => role,
            Err(_) => {
                tracing::warn!(user_id = %account.id, role = %account.role, "unknown role on session user");
                return Ok(None);
            }
        };

        Ok(Some(Principal {
            user_id: account.id,
            email: account.email,
            role,
        }))
    }
}
