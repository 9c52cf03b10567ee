//! Domain layer - business logic and services

pub mod cart;
pub mod catalog;
pub mod identity;
pub mod orders;
pub mod repository;
pub mod reviews;
pub mod users;
pub mod validation;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use identity::{IdentityError, IdentityProvider};
pub use orders::OrderService;
pub use repository::Repositories;
pub use reviews::ReviewService;
pub use users::UserService;

use crate::config::Config;
use crate::contract::{MarketplaceError, User};
use std::sync::Arc;
use uuid::Uuid;

/// Every domain service, built once from the shared repositories
#[derive(Clone)]
pub struct Services {
    pub catalog: Arc<CatalogService>,
    pub cart: Arc<CartService>,
    pub orders: Arc<OrderService>,
    pub reviews: Arc<ReviewService>,
    pub users: Arc<UserService>,
}

impl Services {
    pub fn new(repos: Repositories, config: Config) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(repos.clone(), config.clone())),
            cart: Arc::new(CartService::new(repos.clone())),
            orders: Arc::new(OrderService::new(repos.clone(), config)),
            reviews: Arc::new(ReviewService::new(repos.clone())),
            users: Arc::new(UserService::new(repos)),
        }
    }
}

/// Log a storage failure and hide its details from the caller
pub(crate) fn internal(err: anyhow::Error) -> MarketplaceError {
    tracing::error!(error = ?err, "repository operation failed");
    MarketplaceError::Internal
}

/// Customer-facing operations require an enabled account
pub(crate) async fn require_active_user(
    repos: &Repositories,
    user_id: Uuid,
) -> Result<User, MarketplaceError> {
    repos
        .users
        .find_by_id(user_id)
        .await
        .map_err(internal)?
        .filter(User::is_enabled)
        .ok_or(MarketplaceError::Unauthorized)
}
