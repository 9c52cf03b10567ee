//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories

use crate::contract::*;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Raised (wrapped in `anyhow::Error`) when a write hits a unique index
#[derive(Debug, thiserror::Error)]
#[error("unique constraint violated: {0}")]
pub struct UniqueViolation(pub String);

/// Whether an error chain carries a [`UniqueViolation`]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<UniqueViolation>().is_some()
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>>;

    async fn list(&self, filter: &UserFilter, page: &PageRequest) -> Result<(Vec<User>, u64)>;

    async fn update(&self, user: &User) -> Result<User>;

    /// Delete the user together with its cart items, reviews and sessions
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait ProviderRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProviderProfile>>;

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<ProviderProfile>>;

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<ProviderProfile>>;

    async fn list(
        &self,
        filter: &ProviderFilter,
        page: &PageRequest,
    ) -> Result<(Vec<ProviderProfile>, u64)>;

    /// Insert the profile and promote its user to PROVIDER in one transaction
    async fn create_with_role_promotion(&self, profile: &ProviderProfile) -> Result<ProviderProfile>;

    async fn update(&self, profile: &ProviderProfile) -> Result<ProviderProfile>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>>;

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Category>>;

    /// Exact name lookup inside one scope (`None` = global)
    async fn find_by_name(&self, name: &str, provider_id: Option<Uuid>) -> Result<Option<Category>>;

    async fn list(
        &self,
        filter: &CategoryFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Category>, u64)>;

    async fn create(&self, category: &Category) -> Result<Category>;

    async fn update(&self, category: &Category) -> Result<Category>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait CuisineRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cuisine>>;

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Cuisine>>;

    /// Return the cuisine with this name, creating it when missing
    async fn upsert_by_name(&self, name: &str) -> Result<Cuisine>;

    async fn list(&self, search: Option<&str>, page: &PageRequest) -> Result<(Vec<Cuisine>, u64)>;
}

#[async_trait]
pub trait MealRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Meal>>;

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Meal>>;

    async fn list(&self, filter: &MealFilter, page: &PageRequest) -> Result<(Vec<Meal>, u64)>;

    async fn create(&self, meal: &Meal) -> Result<Meal>;

    async fn update(&self, meal: &Meal) -> Result<Meal>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64>;

    async fn count_by_categories(&self, category_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>>;

    async fn count_by_cuisines(&self, cuisine_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>>;

    async fn count_by_providers(&self, provider_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    /// All rows of a user's cart, newest first
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CartItem>>;

    async fn find(&self, user_id: Uuid, meal_id: Uuid) -> Result<Option<CartItem>>;

    /// Atomic increment-or-insert keyed by (user_id, meal_id)
    async fn add_quantity(&self, user_id: Uuid, meal_id: Uuid, quantity: i32) -> Result<CartItem>;

    async fn set_quantity(&self, id: Uuid, quantity: i32) -> Result<CartItem>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Returns the number of removed rows
    async fn clear(&self, user_id: Uuid) -> Result<u64>;

    async fn remove_meals(&self, user_id: Uuid, meal_ids: &[Uuid]) -> Result<u64>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the order and all of its items in one transaction
    async fn create_with_items(&self, order: &Order, items: &[OrderItem]) -> Result<Order>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>>;

    async fn list(&self, filter: &OrderFilter, page: &PageRequest) -> Result<(Vec<Order>, u64)>;

    async fn items_for_orders(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItem>>;

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        actual_delivery_time: Option<DateTime<Utc>>,
    ) -> Result<Order>;

    /// Number of order lines referencing a meal
    async fn count_items_for_meal(&self, meal_id: Uuid) -> Result<u64>;

    async fn count_for_customer(&self, customer_id: Uuid) -> Result<u64>;

    async fn count_by_providers(&self, provider_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>>;

    /// Whether the customer has a DELIVERED order containing the meal
    async fn has_delivered_meal(&self, customer_id: Uuid, meal_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>>;

    async fn find_by_customer_and_meal(
        &self,
        customer_id: Uuid,
        meal_id: Uuid,
    ) -> Result<Option<Review>>;

    async fn create(&self, review: &Review) -> Result<Review>;

    async fn update(&self, review: &Review) -> Result<Review>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn list_for_meal(&self, meal_id: Uuid, page: &PageRequest) -> Result<(Vec<Review>, u64)>;

    /// Every rating of the meal, unpaginated
    async fn ratings_for_meal(&self, meal_id: Uuid) -> Result<Vec<i32>>;

    /// Grouped count/sum per meal; meals without reviews are absent
    async fn rating_stats(&self, meal_ids: &[Uuid]) -> Result<HashMap<Uuid, RatingStats>>;
}

/// All repository handles, constructed once and shared by the services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub providers: Arc<dyn ProviderRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub cuisines: Arc<dyn CuisineRepository>,
    pub meals: Arc<dyn MealRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
}
