//! In-memory repositories and fixtures shared by the integration tests

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use marketplace_service::contract::*;
use marketplace_service::domain::repository::*;
use marketplace_service::domain::{IdentityError, IdentityProvider, Services};
use marketplace_service::Config;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

pub fn money(raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap()
}

/// Session table the REST tests log users into
#[derive(Clone, Default)]
pub struct StaticIdentityProvider {
    sessions: Arc<RwLock<HashMap<String, Principal>>>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: impl Into<String>, principal: Principal) {
        self.sessions.write().insert(token.into(), principal);
    }

    pub fn revoke(&self, token: &str) {
        self.sessions.write().remove(token);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn authenticate(&self, token: &str) -> Result<Option<Principal>, IdentityError> {
        Ok(self.sessions.read().get(token).cloned())
    }
}

#[derive(Default)]
pub struct Tables {
    pub users: HashMap<Uuid, User>,
    pub providers: HashMap<Uuid, ProviderProfile>,
    pub categories: HashMap<Uuid, Category>,
    pub cuisines: HashMap<Uuid, Cuisine>,
    pub meals: HashMap<Uuid, Meal>,
    pub cart: HashMap<Uuid, CartItem>,
    pub orders: HashMap<Uuid, Order>,
    pub order_items: HashMap<Uuid, OrderItem>,
    pub reviews: HashMap<Uuid, Review>,
}

/// One shared table set behind every repository trait
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            providers: Arc::new(self.clone()),
            categories: Arc::new(self.clone()),
            cuisines: Arc::new(self.clone()),
            meals: Arc::new(self.clone()),
            carts: Arc::new(self.clone()),
            orders: Arc::new(self.clone()),
            reviews: Arc::new(self.clone()),
        }
    }

    pub fn cart_len(&self) -> usize {
        self.tables.read().cart.len()
    }

    pub fn order_count(&self) -> usize {
        self.tables.read().orders.len()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn opt_contains_ci(haystack: &Option<String>, needle: &str) -> bool {
    haystack.as_deref().is_some_and(|h| contains_ci(h, needle))
}

/// Sort by creation time in the requested direction, then cut the requested page
fn paginate<T: Clone>(
    mut rows: Vec<T>,
    page: &PageRequest,
    created_at: impl Fn(&T) -> DateTime<Utc>,
) -> (Vec<T>, u64) {
    rows.sort_by_key(|r| created_at(r));
    if page.sort_order == SortOrder::Desc {
        rows.reverse();
    }
    let total = rows.len() as u64;
    let data = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    (data, total)
}

fn count_by<T>(rows: impl Iterator<Item = T>, ids: &[Uuid], key: impl Fn(&T) -> Option<Uuid>) -> HashMap<Uuid, u64> {
    let mut counts = HashMap::new();
    for row in rows {
        if let Some(id) = key(&row).filter(|id| ids.contains(id)) {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    counts
}

// ===== Users =====

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let t = self.tables.read();
        Ok(ids.iter().filter_map(|id| t.users.get(id).cloned()).collect())
    }

    async fn list(&self, filter: &UserFilter, page: &PageRequest) -> Result<(Vec<User>, u64)> {
        let rows: Vec<User> = self
            .tables
            .read()
            .users
            .values()
            .filter(|u| {
                filter
                    .search
                    .as_deref()
                    .is_none_or(|s| contains_ci(&u.name, s) || contains_ci(&u.email, s))
            })
            .filter(|u| filter.role.is_none_or(|r| u.role == r))
            .filter(|u| filter.status.is_none_or(|s| u.status == s))
            .cloned()
            .collect();
        Ok(paginate(rows, page, |u| u.created_at))
    }

    async fn update(&self, user: &User) -> Result<User> {
        let mut t = self.tables.write();
        let slot = t.users.get_mut(&user.id).ok_or_else(|| anyhow!("user missing"))?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut t = self.tables.write();
        t.cart.retain(|_, c| c.user_id != id);
        t.reviews.retain(|_, r| r.customer_id != id);
        let profile_ids: Vec<Uuid> = t
            .providers
            .values()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        t.categories
            .retain(|_, c| c.provider_id.is_none_or(|p| !profile_ids.contains(&p)));
        t.providers.retain(|_, p| p.user_id != id);
        t.users.remove(&id);
        Ok(())
    }
}

// ===== Providers =====

#[async_trait]
impl ProviderRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProviderProfile>> {
        Ok(self.tables.read().providers.get(&id).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<ProviderProfile>> {
        Ok(self
            .tables
            .read()
            .providers
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<ProviderProfile>> {
        let t = self.tables.read();
        Ok(ids.iter().filter_map(|id| t.providers.get(id).cloned()).collect())
    }

    async fn list(
        &self,
        filter: &ProviderFilter,
        page: &PageRequest,
    ) -> Result<(Vec<ProviderProfile>, u64)> {
        let rows: Vec<ProviderProfile> = self
            .tables
            .read()
            .providers
            .values()
            .filter(|p| {
                filter.search.as_deref().is_none_or(|s| {
                    contains_ci(&p.business_name, s) || opt_contains_ci(&p.description, s)
                })
            })
            .filter(|p| filter.is_active.is_none_or(|a| p.is_active == a))
            .cloned()
            .collect();
        Ok(paginate(rows, page, |p| p.created_at))
    }

    async fn create_with_role_promotion(&self, profile: &ProviderProfile) -> Result<ProviderProfile> {
        let mut t = self.tables.write();
        if t.providers.values().any(|p| p.user_id == profile.user_id) {
            return Err(UniqueViolation("provider_profiles.user_id".into()).into());
        }
        if let Some(user) = t.users.get_mut(&profile.user_id) {
            if user.role != Role::Admin {
                user.role = Role::Provider;
            }
        }
        t.providers.insert(profile.id, profile.clone());
        Ok(profile.clone())
    }

    async fn update(&self, profile: &ProviderProfile) -> Result<ProviderProfile> {
        let mut t = self.tables.write();
        let slot = t
            .providers
            .get_mut(&profile.id)
            .ok_or_else(|| anyhow!("provider missing"))?;
        *slot = profile.clone();
        Ok(profile.clone())
    }
}

// ===== Categories =====

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self.tables.read().categories.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Category>> {
        let t = self.tables.read();
        Ok(ids.iter().filter_map(|id| t.categories.get(id).cloned()).collect())
    }

    async fn find_by_name(&self, name: &str, provider_id: Option<Uuid>) -> Result<Option<Category>> {
        Ok(self
            .tables
            .read()
            .categories
            .values()
            .find(|c| c.name == name && c.provider_id == provider_id)
            .cloned())
    }

    async fn list(
        &self,
        filter: &CategoryFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Category>, u64)> {
        let rows: Vec<Category> = self
            .tables
            .read()
            .categories
            .values()
            .filter(|c| {
                filter
                    .search
                    .as_deref()
                    .is_none_or(|s| contains_ci(&c.name, s) || opt_contains_ci(&c.description, s))
            })
            .filter(|c| filter.is_active.is_none_or(|a| c.is_active == a))
            .filter(|c| filter.provider_id.is_none_or(|p| c.provider_id == Some(p)))
            .cloned()
            .collect();
        Ok(paginate(rows, page, |c| c.created_at))
    }

    async fn create(&self, category: &Category) -> Result<Category> {
        let mut t = self.tables.write();
        if t
            .categories
            .values()
            .any(|c| c.name == category.name && c.provider_id == category.provider_id)
        {
            return Err(UniqueViolation("categories.name".into()).into());
        }
        t.categories.insert(category.id, category.clone());
        Ok(category.clone())
    }

    async fn update(&self, category: &Category) -> Result<Category> {
        let mut t = self.tables.write();
        let slot = t
            .categories
            .get_mut(&category.id)
            .ok_or_else(|| anyhow!("category missing"))?;
        *slot = category.clone();
        Ok(category.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.tables.write().categories.remove(&id);
        Ok(())
    }
}

// ===== Cuisines =====

#[async_trait]
impl CuisineRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cuisine>> {
        Ok(self.tables.read().cuisines.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Cuisine>> {
        let t = self.tables.read();
        Ok(ids.iter().filter_map(|id| t.cuisines.get(id).cloned()).collect())
    }

    async fn upsert_by_name(&self, name: &str) -> Result<Cuisine> {
        let mut t = self.tables.write();
        if let Some(existing) = t.cuisines.values().find(|c| c.name == name) {
            return Ok(existing.clone());
        }
        let cuisine = Cuisine {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        t.cuisines.insert(cuisine.id, cuisine.clone());
        Ok(cuisine)
    }

    async fn list(&self, search: Option<&str>, page: &PageRequest) -> Result<(Vec<Cuisine>, u64)> {
        let rows: Vec<Cuisine> = self
            .tables
            .read()
            .cuisines
            .values()
            .filter(|c| search.is_none_or(|s| contains_ci(&c.name, s)))
            .cloned()
            .collect();
        Ok(paginate(rows, page, |c| c.created_at))
    }
}

// ===== Meals =====

#[async_trait]
impl MealRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Meal>> {
        Ok(self.tables.read().meals.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Meal>> {
        let t = self.tables.read();
        Ok(ids.iter().filter_map(|id| t.meals.get(id).cloned()).collect())
    }

    async fn list(&self, filter: &MealFilter, page: &PageRequest) -> Result<(Vec<Meal>, u64)> {
        let t = self.tables.read();
        let category_name = |m: &Meal| {
            m.category_id
                .and_then(|id| t.categories.get(&id))
                .map(|c| c.name.clone())
        };
        let cuisine_name = |m: &Meal| {
            m.cuisine_id
                .and_then(|id| t.cuisines.get(&id))
                .map(|c| c.name.clone())
        };

        let mut rows: Vec<Meal> = t
            .meals
            .values()
            .filter(|m| {
                filter.search.as_deref().is_none_or(|s| {
                    contains_ci(&m.name, s)
                        || opt_contains_ci(&m.description, s)
                        || opt_contains_ci(&m.ingredients, s)
                })
            })
            .filter(|m| {
                filter
                    .category
                    .as_deref()
                    .is_none_or(|s| opt_contains_ci(&category_name(m), s))
            })
            .filter(|m| {
                filter.category_ids.is_empty()
                    || m.category_id.is_some_and(|id| filter.category_ids.contains(&id))
            })
            .filter(|m| filter.price_min.is_none_or(|min| m.price >= min))
            .filter(|m| filter.price_max.is_none_or(|max| m.price <= max))
            .filter(|m| {
                filter
                    .cuisine
                    .as_deref()
                    .is_none_or(|s| opt_contains_ci(&cuisine_name(m), s))
            })
            .filter(|m| filter.is_vegan.is_none_or(|v| m.is_vegan == v))
            .filter(|m| filter.is_featured.is_none_or(|v| m.is_featured == v))
            .filter(|m| filter.provider_id.is_none_or(|p| m.provider_id == p))
            .filter(|m| filter.is_available.is_none_or(|v| m.is_available == v))
            .cloned()
            .collect();

        if page.sort_by == SortField::Price {
            rows.sort_by_key(|m| m.price);
            if page.sort_order == SortOrder::Desc {
                rows.reverse();
            }
            let total = rows.len() as u64;
            let data = rows
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.limit as usize)
                .collect();
            return Ok((data, total));
        }
        Ok(paginate(rows, page, |m| m.created_at))
    }

    async fn create(&self, meal: &Meal) -> Result<Meal> {
        self.tables.write().meals.insert(meal.id, meal.clone());
        Ok(meal.clone())
    }

    async fn update(&self, meal: &Meal) -> Result<Meal> {
        let mut t = self.tables.write();
        let slot = t.meals.get_mut(&meal.id).ok_or_else(|| anyhow!("meal missing"))?;
        *slot = meal.clone();
        Ok(meal.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut t = self.tables.write();
        t.meals.remove(&id);
        t.cart.retain(|_, c| c.meal_id != id);
        t.reviews.retain(|_, r| r.meal_id != id);
        Ok(())
    }

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64> {
        Ok(self
            .tables
            .read()
            .meals
            .values()
            .filter(|m| m.category_id == Some(category_id))
            .count() as u64)
    }

    async fn count_by_categories(&self, category_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>> {
        let t = self.tables.read();
        Ok(count_by(t.meals.values(), category_ids, |m| m.category_id))
    }

    async fn count_by_cuisines(&self, cuisine_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>> {
        let t = self.tables.read();
        Ok(count_by(t.meals.values(), cuisine_ids, |m| m.cuisine_id))
    }

    async fn count_by_providers(&self, provider_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>> {
        let t = self.tables.read();
        Ok(count_by(t.meals.values(), provider_ids, |m| Some(m.provider_id)))
    }
}

// ===== Cart =====

#[async_trait]
impl CartRepository for MemoryStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CartItem>> {
        let mut rows: Vec<CartItem> = self
            .tables
            .read()
            .cart
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|c| std::cmp::Reverse(c.created_at));
        Ok(rows)
    }

    async fn find(&self, user_id: Uuid, meal_id: Uuid) -> Result<Option<CartItem>> {
        Ok(self
            .tables
            .read()
            .cart
            .values()
            .find(|c| c.user_id == user_id && c.meal_id == meal_id)
            .cloned())
    }

    async fn add_quantity(&self, user_id: Uuid, meal_id: Uuid, quantity: i32) -> Result<CartItem> {
        let mut t = self.tables.write();
        let now = Utc::now();
        if let Some(item) = t
            .cart
            .values_mut()
            .find(|c| c.user_id == user_id && c.meal_id == meal_id)
        {
            item.quantity += quantity;
            item.updated_at = now;
            return Ok(item.clone());
        }
        let item = CartItem {
            id: Uuid::new_v4(),
            user_id,
            meal_id,
            quantity,
            created_at: now,
            updated_at: now,
        };
        t.cart.insert(item.id, item.clone());
        Ok(item)
    }

    async fn set_quantity(&self, id: Uuid, quantity: i32) -> Result<CartItem> {
        let mut t = self.tables.write();
        let item = t.cart.get_mut(&id).ok_or_else(|| anyhow!("cart item missing"))?;
        item.quantity = quantity;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.tables.write().cart.remove(&id);
        Ok(())
    }

    async fn clear(&self, user_id: Uuid) -> Result<u64> {
        let mut t = self.tables.write();
        let before = t.cart.len();
        t.cart.retain(|_, c| c.user_id != user_id);
        Ok((before - t.cart.len()) as u64)
    }

    async fn remove_meals(&self, user_id: Uuid, meal_ids: &[Uuid]) -> Result<u64> {
        let mut t = self.tables.write();
        let before = t.cart.len();
        t.cart
            .retain(|_, c| !(c.user_id == user_id && meal_ids.contains(&c.meal_id)));
        Ok((before - t.cart.len()) as u64)
    }
}

// ===== Orders =====

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_with_items(&self, order: &Order, items: &[OrderItem]) -> Result<Order> {
        let mut t = self.tables.write();
        t.orders.insert(order.id, order.clone());
        for item in items {
            t.order_items.insert(item.id, item.clone());
        }
        Ok(order.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.tables.read().orders.get(&id).cloned())
    }

    async fn list(&self, filter: &OrderFilter, page: &PageRequest) -> Result<(Vec<Order>, u64)> {
        let t = self.tables.read();
        let rows: Vec<Order> = t
            .orders
            .values()
            .filter(|o| {
                filter.search.as_deref().is_none_or(|s| {
                    contains_ci(&o.order_number, s)
                        || t.users
                            .get(&o.customer_id)
                            .is_some_and(|u| contains_ci(&u.name, s) || contains_ci(&u.email, s))
                        || t.providers
                            .get(&o.provider_id)
                            .is_some_and(|p| contains_ci(&p.business_name, s))
                })
            })
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .filter(|o| filter.customer_id.is_none_or(|c| o.customer_id == c))
            .filter(|o| filter.provider_id.is_none_or(|p| o.provider_id == p))
            .cloned()
            .collect();
        Ok(paginate(rows, page, |o| o.created_at))
    }

    async fn items_for_orders(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItem>> {
        let mut rows: Vec<OrderItem> = self
            .tables
            .read()
            .order_items
            .values()
            .filter(|i| order_ids.contains(&i.order_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.meal_name.cmp(&b.meal_name));
        Ok(rows)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        actual_delivery_time: Option<DateTime<Utc>>,
    ) -> Result<Order> {
        let mut t = self.tables.write();
        let order = t.orders.get_mut(&id).ok_or_else(|| anyhow!("order missing"))?;
        order.status = status;
        if actual_delivery_time.is_some() {
            order.actual_delivery_time = actual_delivery_time;
        }
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn count_items_for_meal(&self, meal_id: Uuid) -> Result<u64> {
        Ok(self
            .tables
            .read()
            .order_items
            .values()
            .filter(|i| i.meal_id == meal_id)
            .count() as u64)
    }

    async fn count_for_customer(&self, customer_id: Uuid) -> Result<u64> {
        Ok(self
            .tables
            .read()
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .count() as u64)
    }

    async fn count_by_providers(&self, provider_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>> {
        let t = self.tables.read();
        Ok(count_by(t.orders.values(), provider_ids, |o| Some(o.provider_id)))
    }

    async fn has_delivered_meal(&self, customer_id: Uuid, meal_id: Uuid) -> Result<bool> {
        let t = self.tables.read();
        Ok(t.order_items.values().any(|i| {
            i.meal_id == meal_id
                && t.orders.get(&i.order_id).is_some_and(|o| {
                    o.customer_id == customer_id && o.status == OrderStatus::Delivered
                })
        }))
    }
}

// ===== Reviews =====

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>> {
        Ok(self.tables.read().reviews.get(&id).cloned())
    }

    async fn find_by_customer_and_meal(
        &self,
        customer_id: Uuid,
        meal_id: Uuid,
    ) -> Result<Option<Review>> {
        Ok(self
            .tables
            .read()
            .reviews
            .values()
            .find(|r| r.customer_id == customer_id && r.meal_id == meal_id)
            .cloned())
    }

    async fn create(&self, review: &Review) -> Result<Review> {
        let mut t = self.tables.write();
        if t
            .reviews
            .values()
            .any(|r| r.customer_id == review.customer_id && r.meal_id == review.meal_id)
        {
            return Err(UniqueViolation("reviews.customer_id_meal_id".into()).into());
        }
        t.reviews.insert(review.id, review.clone());
        Ok(review.clone())
    }

    async fn update(&self, review: &Review) -> Result<Review> {
        let mut t = self.tables.write();
        let slot = t
            .reviews
            .get_mut(&review.id)
            .ok_or_else(|| anyhow!("review missing"))?;
        *slot = review.clone();
        Ok(review.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.tables.write().reviews.remove(&id);
        Ok(())
    }

    async fn list_for_meal(&self, meal_id: Uuid, page: &PageRequest) -> Result<(Vec<Review>, u64)> {
        let rows: Vec<Review> = self
            .tables
            .read()
            .reviews
            .values()
            .filter(|r| r.meal_id == meal_id)
            .cloned()
            .collect();
        Ok(paginate(rows, page, |r| r.created_at))
    }

    async fn ratings_for_meal(&self, meal_id: Uuid) -> Result<Vec<i32>> {
        Ok(self
            .tables
            .read()
            .reviews
            .values()
            .filter(|r| r.meal_id == meal_id)
            .map(|r| r.rating)
            .collect())
    }

    async fn rating_stats(&self, meal_ids: &[Uuid]) -> Result<HashMap<Uuid, RatingStats>> {
        let mut stats: HashMap<Uuid, RatingStats> = HashMap::new();
        for review in self.tables.read().reviews.values() {
            if meal_ids.contains(&review.meal_id) {
                let entry = stats.entry(review.meal_id).or_default();
                entry.count += 1;
                entry.sum += i64::from(review.rating);
            }
        }
        Ok(stats)
    }
}

// ===== Fixtures =====

/// Services over a fresh in-memory store, plus seeding helpers
pub struct Fixture {
    pub store: MemoryStore,
    pub services: Services,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let store = MemoryStore::new();
        let services = Services::new(store.repositories(), config);
        Self { store, services }
    }

    pub fn user(&self, name: &str, role: Role) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            image: None,
            phone: None,
            address: None,
            role,
            status: UserStatus::Active,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.tables.write().users.insert(user.id, user.clone());
        user
    }

    pub fn customer(&self, name: &str) -> User {
        self.user(name, Role::Customer)
    }

    pub fn admin(&self) -> User {
        self.user("Site Admin", Role::Admin)
    }

    /// A provider account with an approved (or pending) business profile
    pub fn provider(&self, business_name: &str, is_active: bool) -> (User, ProviderProfile) {
        let user = self.user(&format!("{} Owner", business_name), Role::Provider);
        let now = Utc::now();
        let profile = ProviderProfile {
            id: Uuid::new_v4(),
            user_id: user.id,
            business_name: business_name.to_string(),
            description: None,
            logo: None,
            phone: "+1 555 0100".to_string(),
            address: "12 Market Street".to_string(),
            website: None,
            cuisine: None,
            opening_hours: None,
            delivery_radius: None,
            is_active,
            created_at: now,
            updated_at: now,
        };
        self.store
            .tables
            .write()
            .providers
            .insert(profile.id, profile.clone());
        (user, profile)
    }

    pub fn category(&self, name: &str, provider_id: Option<Uuid>) -> Category {
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            provider_id,
            name: name.to_string(),
            description: None,
            image: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store
            .tables
            .write()
            .categories
            .insert(category.id, category.clone());
        category
    }

    pub fn meal(&self, provider_id: Uuid, name: &str, price: &str) -> Meal {
        // Spread creation times so newest-first ordering is deterministic
        let offset = self.store.tables.read().meals.len() as i64;
        let now = Utc::now() + Duration::milliseconds(offset);
        let meal = Meal {
            id: Uuid::new_v4(),
            provider_id,
            category_id: None,
            cuisine_id: None,
            name: name.to_string(),
            description: None,
            price: money(price),
            image: None,
            ingredients: None,
            allergens: None,
            prep_time: None,
            is_available: true,
            is_featured: false,
            is_vegan: false,
            created_at: now,
            updated_at: now,
        };
        self.store.tables.write().meals.insert(meal.id, meal.clone());
        meal
    }

    pub fn set_meal_available(&self, meal_id: Uuid, available: bool) {
        if let Some(meal) = self.store.tables.write().meals.get_mut(&meal_id) {
            meal.is_available = available;
        }
    }

    pub fn set_order_status(&self, order_id: Uuid, status: OrderStatus) {
        if let Some(order) = self.store.tables.write().orders.get_mut(&order_id) {
            order.status = status;
        }
    }

    pub fn new_order(meal_id: Uuid, quantity: i32) -> NewOrder {
        NewOrder {
            items: vec![OrderLineRequest { meal_id, quantity }],
            delivery_address: "221B Baker Street".to_string(),
            delivery_phone: "+44 20 7946 0000".to_string(),
            special_instructions: None,
        }
    }

    /// Place an order for `meal` and walk it to DELIVERED
    pub async fn delivered_order(&self, customer_id: Uuid, meal_id: Uuid) -> OrderDetails {
        let details = self
            .services
            .orders
            .create_order(customer_id, Self::new_order(meal_id, 1))
            .await
            .unwrap();
        self.set_order_status(details.order.id, OrderStatus::Delivered);
        details
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
