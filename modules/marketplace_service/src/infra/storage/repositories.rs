//! SeaORM repository implementations

use crate::contract::*;
use crate::domain::repository::{
    CartRepository, CategoryRepository, CuisineRepository, MealRepository, OrderRepository,
    ProviderRepository, Repositories, ReviewRepository, UniqueViolation, UserRepository,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Func, OnConflict, Query, SimpleExpr};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    prelude::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, Insert, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, SqlErr,
    TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::entity::{
    cart_item, category, cuisine, meal, order, order_item, provider_profile, review, session, user,
};

/// Build every repository over one shared connection
pub fn build_repositories(db: Arc<DatabaseConnection>) -> Repositories {
    Repositories {
        users: Arc::new(SeaOrmUserRepository::new(db.clone())),
        providers: Arc::new(SeaOrmProviderRepository::new(db.clone())),
        categories: Arc::new(SeaOrmCategoryRepository::new(db.clone())),
        cuisines: Arc::new(SeaOrmCuisineRepository::new(db.clone())),
        meals: Arc::new(SeaOrmMealRepository::new(db.clone())),
        carts: Arc::new(SeaOrmCartRepository::new(db.clone())),
        orders: Arc::new(SeaOrmOrderRepository::new(db.clone())),
        reviews: Arc::new(SeaOrmReviewRepository::new(db)),
    }
}

// ===== Query helpers =====

/// Case-insensitive substring match on a qualified column
fn contains_ci<C: ColumnTrait>(col: C, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    Expr::expr(Func::lower(Expr::col((col.entity_name(), col)))).like(pattern)
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn sea_order(order: SortOrder) -> sea_orm::Order {
    match order {
        SortOrder::Asc => sea_orm::Order::Asc,
        SortOrder::Desc => sea_orm::Order::Desc,
    }
}

/// Count the filtered query, then fetch the requested page
async fn fetch_page<E>(
    db: &DatabaseConnection,
    query: Select<E>,
    page: &PageRequest,
) -> Result<(Vec<E::Model>, u64)>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let total = query.clone().count(db).await?;
    let rows = query
        .offset(page.offset())
        .limit(page.limit)
        .all(db)
        .await?;
    Ok((rows, total))
}

/// Surface unique-index violations as [`UniqueViolation`]
fn map_write_err(err: DbErr) -> anyhow::Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => UniqueViolation(detail).into(),
        _ => err.into(),
    }
}

fn to_counts(rows: Vec<(Uuid, i64)>) -> HashMap<Uuid, u64> {
    rows.into_iter()
        .map(|(id, count)| (id, count.max(0) as u64))
        .collect()
}

// ===== Users =====

pub struct SeaOrmUserRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmUserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        user::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        user::Entity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn list(&self, filter: &UserFilter, page: &PageRequest) -> Result<(Vec<User>, u64)> {
        let mut query = user::Entity::find();

        if let Some(search) = filter.search.as_deref() {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(user::Column::Name, search))
                    .add(contains_ci(user::Column::Email, search)),
            );
        }
        if let Some(role) = filter.role {
            query = query.filter(user::Column::Role.eq(role.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(user::Column::Status.eq(status.as_str()));
        }

        let sort_col = match page.sort_by {
            SortField::Name => user::Column::Name,
            SortField::UpdatedAt => user::Column::UpdatedAt,
            _ => user::Column::CreatedAt,
        };
        query = query
            .order_by(sort_col, sea_order(page.sort_order))
            .order_by_asc(user::Column::Id);

        let (rows, total) = fetch_page(&self.db, query, page).await?;
        let users = rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok((users, total))
    }

    async fn update(&self, model: &User) -> Result<User> {
        let active: user::ActiveModel = model.into();
        active.update(&*self.db).await?.try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let txn = self.db.begin().await?;

        cart_item::Entity::delete_many()
            .filter(cart_item::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        review::Entity::delete_many()
            .filter(review::Column::CustomerId.eq(id))
            .exec(&txn)
            .await?;
        session::Entity::delete_many()
            .filter(session::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        if let Some(profile) = provider_profile::Entity::find()
            .filter(provider_profile::Column::UserId.eq(id))
            .one(&txn)
            .await?
        {
            category::Entity::delete_many()
                .filter(category::Column::ProviderId.eq(profile.id))
                .exec(&txn)
                .await?;
            provider_profile::Entity::delete_by_id(profile.id)
                .exec(&txn)
                .await?;
        }
        user::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}

// ===== Provider profiles =====

pub struct SeaOrmProviderRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmProviderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProviderRepository for SeaOrmProviderRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProviderProfile>> {
        Ok(provider_profile::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Into::into))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<ProviderProfile>> {
        Ok(provider_profile::Entity::find()
            .filter(provider_profile::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .map(Into::into))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<ProviderProfile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(provider_profile::Entity::find()
            .filter(provider_profile::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn list(
        &self,
        filter: &ProviderFilter,
        page: &PageRequest,
    ) -> Result<(Vec<ProviderProfile>, u64)> {
        let mut query = provider_profile::Entity::find();

        if let Some(search) = filter.search.as_deref() {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(provider_profile::Column::BusinessName, search))
                    .add(contains_ci(provider_profile::Column::Description, search)),
            );
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(provider_profile::Column::IsActive.eq(is_active));
        }

        let sort_col = match page.sort_by {
            SortField::Name => provider_profile::Column::BusinessName,
            SortField::UpdatedAt => provider_profile::Column::UpdatedAt,
            _ => provider_profile::Column::CreatedAt,
        };
        query = query
            .order_by(sort_col, sea_order(page.sort_order))
            .order_by_asc(provider_profile::Column::Id);

        let (rows, total) = fetch_page(&self.db, query, page).await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn create_with_role_promotion(&self, profile: &ProviderProfile) -> Result<ProviderProfile> {
        let txn = self.db.begin().await?;

        let active: provider_profile::ActiveModel = profile.into();
        let created = provider_profile::Entity::insert(active)
            .exec_with_returning(&txn)
            .await
            .map_err(map_write_err)?;

        // Admins keep their role when they also run a storefront
        user::Entity::update_many()
            .col_expr(user::Column::Role, Expr::value(Role::Provider.as_str()))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(profile.user_id))
            .filter(user::Column::Role.ne(Role::Admin.as_str()))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(created.into())
    }

    async fn update(&self, profile: &ProviderProfile) -> Result<ProviderProfile> {
        let active: provider_profile::ActiveModel = profile.into();
        Ok(active.update(&*self.db).await?.into())
    }
}

// ===== Categories =====

pub struct SeaOrmCategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCategoryRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(category::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Into::into))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Category>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(category::Entity::find()
            .filter(category::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn find_by_name(&self, name: &str, provider_id: Option<Uuid>) -> Result<Option<Category>> {
        let scope = match provider_id {
            Some(id) => category::Column::ProviderId.eq(id),
            None => category::Column::ProviderId.is_null(),
        };
        Ok(category::Entity::find()
            .filter(category::Column::Name.eq(name))
            .filter(scope)
            .one(&*self.db)
            .await?
            .map(Into::into))
    }

    async fn list(&self, filter: &CategoryFilter, page: &PageRequest) -> Result<(Vec<Category>, u64)> {
        let mut query = category::Entity::find();

        if let Some(search) = filter.search.as_deref() {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(category::Column::Name, search))
                    .add(contains_ci(category::Column::Description, search)),
            );
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(category::Column::IsActive.eq(is_active));
        }
        if let Some(provider_id) = filter.provider_id {
            query = query.filter(category::Column::ProviderId.eq(provider_id));
        }

        let sort_col = match page.sort_by {
            SortField::Name => category::Column::Name,
            SortField::UpdatedAt => category::Column::UpdatedAt,
            _ => category::Column::CreatedAt,
        };
        query = query
            .order_by(sort_col, sea_order(page.sort_order))
            .order_by_asc(category::Column::Id);

        let (rows, total) = fetch_page(&self.db, query, page).await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn create(&self, model: &Category) -> Result<Category> {
        let active: category::ActiveModel = model.into();
        let created = category::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await
            .map_err(map_write_err)?;
        Ok(created.into())
    }

    async fn update(&self, model: &Category) -> Result<Category> {
        let active: category::ActiveModel = model.into();
        Ok(active.update(&*self.db).await.map_err(map_write_err)?.into())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        category::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(())
    }
}

// ===== Cuisines =====

pub struct SeaOrmCuisineRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCuisineRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<cuisine::Model>> {
        Ok(cuisine::Entity::find()
            .filter(cuisine::Column::Name.eq(name))
            .one(&*self.db)
            .await?)
    }
}

#[async_trait]
impl CuisineRepository for SeaOrmCuisineRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cuisine>> {
        Ok(cuisine::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Into::into))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Cuisine>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(cuisine::Entity::find()
            .filter(cuisine::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn upsert_by_name(&self, name: &str) -> Result<Cuisine> {
        if let Some(existing) = self.find_by_name(name).await? {
            return Ok(existing.into());
        }

        let active = cuisine::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
        };
        // Lost races fall through to the read below
        cuisine::Entity::insert(active)
            .on_conflict(OnConflict::column(cuisine::Column::Name).do_nothing().to_owned())
            .exec_without_returning(&*self.db)
            .await?;

        self.find_by_name(name)
            .await?
            .map(Into::into)
            .ok_or_else(|| anyhow!("cuisine '{}' missing after upsert", name))
    }

    async fn list(&self, search: Option<&str>, page: &PageRequest) -> Result<(Vec<Cuisine>, u64)> {
        let mut query = cuisine::Entity::find();
        if let Some(search) = search {
            query = query.filter(contains_ci(cuisine::Column::Name, search));
        }

        let sort_col = match page.sort_by {
            SortField::Name => cuisine::Column::Name,
            _ => cuisine::Column::CreatedAt,
        };
        query = query
            .order_by(sort_col, sea_order(page.sort_order))
            .order_by_asc(cuisine::Column::Id);

        let (rows, total) = fetch_page(&self.db, query, page).await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }
}

// ===== Meals =====

pub struct SeaOrmMealRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmMealRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// `SELECT <column>, COUNT(id) ... GROUP BY <column>` restricted to `ids`
    async fn grouped_counts(&self, column: meal::Column, ids: &[Uuid]) -> Result<HashMap<Uuid, u64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, i64)> = meal::Entity::find()
            .select_only()
            .column(column)
            .column_as(Expr::col((meal::Entity, meal::Column::Id)).count(), "meal_count")
            .filter(column.is_in(ids.iter().copied()))
            .group_by(column)
            .into_tuple()
            .all(&*self.db)
            .await?;
        Ok(to_counts(rows))
    }
}

#[async_trait]
impl MealRepository for SeaOrmMealRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Meal>> {
        Ok(meal::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Into::into))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Meal>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(meal::Entity::find()
            .filter(meal::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn list(&self, filter: &MealFilter, page: &PageRequest) -> Result<(Vec<Meal>, u64)> {
        let mut query = meal::Entity::find();

        if let Some(search) = filter.search.as_deref() {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(meal::Column::Name, search))
                    .add(contains_ci(meal::Column::Description, search))
                    .add(contains_ci(meal::Column::Ingredients, search)),
            );
        }
        if let Some(name) = filter.category.as_deref() {
            query = query.filter(
                meal::Column::CategoryId.in_subquery(
                    Query::select()
                        .column(category::Column::Id)
                        .from(category::Entity)
                        .and_where(contains_ci(category::Column::Name, name))
                        .to_owned(),
                ),
            );
        }
        if !filter.category_ids.is_empty() {
            query = query.filter(meal::Column::CategoryId.is_in(filter.category_ids.iter().copied()));
        }
        if let Some(min) = filter.price_min {
            query = query.filter(meal::Column::Price.gte(min));
        }
        if let Some(max) = filter.price_max {
            query = query.filter(meal::Column::Price.lte(max));
        }
        if let Some(name) = filter.cuisine.as_deref() {
            query = query.filter(
                meal::Column::CuisineId.in_subquery(
                    Query::select()
                        .column(cuisine::Column::Id)
                        .from(cuisine::Entity)
                        .and_where(contains_ci(cuisine::Column::Name, name))
                        .to_owned(),
                ),
            );
        }
        if let Some(is_vegan) = filter.is_vegan {
            query = query.filter(meal::Column::IsVegan.eq(is_vegan));
        }
        if let Some(is_featured) = filter.is_featured {
            query = query.filter(meal::Column::IsFeatured.eq(is_featured));
        }
        if let Some(provider_id) = filter.provider_id {
            query = query.filter(meal::Column::ProviderId.eq(provider_id));
        }
        if let Some(is_available) = filter.is_available {
            query = query.filter(meal::Column::IsAvailable.eq(is_available));
        }

        let order = sea_order(page.sort_order);
        query = match page.sort_by {
            SortField::Price => query.order_by(meal::Column::Price, order),
            SortField::Name => query.order_by(meal::Column::Name, order),
            SortField::UpdatedAt => query.order_by(meal::Column::UpdatedAt, order),
            SortField::Rating => query.order_by(
                Expr::cust(
                    "(SELECT COALESCE(AVG(r.rating), 0) FROM reviews r WHERE r.meal_id = meals.id)",
                ),
                order,
            ),
            _ => query.order_by(meal::Column::CreatedAt, order),
        }
        .order_by_asc(meal::Column::Id);

        let (rows, total) = fetch_page(&self.db, query, page).await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn create(&self, model: &Meal) -> Result<Meal> {
        let active: meal::ActiveModel = model.into();
        let created = meal::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await?;
        Ok(created.into())
    }

    async fn update(&self, model: &Meal) -> Result<Meal> {
        let mut active: meal::ActiveModel = model.into();
        // Ownership is fixed at creation
        active.provider_id = NotSet;
        active.created_at = NotSet;
        Ok(active.update(&*self.db).await?.into())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        meal::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(())
    }

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64> {
        Ok(meal::Entity::find()
            .filter(meal::Column::CategoryId.eq(category_id))
            .count(&*self.db)
            .await?)
    }

    async fn count_by_categories(&self, category_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>> {
        self.grouped_counts(meal::Column::CategoryId, category_ids).await
    }

    async fn count_by_cuisines(&self, cuisine_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>> {
        self.grouped_counts(meal::Column::CuisineId, cuisine_ids).await
    }

    async fn count_by_providers(&self, provider_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>> {
        self.grouped_counts(meal::Column::ProviderId, provider_ids).await
    }
}

// ===== Cart =====

/// `INSERT ... ON CONFLICT (user_id, meal_id) DO UPDATE SET quantity = cart_items.quantity + $q`
fn cart_upsert(user_id: Uuid, meal_id: Uuid, quantity: i32) -> Insert<cart_item::ActiveModel> {
    let now = Utc::now();
    let active = cart_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        meal_id: Set(meal_id),
        quantity: Set(quantity),
        created_at: Set(now),
        updated_at: Set(now),
    };
    cart_item::Entity::insert(active).on_conflict(
        OnConflict::columns([cart_item::Column::UserId, cart_item::Column::MealId])
            .value(
                cart_item::Column::Quantity,
                Expr::col((cart_item::Entity, cart_item::Column::Quantity)).add(quantity),
            )
            .update_column(cart_item::Column::UpdatedAt)
            .to_owned(),
    )
}

pub struct SeaOrmCartRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCartRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartRepository for SeaOrmCartRepository {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CartItem>> {
        Ok(cart_item::Entity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .order_by_desc(cart_item::Column::CreatedAt)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn find(&self, user_id: Uuid, meal_id: Uuid) -> Result<Option<CartItem>> {
        Ok(cart_item::Entity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::MealId.eq(meal_id))
            .one(&*self.db)
            .await?
            .map(Into::into))
    }

    async fn add_quantity(&self, user_id: Uuid, meal_id: Uuid, quantity: i32) -> Result<CartItem> {
        let upserted = cart_upsert(user_id, meal_id, quantity)
            .exec_with_returning(&*self.db)
            .await?;
        Ok(upserted.into())
    }

    async fn set_quantity(&self, id: Uuid, quantity: i32) -> Result<CartItem> {
        let active = cart_item::ActiveModel {
            id: Set(id),
            quantity: Set(quantity),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        Ok(active.update(&*self.db).await?.into())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        cart_item::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(())
    }

    async fn clear(&self, user_id: Uuid) -> Result<u64> {
        let result = cart_item::Entity::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn remove_meals(&self, user_id: Uuid, meal_ids: &[Uuid]) -> Result<u64> {
        if meal_ids.is_empty() {
            return Ok(0);
        }
        let result = cart_item::Entity::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::MealId.is_in(meal_ids.iter().copied()))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

// ===== Orders =====

pub struct SeaOrmOrderRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmOrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn create_with_items(&self, model: &Order, items: &[OrderItem]) -> Result<Order> {
        if items.is_empty() {
            return Err(anyhow!("order {} has no items", model.id));
        }

        let txn = self.db.begin().await?;

        let active: order::ActiveModel = model.into();
        let created = order::Entity::insert(active)
            .exec_with_returning(&txn)
            .await
            .map_err(map_write_err)?;
        order_item::Entity::insert_many(items.iter().map(order_item::ActiveModel::from))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        created.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        order::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn list(&self, filter: &OrderFilter, page: &PageRequest) -> Result<(Vec<Order>, u64)> {
        let mut query = order::Entity::find();

        if let Some(search) = filter.search.as_deref() {
            let customers = Query::select()
                .column(user::Column::Id)
                .from(user::Entity)
                .cond_where(
                    Condition::any()
                        .add(contains_ci(user::Column::Name, search))
                        .add(contains_ci(user::Column::Email, search)),
                )
                .to_owned();
            let providers = Query::select()
                .column(provider_profile::Column::Id)
                .from(provider_profile::Entity)
                .and_where(contains_ci(provider_profile::Column::BusinessName, search))
                .to_owned();
            query = query.filter(
                Condition::any()
                    .add(contains_ci(order::Column::OrderNumber, search))
                    .add(order::Column::CustomerId.in_subquery(customers))
                    .add(order::Column::ProviderId.in_subquery(providers)),
            );
        }
        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(status.as_str()));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(order::Column::CustomerId.eq(customer_id));
        }
        if let Some(provider_id) = filter.provider_id {
            query = query.filter(order::Column::ProviderId.eq(provider_id));
        }

        let sort_col = match page.sort_by {
            SortField::TotalAmount | SortField::Price => order::Column::TotalAmount,
            SortField::Status => order::Column::Status,
            SortField::UpdatedAt => order::Column::UpdatedAt,
            _ => order::Column::CreatedAt,
        };
        query = query
            .order_by(sort_col, sea_order(page.sort_order))
            .order_by_asc(order::Column::Id);

        let (rows, total) = fetch_page(&self.db, query, page).await?;
        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok((orders, total))
    }

    async fn items_for_orders(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItem>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(order_item::Entity::find()
            .filter(order_item::Column::OrderId.is_in(order_ids.iter().copied()))
            .order_by_asc(order_item::Column::OrderId)
            .order_by_asc(order_item::Column::MealName)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        actual_delivery_time: Option<DateTime<Utc>>,
    ) -> Result<Order> {
        let active = order::ActiveModel {
            id: Set(id),
            status: Set(status.to_string()),
            actual_delivery_time: match actual_delivery_time {
                Some(at) => Set(Some(at)),
                None => NotSet,
            },
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        active.update(&*self.db).await?.try_into()
    }

    async fn count_items_for_meal(&self, meal_id: Uuid) -> Result<u64> {
        Ok(order_item::Entity::find()
            .filter(order_item::Column::MealId.eq(meal_id))
            .count(&*self.db)
            .await?)
    }

    async fn count_for_customer(&self, customer_id: Uuid) -> Result<u64> {
        Ok(order::Entity::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .count(&*self.db)
            .await?)
    }

    async fn count_by_providers(&self, provider_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>> {
        if provider_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, i64)> = order::Entity::find()
            .select_only()
            .column(order::Column::ProviderId)
            .column_as(Expr::col((order::Entity, order::Column::Id)).count(), "order_count")
            .filter(order::Column::ProviderId.is_in(provider_ids.iter().copied()))
            .group_by(order::Column::ProviderId)
            .into_tuple()
            .all(&*self.db)
            .await?;
        Ok(to_counts(rows))
    }

    async fn has_delivered_meal(&self, customer_id: Uuid, meal_id: Uuid) -> Result<bool> {
        let delivered = order_item::Entity::find()
            .inner_join(order::Entity)
            .filter(order_item::Column::MealId.eq(meal_id))
            .filter(order::Column::CustomerId.eq(customer_id))
            .filter(order::Column::Status.eq(OrderStatus::Delivered.as_str()))
            .count(&*self.db)
            .await?;
        Ok(delivered > 0)
    }
}

// ===== Reviews =====

pub struct SeaOrmReviewRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmReviewRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReviewRepository for SeaOrmReviewRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>> {
        Ok(review::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Into::into))
    }

    async fn find_by_customer_and_meal(&self, customer_id: Uuid, meal_id: Uuid) -> Result<Option<Review>> {
        Ok(review::Entity::find()
            .filter(review::Column::CustomerId.eq(customer_id))
            .filter(review::Column::MealId.eq(meal_id))
            .one(&*self.db)
            .await?
            .map(Into::into))
    }

    async fn create(&self, model: &Review) -> Result<Review> {
        let active: review::ActiveModel = model.into();
        let created = review::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await
            .map_err(map_write_err)?;
        Ok(created.into())
    }

    async fn update(&self, model: &Review) -> Result<Review> {
        let mut active: review::ActiveModel = model.into();
        active.customer_id = NotSet;
        active.meal_id = NotSet;
        active.created_at = NotSet;
        Ok(active.update(&*self.db).await?.into())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        review::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(())
    }

    async fn list_for_meal(&self, meal_id: Uuid, page: &PageRequest) -> Result<(Vec<Review>, u64)> {
        let sort_col = match page.sort_by {
            SortField::Rating => review::Column::Rating,
            SortField::UpdatedAt => review::Column::UpdatedAt,
            _ => review::Column::CreatedAt,
        };
        let query = review::Entity::find()
            .filter(review::Column::MealId.eq(meal_id))
            .order_by(sort_col, sea_order(page.sort_order))
            .order_by_asc(review::Column::Id);

        let (rows, total) = fetch_page(&self.db, query, page).await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn ratings_for_meal(&self, meal_id: Uuid) -> Result<Vec<i32>> {
        Ok(review::Entity::find()
            .select_only()
            .column(review::Column::Rating)
            .filter(review::Column::MealId.eq(meal_id))
            .into_tuple::<i32>()
            .all(&*self.db)
            .await?)
    }

    async fn rating_stats(&self, meal_ids: &[Uuid]) -> Result<HashMap<Uuid, RatingStats>> {
        if meal_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, i64, Option<i64>)> = review::Entity::find()
            .select_only()
            .column(review::Column::MealId)
            .column_as(Expr::col((review::Entity, review::Column::Id)).count(), "review_count")
            .column_as(Expr::col((review::Entity, review::Column::Rating)).sum(), "rating_sum")
            .filter(review::Column::MealId.is_in(meal_ids.iter().copied()))
            .group_by(review::Column::MealId)
            .into_tuple()
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(meal_id, count, sum)| {
                (
                    meal_id,
                    RatingStats {
                        count: count.max(0) as u64,
                        sum: sum.unwrap_or(0),
                    },
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn like_patterns_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    }

    #[test]
    fn meal_search_is_case_insensitive_and_qualified() {
        let sql = meal::Entity::find()
            .filter(contains_ci(meal::Column::Name, "Pho"))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#"LOWER("meals"."name") LIKE '%pho%'"#), "{sql}");
    }

    #[test]
    fn cart_upsert_increments_existing_quantity() {
        let sql = cart_upsert(Uuid::new_v4(), Uuid::new_v4(), 2)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#"ON CONFLICT ("user_id", "meal_id") DO UPDATE SET"#), "{sql}");
        assert!(sql.contains(r#""quantity" = "cart_items"."quantity" + 2"#), "{sql}");
        assert!(sql.contains(r#""updated_at" = "excluded"."updated_at""#), "{sql}");
    }
}
