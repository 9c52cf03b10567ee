//! Shopping cart

use super::repository::Repositories;
use super::validation::validate_quantity;
use super::{internal, require_active_user};
use crate::contract::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

pub struct CartService {
    repos: Repositories,
}

impl CartService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Visible cart; rows for unavailable meals stay stored but are not shown or counted
    pub async fn get_cart(&self, user_id: Uuid) -> Result<Cart, MarketplaceError> {
        require_active_user(&self.repos, user_id).await?;

        let rows = self
            .repos
            .carts
            .list_for_user(user_id)
            .await
            .map_err(internal)?;

        let meal_ids: Vec<Uuid> = rows.iter().map(|r| r.meal_id).collect();
        let meals: HashMap<Uuid, Meal> = self
            .repos
            .meals
            .find_many(&meal_ids)
            .await
            .map_err(internal)?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let items: Vec<CartLine> = rows
            .into_iter()
            .filter_map(|item| {
                let meal = meals.get(&item.meal_id).filter(|m| m.is_available)?.clone();
                Some(CartLine { item, meal })
            })
            .collect();

        let total_amount = items.iter().map(CartLine::line_total).sum::<Decimal>();
        let item_count = items.iter().map(|l| i64::from(l.item.quantity)).sum();

        tracing::debug!(user_id = %user_id, lines = items.len(), "cart loaded");
        Ok(Cart {
            items,
            total_amount,
            item_count,
        })
    }

    /// Add `quantity` of a meal, incrementing an existing row
    pub async fn add_item(
        &self,
        user_id: Uuid,
        meal_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, MarketplaceError> {
        require_active_user(&self.repos, user_id).await?;
        validate_quantity(quantity)?;

        self.repos
            .meals
            .find_by_id(meal_id)
            .await
            .map_err(internal)?
            .filter(|m| m.is_available)
            .ok_or_else(|| MarketplaceError::not_found("meal", meal_id))?;

        let item = self
            .repos
            .carts
            .add_quantity(user_id, meal_id, quantity)
            .await
            .map_err(internal)?;

        tracing::info!(user_id = %user_id, meal_id = %meal_id, quantity = item.quantity, "cart item added");
        Ok(item)
    }

    pub async fn update_quantity(
        &self,
        user_id: Uuid,
        meal_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, MarketplaceError> {
        validate_quantity(quantity)?;

        let existing = self.find_line(user_id, meal_id).await?;
        self.repos
            .carts
            .set_quantity(existing.id, quantity)
            .await
            .map_err(internal)
    }

    pub async fn remove_item(&self, user_id: Uuid, meal_id: Uuid) -> Result<(), MarketplaceError> {
        let existing = self.find_line(user_id, meal_id).await?;
        self.repos
            .carts
            .delete(existing.id)
            .await
            .map_err(internal)?;

        tracing::info!(user_id = %user_id, meal_id = %meal_id, "cart item removed");
        Ok(())
    }

    /// Returns the number of removed rows
    pub async fn clear(&self, user_id: Uuid) -> Result<u64, MarketplaceError> {
        let removed = self.repos.carts.clear(user_id).await.map_err(internal)?;
        tracing::info!(user_id = %user_id, removed, "cart cleared");
        Ok(removed)
    }

    async fn find_line(&self, user_id: Uuid, meal_id: Uuid) -> Result<CartItem, MarketplaceError> {
        self.repos
            .carts
            .find(user_id, meal_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| MarketplaceError::not_found("cart item", meal_id))
    }
}
