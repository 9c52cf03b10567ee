//! Order lifecycle - placement, scoped reads and status transitions

use super::catalog::unique;
use super::repository::Repositories;
use super::validation::{optional_text, required_text, validate_quantity};
use super::{internal, require_active_user};
use crate::config::Config;
use crate::contract::*;
use chrono::{DateTime, Duration, Utc};
use rand::distr::{Alphanumeric, SampleString};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

const ORDER_NUMBER_SUFFIX_LEN: usize = 9;

pub struct OrderService {
    repos: Repositories,
    config: Config,
}

impl OrderService {
    pub fn new(repos: Repositories, config: Config) -> Self {
        Self { repos, config }
    }

    /// Place an order for meals of a single provider
    pub async fn create_order(
        &self,
        customer_id: Uuid,
        input: NewOrder,
    ) -> Result<OrderDetails, MarketplaceError> {
        let customer = require_active_user(&self.repos, customer_id).await?;

        let lines = merge_lines(&input.items)?;
        let delivery_address = required_text("Delivery address", &input.delivery_address)?;
        let delivery_phone = required_text("Delivery phone", &input.delivery_phone)?;

        let meal_ids: Vec<Uuid> = lines.iter().map(|l| l.meal_id).collect();
        let meals: HashMap<Uuid, Meal> = self
            .repos
            .meals
            .find_many(&meal_ids)
            .await
            .map_err(internal)?
            .into_iter()
            .filter(|m| m.is_available)
            .map(|m| (m.id, m))
            .collect();

        if let Some(missing) = meal_ids.iter().find(|id| !meals.contains_key(*id)) {
            return Err(MarketplaceError::not_found("meal", missing));
        }

        let provider_ids = unique(meals.values().map(|m| m.provider_id));
        let provider_id = match provider_ids.as_slice() {
            [single] => *single,
            _ => {
                return Err(MarketplaceError::invalid(
                    "All items in an order must come from the same provider!",
                ))
            }
        };

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let meal = meals
                .get(&line.meal_id)
                .ok_or_else(|| MarketplaceError::not_found("meal", line.meal_id))?;
            items.push(OrderItem {
                id: Uuid::new_v4(),
                order_id,
                meal_id: meal.id,
                meal_name: meal.name.clone(),
                quantity: line.quantity,
                price: meal.price,
            });
        }
        let total_amount = items.iter().map(OrderItem::line_total).sum::<Decimal>();

        let order = Order {
            id: order_id,
            order_number: generate_order_number(now),
            customer_id,
            provider_id,
            status: OrderStatus::Pending,
            total_amount,
            delivery_address,
            delivery_phone,
            special_instructions: optional_text(input.special_instructions),
            estimated_delivery_time: Some(now + Duration::minutes(self.config.estimated_delivery_minutes)),
            actual_delivery_time: None,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .repos
            .orders
            .create_with_items(&order, &items)
            .await
            .map_err(internal)?;

        tracing::info!(
            order_id = %created.id,
            order_number = %created.order_number,
            customer_id = %customer_id,
            provider_id = %provider_id,
            total = %created.total_amount,
            "order created"
        );

        if let Err(e) = self.repos.carts.remove_meals(customer_id, &meal_ids).await {
            tracing::warn!(error = ?e, customer_id = %customer_id, "failed to clear ordered meals from cart");
        }

        let provider = self
            .repos
            .providers
            .find_by_id(provider_id)
            .await
            .map_err(internal)?;

        Ok(OrderDetails {
            order: created,
            items,
            customer: Some(UserSummary::from(&customer)),
            provider: provider.as_ref().map(ProviderSummary::from),
        })
    }

    pub async fn my_orders(
        &self,
        customer_id: Uuid,
        page: &PageRequest,
    ) -> Result<Page<OrderDetails>, MarketplaceError> {
        let filter = OrderFilter {
            customer_id: Some(customer_id),
            ..Default::default()
        };
        self.list(&filter, page).await
    }

    pub async fn provider_orders(
        &self,
        provider_id: Uuid,
        status: Option<OrderStatus>,
        page: &PageRequest,
    ) -> Result<Page<OrderDetails>, MarketplaceError> {
        let filter = OrderFilter {
            provider_id: Some(provider_id),
            status,
            ..Default::default()
        };
        self.list(&filter, page).await
    }

    /// Platform listing; a provider caller only ever sees its own orders
    pub async fn all_orders(
        &self,
        actor: Actor,
        mut filter: OrderFilter,
        page: &PageRequest,
    ) -> Result<Page<OrderDetails>, MarketplaceError> {
        if let Actor::Provider(provider_id) = actor {
            filter.provider_id = Some(provider_id);
        }
        self.list(&filter, page).await
    }

    /// Customer-scoped read; other customers' orders are not found
    pub async fn get_order(
        &self,
        order_id: Uuid,
        customer_id: Uuid,
    ) -> Result<OrderDetails, MarketplaceError> {
        let order = self
            .find_order(order_id)
            .await?
            .filter(|o| o.customer_id == customer_id)
            .ok_or_else(|| MarketplaceError::not_found("order", order_id))?;
        self.single_details(order).await
    }

    pub async fn get_provider_order(
        &self,
        order_id: Uuid,
        provider_id: Uuid,
    ) -> Result<OrderDetails, MarketplaceError> {
        let order = self
            .find_order(order_id)
            .await?
            .filter(|o| o.provider_id == provider_id)
            .ok_or_else(|| MarketplaceError::not_found("order", order_id))?;
        self.single_details(order).await
    }

    /// Move an order along its lifecycle
    ///
    /// Checks run in a fixed order: existence (and provider scope), terminal
    /// state, status allow-list, then the transition itself.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        actor: Actor,
        raw_status: &str,
    ) -> Result<Order, MarketplaceError> {
        let order = self
            .find_order(order_id)
            .await?
            .filter(|o| actor.may_manage(Some(o.provider_id)))
            .ok_or_else(|| MarketplaceError::not_found("order", order_id))?;

        if order.status.is_terminal() {
            return Err(MarketplaceError::InvalidTransition {
                from: order.status.to_string(),
                to: raw_status.to_string(),
            });
        }

        let next: OrderStatus = raw_status.parse()?;
        if !order.status.can_transition_to(next) {
            return Err(MarketplaceError::InvalidTransition {
                from: order.status.to_string(),
                to: next.to_string(),
            });
        }

        let delivered_at = (next == OrderStatus::Delivered).then(Utc::now);
        let updated = self
            .repos
            .orders
            .update_status(order.id, next, delivered_at)
            .await
            .map_err(internal)?;

        tracing::info!(order_id = %order.id, from = %order.status, to = %next, "order status changed");
        Ok(updated)
    }

    async fn find_order(&self, order_id: Uuid) -> Result<Option<Order>, MarketplaceError> {
        self.repos
            .orders
            .find_by_id(order_id)
            .await
            .map_err(internal)
    }

    async fn list(
        &self,
        filter: &OrderFilter,
        page: &PageRequest,
    ) -> Result<Page<OrderDetails>, MarketplaceError> {
        let (orders, total) = self
            .repos
            .orders
            .list(filter, page)
            .await
            .map_err(internal)?;
        let details = self.attach_details(orders).await?;
        Ok(Page::new(details, total, page))
    }

    async fn single_details(&self, order: Order) -> Result<OrderDetails, MarketplaceError> {
        self.attach_details(vec![order])
            .await?
            .pop()
            .ok_or(MarketplaceError::Internal)
    }

    async fn attach_details(&self, orders: Vec<Order>) -> Result<Vec<OrderDetails>, MarketplaceError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let customer_ids = unique(orders.iter().map(|o| o.customer_id));
        let provider_ids = unique(orders.iter().map(|o| o.provider_id));

        let mut items: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for item in self
            .repos
            .orders
            .items_for_orders(&order_ids)
            .await
            .map_err(internal)?
        {
            items.entry(item.order_id).or_default().push(item);
        }

        let customers: HashMap<Uuid, UserSummary> = self
            .repos
            .users
            .find_many(&customer_ids)
            .await
            .map_err(internal)?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();
        let providers: HashMap<Uuid, ProviderSummary> = self
            .repos
            .providers
            .find_many(&provider_ids)
            .await
            .map_err(internal)?
            .iter()
            .map(|p| (p.id, ProviderSummary::from(p)))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| OrderDetails {
                items: items.remove(&order.id).unwrap_or_default(),
                customer: customers.get(&order.customer_id).cloned(),
                provider: providers.get(&order.provider_id).cloned(),
                order,
            })
            .collect())
    }
}

/// Validate quantities and merge repeated meals, keeping first-seen order
fn merge_lines(requested: &[OrderLineRequest]) -> Result<Vec<OrderLineRequest>, MarketplaceError> {
    if requested.is_empty() {
        return Err(MarketplaceError::invalid("Order must contain at least one item!"));
    }

    let mut merged: Vec<OrderLineRequest> = Vec::with_capacity(requested.len());
    for line in requested {
        validate_quantity(line.quantity)?;
        match merged.iter_mut().find(|m| m.meal_id == line.meal_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(|| MarketplaceError::invalid("Quantity is too large!"))?;
            }
            None => merged.push(*line),
        }
    }
    Ok(merged)
}

/// `ORD-<unix millis>-<9 uppercase alphanumerics>`
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), ORDER_NUMBER_SUFFIX_LEN)
        .to_ascii_uppercase();
    format!("ORD-{}-{}", now.timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_format() {
        let now = Utc::now();
        let number = generate_order_number(now);
        let parts: Vec<&str> = number.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), ORDER_NUMBER_SUFFIX_LEN);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn repeated_meals_are_merged() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let merged = merge_lines(&[
            OrderLineRequest { meal_id: a, quantity: 1 },
            OrderLineRequest { meal_id: b, quantity: 2 },
            OrderLineRequest { meal_id: a, quantity: 3 },
        ])
        .unwrap();

        assert_eq!(
            merged,
            vec![
                OrderLineRequest { meal_id: a, quantity: 4 },
                OrderLineRequest { meal_id: b, quantity: 2 },
            ]
        );
    }

    #[test]
    fn empty_or_non_positive_lines_are_rejected() {
        assert!(merge_lines(&[]).is_err());
        assert!(merge_lines(&[OrderLineRequest {
            meal_id: Uuid::new_v4(),
            quantity: 0
        }])
        .is_err());
    }
}
