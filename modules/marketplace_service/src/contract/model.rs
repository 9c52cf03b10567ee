//! Contract models for the marketplace service
//!
//! These models are transport-agnostic and shared by the domain, storage and REST layers.
//! NO serde derives - these are pure domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::error::MarketplaceError;

// ===== Enumerations =====

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Customer,
    Provider,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Customer, Role::Provider, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::Provider => "PROVIDER",
            Role::Admin => "ADMIN",
        }
    }
}

/// Account moderation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub const ALL: [UserStatus; 3] = [UserStatus::Active, UserStatus::Inactive, UserStatus::Suspended];

    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Inactive => "INACTIVE",
            UserStatus::Suspended => "SUSPENDED",
        }
    }
}

/// Order lifecycle status
///
/// Forward chain: PENDING → CONFIRMED → PREPARING → READY → OUT_FOR_DELIVERY → DELIVERED.
/// CANCELLED is reachable from every non-terminal status. DELIVERED and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Position in the forward chain; `None` for CANCELLED
    fn stage(self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Preparing => Some(2),
            OrderStatus::Ready => Some(3),
            OrderStatus::OutForDelivery => Some(4),
            OrderStatus::Delivered => Some(5),
            OrderStatus::Cancelled => None,
        }
    }

    /// Whether `self → next` is a legal move
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.stage(), next.stage()) {
            (_, None) => true,
            (Some(current), Some(target)) => target > current,
            (None, Some(_)) => false,
        }
    }
}

macro_rules! impl_enum_text {
    ($ty:ty, $label:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = MarketplaceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| MarketplaceError::InvalidArgument {
                        message: format!(
                            "Invalid {} '{}'! Must be one of: {}",
                            $label,
                            s,
                            <$ty>::ALL.map(|v| v.as_str()).join(", ")
                        ),
                    })
            }
        }
    };
}

impl_enum_text!(Role, "role");
impl_enum_text!(UserStatus, "status");
impl_enum_text!(OrderStatus, "status");

// ===== Identity =====

/// Authenticated caller resolved by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Who is mutating an owner-scoped resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// Platform administrator, bypasses ownership checks
    Admin,
    /// A provider acting on its own resources
    Provider(Uuid),
}

impl Actor {
    pub fn may_manage(&self, owner_provider_id: Option<Uuid>) -> bool {
        match self {
            Actor::Admin => true,
            Actor::Provider(id) => owner_provider_id == Some(*id),
        }
    }
}

// ===== Entities =====

/// Marketplace user account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Active means enabled and not moderated away
    pub fn is_enabled(&self) -> bool {
        self.is_active && self.status == UserStatus::Active
    }
}

/// Restaurant / vendor business profile owned by a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub phone: String,
    pub address: String,
    pub website: Option<String>,
    pub cuisine: Option<String>,
    pub opening_hours: Option<String>,
    pub delivery_radius: Option<Decimal>,
    /// Admin approval flag
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Menu section; `provider_id == None` is a global category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub provider_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Global cuisine tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cuisine {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meal {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub category_id: Option<Uuid>,
    pub cuisine_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image: Option<String>,
    pub ingredients: Option<String>,
    pub allergens: Option<String>,
    pub prep_time: Option<i32>,
    pub is_available: bool,
    pub is_featured: bool,
    pub is_vegan: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meal_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    /// Customer-facing identifier, distinct from `id`
    pub order_number: String,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub status: OrderStatus,
    /// Snapshot taken at creation
    pub total_amount: Decimal,
    pub delivery_address: String,
    pub delivery_phone: String,
    pub special_instructions: Option<String>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    pub actual_delivery_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order line; `price` and `meal_name` are snapshots of the meal at order time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub meal_id: Uuid,
    pub meal_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub meal_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ===== Projections =====

/// Public display fields of a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub phone: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            image: user.image.clone(),
            phone: user.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSummary {
    pub id: Uuid,
    pub business_name: String,
    pub phone: String,
    pub address: String,
    pub is_active: bool,
}

impl From<&ProviderProfile> for ProviderSummary {
    fn from(profile: &ProviderProfile) -> Self {
        Self {
            id: profile.id,
            business_name: profile.business_name.clone(),
            phone: profile.phone.clone(),
            address: profile.address.clone(),
            is_active: profile.is_active,
        }
    }
}

/// Aggregated ratings of one meal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RatingStats {
    pub count: u64,
    pub sum: i64,
}

impl RatingStats {
    /// Mean rating rounded to one decimal, 0 when unrated
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        round_one_decimal(self.sum as f64 / self.count as f64)
    }
}

/// Rating summary computed over a meal's full review set
#[derive(Debug, Clone, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub total_reviews: u64,
    /// Index 0 holds 1-star counts, index 4 holds 5-star counts
    pub distribution: [u64; 5],
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[i32]) -> Self {
        let mut distribution = [0u64; 5];
        let mut sum = 0i64;
        for &rating in ratings {
            if (1..=5).contains(&rating) {
                distribution[(rating - 1) as usize] += 1;
            }
            sum += i64::from(rating);
        }
        let stats = RatingStats {
            count: ratings.len() as u64,
            sum,
        };
        Self {
            average: stats.average(),
            total_reviews: stats.count,
            distribution,
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct MealView {
    pub meal: Meal,
    pub category: Option<Category>,
    pub cuisine: Option<Cuisine>,
    pub provider: Option<ProviderSummary>,
    pub avg_rating: f64,
    pub review_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MealDetails {
    pub view: MealView,
    pub recent_reviews: Vec<ReviewView>,
    pub rating_summary: RatingSummary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewView {
    pub review: Review,
    pub customer: Option<UserSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryWithCount {
    pub category: Category,
    pub meal_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuisineWithCount {
    pub cuisine: Cuisine,
    pub meal_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderWithCounts {
    pub profile: ProviderProfile,
    pub owner: Option<UserSummary>,
    pub meal_count: u64,
    pub order_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user: User,
    pub provider: Option<ProviderProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub item: CartItem,
    pub meal: Meal,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.meal.price * Decimal::from(self.item.quantity)
    }
}

/// Visible cart; unavailable meals are excluded from items and totals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub items: Vec<CartLine>,
    pub total_amount: Decimal,
    pub item_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub customer: Option<UserSummary>,
    pub provider: Option<ProviderSummary>,
}

// ===== Inputs =====

#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
    pub provider_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct NewMeal {
    pub name: String,
    pub description: Option<String>,
    /// Raw price as submitted; parsed and range-checked by the service
    pub price: String,
    pub image: Option<String>,
    pub ingredients: Option<String>,
    pub allergens: Option<String>,
    pub prep_time: Option<i32>,
    pub category_id: Option<Uuid>,
    pub cuisine_id: Option<Uuid>,
    /// Cuisine name, upserted when `cuisine_id` is absent
    pub cuisine: Option<String>,
    pub is_available: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_vegan: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct MealPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
    pub ingredients: Option<String>,
    pub allergens: Option<String>,
    pub prep_time: Option<i32>,
    pub category_id: Option<Uuid>,
    pub cuisine_id: Option<Uuid>,
    pub is_available: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_vegan: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLineRequest {
    pub meal_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    pub items: Vec<OrderLineRequest>,
    pub delivery_address: String,
    pub delivery_phone: String,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewReview {
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewPatch {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderApplication {
    pub business_name: String,
    pub description: Option<String>,
    pub phone: String,
    pub address: String,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderProfilePatch {
    pub business_name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub cuisine: Option<String>,
    pub opening_hours: Option<String>,
}

/// Admin-side user moderation; role and status arrive as raw strings
#[derive(Debug, Clone, Default)]
pub struct UserAdminPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_moves_are_allowed() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Preparing));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::OutForDelivery));
        assert!(OrderStatus::OutForDelivery.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Preparing));
    }

    #[test]
    fn backward_and_repeated_moves_are_rejected() {
        assert!(!OrderStatus::Preparing.can_transition_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Confirmed));
    }

    #[test]
    fn cancel_is_reachable_from_every_open_status() {
        for status in OrderStatus::ALL.into_iter().filter(|s| !s.is_terminal()) {
            assert!(status.can_transition_to(OrderStatus::Cancelled), "{status}");
        }
    }

    #[test]
    fn terminal_statuses_reject_everything() {
        for target in OrderStatus::ALL {
            assert!(!OrderStatus::Delivered.can_transition_to(target));
            assert!(!OrderStatus::Cancelled.can_transition_to(target));
        }
    }

    #[test]
    fn status_parsing_uses_the_allow_list() {
        assert_eq!("OUT_FOR_DELIVERY".parse::<OrderStatus>().ok(), Some(OrderStatus::OutForDelivery));
        assert!(matches!(
            "BOGUS".parse::<OrderStatus>(),
            Err(MarketplaceError::InvalidArgument { .. })
        ));
        assert!("pending".parse::<OrderStatus>().is_err());
        assert_eq!("ADMIN".parse::<Role>().ok(), Some(Role::Admin));
        assert!("USER".parse::<Role>().is_err());
    }

    #[test]
    fn rating_summary_counts_each_star() {
        let summary = RatingSummary::from_ratings(&[5, 5, 4, 1]);
        assert_eq!(summary.total_reviews, 4);
        assert_eq!(summary.distribution, [1, 0, 0, 1, 2]);
        assert_eq!(summary.average, 3.8);

        let empty = RatingSummary::from_ratings(&[]);
        assert_eq!(empty.average, 0.0);
        assert_eq!(empty.distribution, [0; 5]);
    }

    #[test]
    fn actor_ownership() {
        let provider = Uuid::new_v4();
        assert!(Actor::Admin.may_manage(None));
        assert!(Actor::Provider(provider).may_manage(Some(provider)));
        assert!(!Actor::Provider(provider).may_manage(Some(Uuid::new_v4())));
        assert!(!Actor::Provider(provider).may_manage(None));
    }
}
