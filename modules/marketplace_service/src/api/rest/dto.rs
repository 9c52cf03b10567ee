//! REST DTOs with serde derives for HTTP API

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

// ===== Envelopes =====

/// Mutation envelope
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDto {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// List envelope
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationDto,
}

// ===== Users & providers =====

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[schema(example = "CUSTOMER")]
    pub role: String,
    #[schema(example = "ACTIVE")]
    pub status: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public display fields of a user
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfileDto {
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
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummaryDto {
    pub id: Uuid,
    pub business_name: String,
    pub phone: String,
    pub address: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderWithCountsDto {
    #[serde(flatten)]
    pub profile: ProviderProfileDto,
    pub user: Option<UserSummaryDto>,
    pub meal_count: u64,
    pub order_count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub provider_profile: Option<ProviderProfileDto>,
}

// ===== Catalog =====

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: Uuid,
    /// Absent for global categories
    pub provider_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCountDto {
    #[serde(flatten)]
    pub category: CategoryDto,
    pub meal_count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CuisineDto {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CuisineWithCountDto {
    #[serde(flatten)]
    pub cuisine: CuisineDto,
    pub meal_count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealDto {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub category_id: Option<Uuid>,
    pub cuisine_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "12.50")]
    pub price: Decimal,
    pub image: Option<String>,
    pub ingredients: Option<String>,
    pub allergens: Option<String>,
    /// Minutes
    pub prep_time: Option<i32>,
    pub is_available: bool,
    pub is_featured: bool,
    pub is_vegan: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealViewDto {
    #[serde(flatten)]
    pub meal: MealDto,
    pub category: Option<CategoryDto>,
    pub cuisine: Option<CuisineDto>,
    pub provider: Option<ProviderSummaryDto>,
    pub avg_rating: f64,
    pub review_count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummaryDto {
    pub average_rating: f64,
    pub total_reviews: u64,
    /// Keys "1" through "5"
    pub rating_distribution: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealDetailsDto {
    #[serde(flatten)]
    pub view: MealViewDto,
    pub reviews: Vec<ReviewDto>,
    pub rating_summary: RatingSummaryDto,
}

/// Price accepted as a JSON number or a decimal string
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PriceInput {
    Text(String),
    Number(f64),
}

impl PriceInput {
    pub fn into_raw(self) -> String {
        match self {
            PriceInput::Text(raw) => raw,
            PriceInput::Number(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
    /// Admin only; omitted means a global category
    pub provider_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: PriceInput,
    pub image: Option<String>,
    pub ingredients: Option<String>,
    pub allergens: Option<String>,
    pub prep_time: Option<i32>,
    pub category_id: Option<Uuid>,
    pub cuisine_id: Option<Uuid>,
    /// Cuisine name, created on first use
    pub cuisine: Option<String>,
    pub is_available: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_vegan: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMealRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<PriceInput>,
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

// ===== Cart =====

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDto {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineDto {
    #[serde(flatten)]
    pub item: CartItemDto,
    pub meal: MealDto,
    #[schema(value_type = String)]
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartDto {
    pub items: Vec<CartLineDto>,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub item_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearedCartDto {
    pub removed_count: u64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub meal_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

// ===== Orders =====

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: Uuid,
    #[schema(example = "ORD-1718000000000-K3J9X2ABQ")]
    pub order_number: String,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    #[schema(example = "PENDING")]
    pub status: String,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub delivery_address: String,
    pub delivery_phone: String,
    pub special_instructions: Option<String>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    pub actual_delivery_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub meal_name: String,
    pub quantity: i32,
    /// Unit price at order time
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailsDto {
    #[serde(flatten)]
    pub order: OrderDto,
    pub items: Vec<OrderItemDto>,
    pub customer: Option<UserSummaryDto>,
    pub provider: Option<ProviderSummaryDto>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequestDto {
    pub meal_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequestDto>,
    pub delivery_address: String,
    pub delivery_phone: String,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[schema(example = "CONFIRMED")]
    pub status: String,
}

// ===== Reviews =====

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub meal_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer: Option<UserSummaryDto>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListResponse {
    pub data: Vec<ReviewDto>,
    pub pagination: PaginationDto,
    pub rating_summary: RatingSummaryDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

// ===== Profile & admin requests =====

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderApplicationRequest {
    pub business_name: String,
    pub description: Option<String>,
    pub phone: String,
    pub address: String,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProviderProfileRequest {
    pub business_name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub cuisine: Option<String>,
    pub opening_hours: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[schema(example = "PROVIDER")]
    pub role: Option<String>,
    #[schema(example = "SUSPENDED")]
    pub status: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderApprovalRequest {
    pub is_active: bool,
}
