//! Conversions between REST DTOs and contract models

use super::dto::*;
use crate::contract::{self, Page};
use std::collections::BTreeMap;

// ===== Envelopes =====

impl From<contract::Pagination> for PaginationDto {
    fn from(p: contract::Pagination) -> Self {
        Self {
            total: p.total,
            page: p.page,
            limit: p.limit,
            total_pages: p.total_pages,
        }
    }
}

impl<T, D: From<T>> From<Page<T>> for ListResponse<D> {
    fn from(page: Page<T>) -> Self {
        Self {
            data: page.data.into_iter().map(D::from).collect(),
            pagination: page.pagination.into(),
        }
    }
}

// ===== Users & providers =====

impl From<contract::User> for UserDto {
    fn from(user: contract::User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            image: user.image,
            phone: user.phone,
            address: user.address,
            role: user.role.to_string(),
            status: user.status.to_string(),
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<contract::UserSummary> for UserSummaryDto {
    fn from(s: contract::UserSummary) -> Self {
        Self {
            id: s.id,
            name: s.name,
            email: s.email,
            image: s.image,
            phone: s.phone,
        }
    }
}

impl From<contract::ProviderProfile> for ProviderProfileDto {
    fn from(p: contract::ProviderProfile) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            business_name: p.business_name,
            description: p.description,
            logo: p.logo,
            phone: p.phone,
            address: p.address,
            website: p.website,
            cuisine: p.cuisine,
            opening_hours: p.opening_hours,
            delivery_radius: p.delivery_radius,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<contract::ProviderSummary> for ProviderSummaryDto {
    fn from(p: contract::ProviderSummary) -> Self {
        Self {
            id: p.id,
            business_name: p.business_name,
            phone: p.phone,
            address: p.address,
            is_active: p.is_active,
        }
    }
}

impl From<contract::ProviderWithCounts> for ProviderWithCountsDto {
    fn from(p: contract::ProviderWithCounts) -> Self {
        Self {
            profile: p.profile.into(),
            user: p.owner.map(Into::into),
            meal_count: p.meal_count,
            order_count: p.order_count,
        }
    }
}

impl From<contract::UserProfile> for UserProfileDto {
    fn from(p: contract::UserProfile) -> Self {
        Self {
            user: p.user.into(),
            provider_profile: p.provider.map(Into::into),
        }
    }
}

// ===== Catalog =====

impl From<contract::Category> for CategoryDto {
    fn from(c: contract::Category) -> Self {
        Self {
            id: c.id,
            provider_id: c.provider_id,
            name: c.name,
            description: c.description,
            image: c.image,
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<contract::CategoryWithCount> for CategoryWithCountDto {
    fn from(c: contract::CategoryWithCount) -> Self {
        Self {
            category: c.category.into(),
            meal_count: c.meal_count,
        }
    }
}

impl From<contract::Cuisine> for CuisineDto {
    fn from(c: contract::Cuisine) -> Self {
        Self {
            id: c.id,
            name: c.name,
            created_at: c.created_at,
        }
    }
}

impl From<contract::CuisineWithCount> for CuisineWithCountDto {
    fn from(c: contract::CuisineWithCount) -> Self {
        Self {
            cuisine: c.cuisine.into(),
            meal_count: c.meal_count,
        }
    }
}

impl From<contract::Meal> for MealDto {
    fn from(m: contract::Meal) -> Self {
        Self {
            id: m.id,
            provider_id: m.provider_id,
            category_id: m.category_id,
            cuisine_id: m.cuisine_id,
            name: m.name,
            description: m.description,
            price: m.price,
            image: m.image,
            ingredients: m.ingredients,
            allergens: m.allergens,
            prep_time: m.prep_time,
            is_available: m.is_available,
            is_featured: m.is_featured,
            is_vegan: m.is_vegan,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<contract::MealView> for MealViewDto {
    fn from(v: contract::MealView) -> Self {
        Self {
            meal: v.meal.into(),
            category: v.category.map(Into::into),
            cuisine: v.cuisine.map(Into::into),
            provider: v.provider.map(Into::into),
            avg_rating: v.avg_rating,
            review_count: v.review_count,
        }
    }
}

impl From<contract::RatingSummary> for RatingSummaryDto {
    fn from(s: contract::RatingSummary) -> Self {
        let rating_distribution: BTreeMap<String, u64> = s
            .distribution
            .iter()
            .enumerate()
            .map(|(i, count)| ((i + 1).to_string(), *count))
            .collect();
        Self {
            average_rating: s.average,
            total_reviews: s.total_reviews,
            rating_distribution,
        }
    }
}

impl From<contract::MealDetails> for MealDetailsDto {
    fn from(d: contract::MealDetails) -> Self {
        Self {
            view: d.view.into(),
            reviews: d.recent_reviews.into_iter().map(Into::into).collect(),
            rating_summary: d.rating_summary.into(),
        }
    }
}

impl From<CreateCategoryRequest> for contract::NewCategory {
    fn from(req: CreateCategoryRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            image: req.image,
            is_active: req.is_active,
            provider_id: req.provider_id,
        }
    }
}

impl From<UpdateCategoryRequest> for contract::CategoryPatch {
    fn from(req: UpdateCategoryRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            image: req.image,
            is_active: req.is_active,
        }
    }
}

impl From<CreateMealRequest> for contract::NewMeal {
    fn from(req: CreateMealRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            price: req.price.into_raw(),
            image: req.image,
            ingredients: req.ingredients,
            allergens: req.allergens,
            prep_time: req.prep_time,
            category_id: req.category_id,
            cuisine_id: req.cuisine_id,
            cuisine: req.cuisine,
            is_available: req.is_available,
            is_featured: req.is_featured,
            is_vegan: req.is_vegan,
        }
    }
}

impl From<UpdateMealRequest> for contract::MealPatch {
    fn from(req: UpdateMealRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            price: req.price.map(PriceInput::into_raw),
            image: req.image,
            ingredients: req.ingredients,
            allergens: req.allergens,
            prep_time: req.prep_time,
            category_id: req.category_id,
            cuisine_id: req.cuisine_id,
            is_available: req.is_available,
            is_featured: req.is_featured,
            is_vegan: req.is_vegan,
        }
    }
}

// ===== Cart =====

impl From<contract::CartItem> for CartItemDto {
    fn from(i: contract::CartItem) -> Self {
        Self {
            id: i.id,
            meal_id: i.meal_id,
            quantity: i.quantity,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

impl From<contract::CartLine> for CartLineDto {
    fn from(line: contract::CartLine) -> Self {
        let line_total = line.line_total();
        Self {
            item: line.item.into(),
            meal: line.meal.into(),
            line_total,
        }
    }
}

impl From<contract::Cart> for CartDto {
    fn from(cart: contract::Cart) -> Self {
        Self {
            items: cart.items.into_iter().map(Into::into).collect(),
            total_amount: cart.total_amount,
            item_count: cart.item_count,
        }
    }
}

// ===== Orders =====

impl From<contract::Order> for OrderDto {
    fn from(o: contract::Order) -> Self {
        Self {
            id: o.id,
            order_number: o.order_number,
            customer_id: o.customer_id,
            provider_id: o.provider_id,
            status: o.status.to_string(),
            total_amount: o.total_amount,
            delivery_address: o.delivery_address,
            delivery_phone: o.delivery_phone,
            special_instructions: o.special_instructions,
            estimated_delivery_time: o.estimated_delivery_time,
            actual_delivery_time: o.actual_delivery_time,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

impl From<contract::OrderItem> for OrderItemDto {
    fn from(i: contract::OrderItem) -> Self {
        let line_total = i.line_total();
        Self {
            id: i.id,
            meal_id: i.meal_id,
            meal_name: i.meal_name,
            quantity: i.quantity,
            price: i.price,
            line_total,
        }
    }
}

impl From<contract::OrderDetails> for OrderDetailsDto {
    fn from(d: contract::OrderDetails) -> Self {
        Self {
            order: d.order.into(),
            items: d.items.into_iter().map(Into::into).collect(),
            customer: d.customer.map(Into::into),
            provider: d.provider.map(Into::into),
        }
    }
}

impl From<CreateOrderRequest> for contract::NewOrder {
    fn from(req: CreateOrderRequest) -> Self {
        Self {
            items: req
                .items
                .into_iter()
                .map(|line| contract::OrderLineRequest {
                    meal_id: line.meal_id,
                    quantity: line.quantity,
                })
                .collect(),
            delivery_address: req.delivery_address,
            delivery_phone: req.delivery_phone,
            special_instructions: req.special_instructions,
        }
    }
}

// ===== Reviews =====

impl From<contract::ReviewView> for ReviewDto {
    fn from(v: contract::ReviewView) -> Self {
        let r = v.review;
        Self {
            id: r.id,
            customer_id: r.customer_id,
            meal_id: r.meal_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
            updated_at: r.updated_at,
            customer: v.customer.map(Into::into),
        }
    }
}

impl From<CreateReviewRequest> for contract::NewReview {
    fn from(req: CreateReviewRequest) -> Self {
        Self {
            rating: req.rating,
            comment: req.comment,
        }
    }
}

impl From<UpdateReviewRequest> for contract::ReviewPatch {
    fn from(req: UpdateReviewRequest) -> Self {
        Self {
            rating: req.rating,
            comment: req.comment,
        }
    }
}

// ===== Profile & admin =====

impl From<UpdateProfileRequest> for contract::ProfilePatch {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
            address: req.address,
            image: req.image,
        }
    }
}

impl From<ProviderApplicationRequest> for contract::ProviderApplication {
    fn from(req: ProviderApplicationRequest) -> Self {
        Self {
            business_name: req.business_name,
            description: req.description,
            phone: req.phone,
            address: req.address,
            logo: req.logo,
        }
    }
}

impl From<UpdateProviderProfileRequest> for contract::ProviderProfilePatch {
    fn from(req: UpdateProviderProfileRequest) -> Self {
        Self {
            business_name: req.business_name,
            description: req.description,
            logo: req.logo,
            phone: req.phone,
            address: req.address,
            website: req.website,
            cuisine: req.cuisine,
            opening_hours: req.opening_hours,
        }
    }
}

impl From<AdminUpdateUserRequest> for contract::UserAdminPatch {
    fn from(req: AdminUpdateUserRequest) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
            address: req.address,
            role: req.role,
            status: req.status,
            is_active: req.is_active,
        }
    }
}
