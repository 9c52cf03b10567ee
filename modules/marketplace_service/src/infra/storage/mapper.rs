//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models. Enum columns are
//! stored as their upper-case text form, so reading them back is fallible.

use super::entity::{
    cart_item, category, cuisine, meal, order, order_item, provider_profile, review, user,
};
use crate::contract::{
    CartItem, Category, Cuisine, Meal, Order, OrderItem, OrderStatus, ProviderProfile, Review, Role,
    User, UserStatus,
};
use anyhow::Context;
use sea_orm::ActiveValue::Set;

// ===== User =====

impl TryFrom<user::Model> for User {
    type Error = anyhow::Error;

    fn try_from(entity: user::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            role: entity
                .role
                .parse::<Role>()
                .with_context(|| format!("user {} has unknown role", entity.id))?,
            status: entity
                .status
                .parse::<UserStatus>()
                .with_context(|| format!("user {} has unknown status", entity.id))?,
            id: entity.id,
            name: entity.name,
            email: entity.email,
            image: entity.image,
            phone: entity.phone,
            address: entity.address,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

impl From<&User> for user::ActiveModel {
    fn from(model: &User) -> Self {
        Self {
            id: Set(model.id),
            name: Set(model.name.clone()),
            email: Set(model.email.clone()),
            image: Set(model.image.clone()),
            phone: Set(model.phone.clone()),
            address: Set(model.address.clone()),
            role: Set(model.role.to_string()),
            status: Set(model.status.to_string()),
            is_active: Set(model.is_active),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

// ===== Provider profile =====

impl From<provider_profile::Model> for ProviderProfile {
    fn from(entity: provider_profile::Model) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            business_name: entity.business_name,
            description: entity.description,
            logo: entity.logo,
            phone: entity.phone,
            address: entity.address,
            website: entity.website,
            cuisine: entity.cuisine,
            opening_hours: entity.opening_hours,
            delivery_radius: entity.delivery_radius,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<&ProviderProfile> for provider_profile::ActiveModel {
    fn from(model: &ProviderProfile) -> Self {
        Self {
            id: Set(model.id),
            user_id: Set(model.user_id),
            business_name: Set(model.business_name.clone()),
            description: Set(model.description.clone()),
            logo: Set(model.logo.clone()),
            phone: Set(model.phone.clone()),
            address: Set(model.address.clone()),
            website: Set(model.website.clone()),
            cuisine: Set(model.cuisine.clone()),
            opening_hours: Set(model.opening_hours.clone()),
            delivery_radius: Set(model.delivery_radius),
            is_active: Set(model.is_active),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

// ===== Catalog =====

impl From<category::Model> for Category {
    fn from(entity: category::Model) -> Self {
        Self {
            id: entity.id,
            provider_id: entity.provider_id,
            name: entity.name,
            description: entity.description,
            image: entity.image,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<&Category> for category::ActiveModel {
    fn from(model: &Category) -> Self {
        Self {
            id: Set(model.id),
            provider_id: Set(model.provider_id),
            name: Set(model.name.clone()),
            description: Set(model.description.clone()),
            image: Set(model.image.clone()),
            is_active: Set(model.is_active),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

impl From<cuisine::Model> for Cuisine {
    fn from(entity: cuisine::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            created_at: entity.created_at,
        }
    }
}

impl From<meal::Model> for Meal {
    fn from(entity: meal::Model) -> Self {
        Self {
            id: entity.id,
            provider_id: entity.provider_id,
            category_id: entity.category_id,
            cuisine_id: entity.cuisine_id,
            name: entity.name,
            description: entity.description,
            price: entity.price,
            image: entity.image,
            ingredients: entity.ingredients,
            allergens: entity.allergens,
            prep_time: entity.prep_time,
            is_available: entity.is_available,
            is_featured: entity.is_featured,
            is_vegan: entity.is_vegan,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<&Meal> for meal::ActiveModel {
    fn from(model: &Meal) -> Self {
        Self {
            id: Set(model.id),
            provider_id: Set(model.provider_id),
            category_id: Set(model.category_id),
            cuisine_id: Set(model.cuisine_id),
            name: Set(model.name.clone()),
            description: Set(model.description.clone()),
            price: Set(model.price),
            image: Set(model.image.clone()),
            ingredients: Set(model.ingredients.clone()),
            allergens: Set(model.allergens.clone()),
            prep_time: Set(model.prep_time),
            is_available: Set(model.is_available),
            is_featured: Set(model.is_featured),
            is_vegan: Set(model.is_vegan),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

// ===== Cart =====

impl From<cart_item::Model> for CartItem {
    fn from(entity: cart_item::Model) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            meal_id: entity.meal_id,
            quantity: entity.quantity,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

// ===== Orders =====

impl TryFrom<order::Model> for Order {
    type Error = anyhow::Error;

    fn try_from(entity: order::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            status: entity
                .status
                .parse::<OrderStatus>()
                .with_context(|| format!("order {} has unknown status", entity.id))?,
            id: entity.id,
            order_number: entity.order_number,
            customer_id: entity.customer_id,
            provider_id: entity.provider_id,
            total_amount: entity.total_amount,
            delivery_address: entity.delivery_address,
            delivery_phone: entity.delivery_phone,
            special_instructions: entity.special_instructions,
            estimated_delivery_time: entity.estimated_delivery_time,
            actual_delivery_time: entity.actual_delivery_time,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

impl From<&Order> for order::ActiveModel {
    fn from(model: &Order) -> Self {
        Self {
            id: Set(model.id),
            order_number: Set(model.order_number.clone()),
            customer_id: Set(model.customer_id),
            provider_id: Set(model.provider_id),
            status: Set(model.status.to_string()),
            total_amount: Set(model.total_amount),
            delivery_address: Set(model.delivery_address.clone()),
            delivery_phone: Set(model.delivery_phone.clone()),
            special_instructions: Set(model.special_instructions.clone()),
            estimated_delivery_time: Set(model.estimated_delivery_time),
            actual_delivery_time: Set(model.actual_delivery_time),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

impl From<order_item::Model> for OrderItem {
    fn from(entity: order_item::Model) -> Self {
        Self {
            id: entity.id,
            order_id: entity.order_id,
            meal_id: entity.meal_id,
            meal_name: entity.meal_name,
            quantity: entity.quantity,
            price: entity.price,
        }
    }
}

impl From<&OrderItem> for order_item::ActiveModel {
    fn from(model: &OrderItem) -> Self {
        Self {
            id: Set(model.id),
            order_id: Set(model.order_id),
            meal_id: Set(model.meal_id),
            meal_name: Set(model.meal_name.clone()),
            quantity: Set(model.quantity),
            price: Set(model.price),
        }
    }
}

// ===== Reviews =====

impl From<review::Model> for Review {
    fn from(entity: review::Model) -> Self {
        Self {
            id: entity.id,
            customer_id: entity.customer_id,
            meal_id: entity.meal_id,
            rating: entity.rating,
            comment: entity.comment,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<&Review> for review::ActiveModel {
    fn from(model: &Review) -> Self {
        Self {
            id: Set(model.id),
            customer_id: Set(model.customer_id),
            meal_id: Set(model.meal_id),
            rating: Set(model.rating),
            comment: Set(model.comment.clone()),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}
