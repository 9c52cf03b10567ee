//! Route registration

use super::handlers::{self, admin, cart, catalog, orders, reviews, users, ApiContext};
use crate::domain::IdentityProvider;
use axum::{
    routing::{get, patch, post, put},
    Extension, Router,
};
use std::sync::Arc;

/// Mount every marketplace endpoint under `/api`
pub fn register_routes(
    router: Router,
    ctx: ApiContext,
    identity: Arc<dyn IdentityProvider>,
) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        // Catalog
        .route("/meals", get(catalog::list_meals).post(catalog::create_meal))
        .route(
            "/meals/{meal_id}",
            get(catalog::get_meal)
                .put(catalog::update_meal)
                .delete(catalog::delete_meal),
        )
        .route("/provider/meals", get(catalog::provider_meals))
        .route("/categories", get(catalog::list_categories))
        .route("/provider/categories", post(catalog::create_provider_category))
        .route(
            "/provider/categories/{category_id}",
            put(catalog::update_provider_category).delete(catalog::delete_provider_category),
        )
        .route("/cuisines", get(catalog::list_cuisines))
        // Reviews
        .route(
            "/meals/{meal_id}/reviews",
            get(reviews::meal_reviews).post(reviews::create_review),
        )
        .route(
            "/meals/{meal_id}/reviews/{review_id}",
            put(reviews::update_review).delete(reviews::delete_review),
        )
        // Cart
        .route("/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/items", post(cart::add_item))
        .route(
            "/cart/items/{meal_id}",
            put(cart::update_item).delete(cart::remove_item),
        )
        // Orders
        .route("/orders", get(orders::my_orders).post(orders::create_order))
        .route("/orders/all", get(orders::all_orders))
        .route("/orders/provider/orders", get(orders::provider_orders))
        .route("/orders/{order_id}", get(orders::get_order))
        .route("/orders/{order_id}/status", patch(orders::update_status))
        // Users & providers
        .route("/users/me", get(users::my_profile).put(users::update_profile))
        .route(
            "/users/me/provider",
            post(users::apply_for_provider).put(users::update_provider_profile),
        )
        .route("/providers/{provider_id}", get(users::get_provider))
        // Admin
        .route("/admin/users", get(admin::list_users))
        .route(
            "/admin/users/{user_id}",
            patch(admin::update_user).delete(admin::delete_user),
        )
        .route("/admin/providers", get(admin::list_providers))
        .route(
            "/admin/providers/{provider_id}/approval",
            patch(admin::set_provider_approval),
        )
        .route(
            "/admin/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route(
            "/admin/categories/{category_id}",
            put(admin::update_category).delete(admin::delete_category),
        )
        .layer(Extension(ctx))
        .layer(Extension(identity));

    router.nest("/api", api)
}
