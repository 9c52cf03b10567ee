use super::ApiContext;
use crate::api::rest::auth::CurrentUser;
use crate::api::rest::dto::*;
use crate::api::rest::error::Problem;
use crate::contract::Role;
use axum::{extract::Path, http::StatusCode, Extension, Json};
use uuid::Uuid;

pub async fn get_cart(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
) -> Result<Json<CartDto>, Problem> {
    let principal = user.require(&[Role::Customer])?;
    let cart = ctx.services.cart.get_cart(principal.user_id).await?;
    Ok(Json(cart.into()))
}

pub async fn add_item(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Json(req): Json<AddCartItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CartItemDto>>), Problem> {
    let principal = user.require(&[Role::Customer])?;
    let item = ctx
        .services
        .cart
        .add_item(principal.user_id, req.meal_id, req.quantity)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Item added to cart", item.into())),
    ))
}

pub async fn update_item(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path(meal_id): Path<Uuid>,
    Json(req): Json<UpdateCartItemRequest>,
) -> Result<Json<ApiResponse<CartItemDto>>, Problem> {
    let principal = user.require(&[Role::Customer])?;
    let item = ctx
        .services
        .cart
        .update_quantity(principal.user_id, meal_id, req.quantity)
        .await?;
    Ok(Json(ApiResponse::ok("Cart item updated", item.into())))
}

pub async fn remove_item(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path(meal_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, Problem> {
    let principal = user.require(&[Role::Customer])?;
    ctx.services
        .cart
        .remove_item(principal.user_id, meal_id)
        .await?;
    Ok(Json(ApiResponse::done("Item removed from cart")))
}

pub async fn clear_cart(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<ClearedCartDto>>, Problem> {
    let principal = user.require(&[Role::Customer])?;
    let removed_count = ctx.services.cart.clear(principal.user_id).await?;
    Ok(Json(ApiResponse::ok(
        "Cart cleared",
        ClearedCartDto { removed_count },
    )))
}
