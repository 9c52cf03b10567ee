//! Order placement, tracking and status transitions

use super::{non_blank, ApiContext, PageQuery};
use crate::api::rest::auth::{resolve_actor, CurrentUser};
use crate::api::rest::dto::*;
use crate::api::rest::error::Problem;
use crate::contract::{OrderFilter, OrderStatus, Role};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub customer_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
}

fn parse_status(raw: Option<String>) -> Result<Option<OrderStatus>, Problem> {
    Ok(non_blank(raw).map(|s| s.parse::<OrderStatus>()).transpose()?)
}

pub async fn create_order(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderDetailsDto>>), Problem> {
    let principal = user.require(&[Role::Customer])?;
    let order = ctx
        .services
        .orders
        .create_order(principal.user_id, req.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Order placed successfully", order.into())),
    ))
}

pub async fn my_orders(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Query(paging): Query<PageQuery>,
) -> Result<Json<ListResponse<OrderDetailsDto>>, Problem> {
    let principal = user.require(&[Role::Customer])?;
    let page = ctx
        .services
        .orders
        .my_orders(principal.user_id, &ctx.page(&paging))
        .await?;
    Ok(Json(page.into()))
}

/// A customer sees its own orders, a provider the orders placed with it
pub async fn get_order(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetailsDto>, Problem> {
    let principal = user.require(&[Role::Customer, Role::Provider])?;
    let order = match principal.role {
        Role::Provider => {
            let profile = ctx.services.users.provider_for_user(principal.user_id).await?;
            ctx.services
                .orders
                .get_provider_order(order_id, profile.id)
                .await?
        }
        _ => {
            ctx.services
                .orders
                .get_order(order_id, principal.user_id)
                .await?
        }
    };
    Ok(Json(order.into()))
}

pub async fn provider_orders(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Query(paging): Query<PageQuery>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<ListResponse<OrderDetailsDto>>, Problem> {
    let principal = user.require(&[Role::Provider])?;
    let profile = ctx.services.users.provider_for_user(principal.user_id).await?;
    let status = parse_status(query.status)?;

    let page = ctx
        .services
        .orders
        .provider_orders(profile.id, status, &ctx.page(&paging))
        .await?;
    Ok(Json(page.into()))
}

pub async fn all_orders(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Query(paging): Query<PageQuery>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<ListResponse<OrderDetailsDto>>, Problem> {
    let principal = user.require(&[Role::Admin, Role::Provider])?;
    let actor = resolve_actor(&ctx.services, principal).await?;

    let filter = OrderFilter {
        search: non_blank(query.search),
        status: parse_status(query.status)?,
        customer_id: query.customer_id,
        provider_id: query.provider_id,
    };
    let page = ctx
        .services
        .orders
        .all_orders(actor, filter, &ctx.page(&paging))
        .await?;
    Ok(Json(page.into()))
}

pub async fn update_status(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<OrderDto>>, Problem> {
    let principal = user.require(&[Role::Admin, Role::Provider])?;
    let actor = resolve_actor(&ctx.services, principal).await?;

    let order = ctx
        .services
        .orders
        .update_status(order_id, actor, &req.status)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Order status updated successfully",
        order.into(),
    )))
}
