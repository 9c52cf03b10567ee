use super::{ApiContext, PageQuery};
use crate::api::rest::auth::CurrentUser;
use crate::api::rest::dto::*;
use crate::api::rest::error::Problem;
use crate::contract::Role;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

pub async fn meal_reviews(
    Extension(ctx): Extension<ApiContext>,
    Path(meal_id): Path<Uuid>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<ReviewListResponse>, Problem> {
    let (page, summary) = ctx
        .services
        .reviews
        .meal_reviews(meal_id, &ctx.page(&paging))
        .await?;
    Ok(Json(ReviewListResponse {
        data: page.data.into_iter().map(Into::into).collect(),
        pagination: page.pagination.into(),
        rating_summary: summary.into(),
    }))
}

pub async fn create_review(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path(meal_id): Path<Uuid>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewDto>>), Problem> {
    let principal = user.require(&[Role::Customer])?;
    let review = ctx
        .services
        .reviews
        .create_review(principal.user_id, meal_id, req.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Review created successfully", review.into())),
    ))
}

/// The meal segment only scopes the URL; ownership is checked on the review itself
pub async fn update_review(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path((_meal_id, review_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateReviewRequest>,
) -> Result<Json<ApiResponse<ReviewDto>>, Problem> {
    let principal = user.require(&[Role::Customer])?;
    let review = ctx
        .services
        .reviews
        .update_review(principal.user_id, review_id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok("Review updated successfully", review.into())))
}

pub async fn delete_review(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path((_meal_id, review_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<()>>, Problem> {
    let principal = user.require(&[Role::Customer])?;
    ctx.services
        .reviews
        .delete_review(principal.user_id, review_id)
        .await?;
    Ok(Json(ApiResponse::done("Review deleted successfully")))
}
