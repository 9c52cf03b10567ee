//! Self-service profile and public provider pages

use super::ApiContext;
use crate::api::rest::auth::CurrentUser;
use crate::api::rest::dto::*;
use crate::api::rest::error::Problem;
use crate::contract::Role;
use axum::{extract::Path, http::StatusCode, Extension, Json};
use uuid::Uuid;

pub async fn my_profile(
    Extension(ctx): Extension<ApiContext>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<UserProfileDto>, Problem> {
    let profile = ctx.services.users.my_profile(principal.user_id).await?;
    Ok(Json(profile.into()))
}

pub async fn update_profile(
    Extension(ctx): Extension<ApiContext>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>, Problem> {
    let user = ctx
        .services
        .users
        .update_profile(principal.user_id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok("Profile updated successfully", user.into())))
}

/// Submitted profiles start inactive until an admin approves them
pub async fn apply_for_provider(
    Extension(ctx): Extension<ApiContext>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<ProviderApplicationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProviderProfileDto>>), Problem> {
    let profile = ctx
        .services
        .users
        .apply_for_provider(principal.user_id, req.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Provider application submitted. Awaiting admin approval",
            profile.into(),
        )),
    ))
}

pub async fn update_provider_profile(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Json(req): Json<UpdateProviderProfileRequest>,
) -> Result<Json<ApiResponse<ProviderProfileDto>>, Problem> {
    let principal = user.require(&[Role::Provider])?;
    let profile = ctx
        .services
        .users
        .update_provider_profile(principal.user_id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(
        "Provider profile updated successfully",
        profile.into(),
    )))
}

pub async fn get_provider(
    Extension(ctx): Extension<ApiContext>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<ProviderWithCountsDto>, Problem> {
    let provider = ctx.services.users.get_provider(provider_id).await?;
    Ok(Json(provider.into()))
}
