//! Platform administration: users, provider approval and categories

use super::catalog::{self, CategoryQuery};
use super::{non_blank, ApiContext, PageQuery};
use crate::api::rest::auth::CurrentUser;
use crate::api::rest::dto::*;
use crate::api::rest::error::Problem;
use crate::contract::{Actor, ProviderFilter, Role, UserFilter, UserStatus};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

impl UserQuery {
    fn into_filter(self) -> Result<UserFilter, Problem> {
        Ok(UserFilter {
            search: non_blank(self.search),
            role: non_blank(self.role).map(|r| r.parse::<Role>()).transpose()?,
            status: non_blank(self.status)
                .map(|s| s.parse::<UserStatus>())
                .transpose()?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderQuery {
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

fn require_admin(user: &CurrentUser) -> Result<(), Problem> {
    user.require(&[Role::Admin]).map(|_| ())
}

// ===== Users =====

pub async fn list_users(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Query(paging): Query<PageQuery>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ListResponse<UserDto>>, Problem> {
    require_admin(&user)?;
    let filter = query.into_filter()?;
    let page = ctx
        .services
        .users
        .list_users(&filter, &ctx.page(&paging))
        .await?;
    Ok(Json(page.into()))
}

pub async fn update_user(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, Problem> {
    require_admin(&user)?;
    let updated = ctx.services.users.update_user(user_id, req.into()).await?;
    Ok(Json(ApiResponse::ok("User updated successfully", updated.into())))
}

pub async fn delete_user(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, Problem> {
    require_admin(&user)?;
    ctx.services.users.delete_user(user_id).await?;
    Ok(Json(ApiResponse::done("User deleted successfully")))
}

// ===== Providers =====

pub async fn list_providers(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Query(paging): Query<PageQuery>,
    Query(query): Query<ProviderQuery>,
) -> Result<Json<ListResponse<ProviderWithCountsDto>>, Problem> {
    require_admin(&user)?;
    let filter = ProviderFilter {
        search: non_blank(query.search),
        is_active: query.is_active,
    };
    let page = ctx
        .services
        .users
        .list_providers(&filter, &ctx.page(&paging))
        .await?;
    Ok(Json(page.into()))
}

pub async fn set_provider_approval(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path(provider_id): Path<Uuid>,
    Json(req): Json<ProviderApprovalRequest>,
) -> Result<Json<ApiResponse<ProviderProfileDto>>, Problem> {
    require_admin(&user)?;
    let profile = ctx
        .services
        .users
        .set_provider_active(provider_id, req.is_active)
        .await?;
    let message = if req.is_active {
        "Provider approved successfully"
    } else {
        "Provider deactivated successfully"
    };
    Ok(Json(ApiResponse::ok(message, profile.into())))
}

// ===== Categories =====

/// Every category, inactive and provider-scoped ones included
pub async fn list_categories(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Query(paging): Query<PageQuery>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<ListResponse<CategoryWithCountDto>>, Problem> {
    require_admin(&user)?;
    let page = ctx
        .services
        .catalog
        .list_categories(&query.into_filter(), &ctx.page(&paging))
        .await?;
    Ok(Json(page.into()))
}

pub async fn create_category(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDto>>), Problem> {
    require_admin(&user)?;
    catalog::create_category(&ctx, Actor::Admin, req).await
}

pub async fn update_category(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<CategoryDto>>, Problem> {
    require_admin(&user)?;
    catalog::update_category(&ctx, category_id, Actor::Admin, req).await
}

pub async fn delete_category(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, Problem> {
    require_admin(&user)?;
    catalog::delete_category(&ctx, category_id, Actor::Admin).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_filter_rejects_unknown_role() {
        let query = UserQuery {
            role: Some("SUPERUSER".into()),
            ..Default::default()
        };
        assert_eq!(query.into_filter().unwrap_err().status, 400);

        let query = UserQuery {
            role: Some("PROVIDER".into()),
            status: Some("SUSPENDED".into()),
            search: Some(" ".into()),
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.role, Some(Role::Provider));
        assert_eq!(filter.status, Some(UserStatus::Suspended));
        assert_eq!(filter.search, None);
    }
}
