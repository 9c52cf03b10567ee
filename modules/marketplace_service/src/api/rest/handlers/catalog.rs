//! Meals, categories and cuisines

use super::{non_blank, ApiContext, PageQuery};
use crate::api::rest::auth::{resolve_actor, CurrentUser};
use crate::api::rest::dto::*;
use crate::api::rest::error::Problem;
use crate::contract::{Actor, CategoryFilter, MealFilter, Role};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealQuery {
    pub search: Option<String>,
    /// Category name substring
    pub category: Option<String>,
    /// Comma separated category ids
    pub category_ids: Option<String>,
    #[serde(alias = "minPrice")]
    pub price_min: Option<Decimal>,
    #[serde(alias = "maxPrice")]
    pub price_max: Option<Decimal>,
    pub cuisine: Option<String>,
    pub is_vegan: Option<bool>,
    pub is_featured: Option<bool>,
    pub provider_id: Option<Uuid>,
}

impl MealQuery {
    fn into_filter(self) -> Result<MealFilter, Problem> {
        let category_ids = match non_blank(self.category_ids) {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<Uuid>()
                        .map_err(|_| Problem::bad_request(format!("Invalid category id '{}'", s)))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(MealFilter {
            search: non_blank(self.search),
            category: non_blank(self.category),
            category_ids,
            price_min: self.price_min,
            price_max: self.price_max,
            cuisine: non_blank(self.cuisine),
            is_vegan: self.is_vegan,
            is_featured: self.is_featured,
            provider_id: self.provider_id,
            is_available: None,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryQuery {
    pub search: Option<String>,
    pub provider_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl CategoryQuery {
    pub(crate) fn into_filter(self) -> CategoryFilter {
        CategoryFilter {
            search: non_blank(self.search),
            is_active: self.is_active,
            provider_id: self.provider_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CuisineQuery {
    pub search: Option<String>,
}

// ===== Meals =====

/// Public catalog; only available meals are listed
pub async fn list_meals(
    Extension(ctx): Extension<ApiContext>,
    Query(paging): Query<PageQuery>,
    Query(query): Query<MealQuery>,
) -> Result<Json<ListResponse<MealViewDto>>, Problem> {
    let mut filter = query.into_filter()?;
    filter.is_available = Some(true);

    let page = ctx
        .services
        .catalog
        .list_meals(&filter, &ctx.page(&paging))
        .await?;
    Ok(Json(page.into()))
}

pub async fn get_meal(
    Extension(ctx): Extension<ApiContext>,
    Path(meal_id): Path<Uuid>,
) -> Result<Json<MealDetailsDto>, Problem> {
    let details = ctx.services.catalog.get_meal(meal_id).await?;
    Ok(Json(details.into()))
}

/// The calling provider's full menu, unavailable meals included
pub async fn provider_meals(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Query(paging): Query<PageQuery>,
    Query(query): Query<MealQuery>,
) -> Result<Json<ListResponse<MealViewDto>>, Problem> {
    let principal = user.require(&[Role::Provider])?;
    let profile = ctx.services.users.provider_for_user(principal.user_id).await?;

    let mut filter = query.into_filter()?;
    filter.provider_id = Some(profile.id);

    let page = ctx
        .services
        .catalog
        .list_meals(&filter, &ctx.page(&paging))
        .await?;
    Ok(Json(page.into()))
}

pub async fn create_meal(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Json(req): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MealDto>>), Problem> {
    let principal = user.require(&[Role::Provider])?;
    let profile = ctx.services.users.provider_for_user(principal.user_id).await?;

    let meal = ctx
        .services
        .catalog
        .create_meal(profile.id, req.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Meal created successfully", meal.into())),
    ))
}

pub async fn update_meal(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path(meal_id): Path<Uuid>,
    Json(req): Json<UpdateMealRequest>,
) -> Result<Json<ApiResponse<MealDto>>, Problem> {
    let principal = user.require(&[Role::Provider, Role::Admin])?;
    let actor = resolve_actor(&ctx.services, principal).await?;

    let meal = ctx
        .services
        .catalog
        .update_meal(meal_id, actor, req.into())
        .await?;
    Ok(Json(ApiResponse::ok("Meal updated successfully", meal.into())))
}

pub async fn delete_meal(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path(meal_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, Problem> {
    let principal = user.require(&[Role::Provider, Role::Admin])?;
    let actor = resolve_actor(&ctx.services, principal).await?;

    ctx.services.catalog.delete_meal(meal_id, actor).await?;
    Ok(Json(ApiResponse::done("Meal deleted successfully")))
}

// ===== Categories =====

/// Public category list; inactive categories are hidden
pub async fn list_categories(
    Extension(ctx): Extension<ApiContext>,
    Query(paging): Query<PageQuery>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<ListResponse<CategoryWithCountDto>>, Problem> {
    let mut filter = query.into_filter();
    filter.is_active = Some(true);

    let page = ctx
        .services
        .catalog
        .list_categories(&filter, &ctx.page(&paging))
        .await?;
    Ok(Json(page.into()))
}

pub async fn create_provider_category(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDto>>), Problem> {
    let principal = user.require(&[Role::Provider])?;
    let actor = resolve_actor(&ctx.services, principal).await?;
    create_category(&ctx, actor, req).await
}

pub async fn update_provider_category(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<CategoryDto>>, Problem> {
    let principal = user.require(&[Role::Provider])?;
    let actor = resolve_actor(&ctx.services, principal).await?;
    update_category(&ctx, category_id, actor, req).await
}

pub async fn delete_provider_category(
    Extension(ctx): Extension<ApiContext>,
    user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, Problem> {
    let principal = user.require(&[Role::Provider])?;
    let actor = resolve_actor(&ctx.services, principal).await?;
    delete_category(&ctx, category_id, actor).await
}

pub(crate) async fn create_category(
    ctx: &ApiContext,
    actor: Actor,
    req: CreateCategoryRequest,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDto>>), Problem> {
    let category = ctx
        .services
        .catalog
        .create_category(actor, req.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Category created successfully", category.into())),
    ))
}

pub(crate) async fn update_category(
    ctx: &ApiContext,
    category_id: Uuid,
    actor: Actor,
    req: UpdateCategoryRequest,
) -> Result<Json<ApiResponse<CategoryDto>>, Problem> {
    let category = ctx
        .services
        .catalog
        .update_category(category_id, actor, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(
        "Category updated successfully",
        category.into(),
    )))
}

pub(crate) async fn delete_category(
    ctx: &ApiContext,
    category_id: Uuid,
    actor: Actor,
) -> Result<Json<ApiResponse<()>>, Problem> {
    ctx.services
        .catalog
        .delete_category(category_id, actor)
        .await?;
    Ok(Json(ApiResponse::done("Category deleted successfully")))
}

// ===== Cuisines =====

pub async fn list_cuisines(
    Extension(ctx): Extension<ApiContext>,
    Query(paging): Query<PageQuery>,
    Query(query): Query<CuisineQuery>,
) -> Result<Json<ListResponse<CuisineWithCountDto>>, Problem> {
    let search = non_blank(query.search);
    let page = ctx
        .services
        .catalog
        .list_cuisines(search.as_deref(), &ctx.page(&paging))
        .await?;
    Ok(Json(page.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ids_are_split_and_trimmed() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let query = MealQuery {
            category_ids: Some(format!("{a}, {b},")),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.category_ids, vec![a, b]);
    }

    #[test]
    fn malformed_category_id_is_a_bad_request() {
        let query = MealQuery {
            category_ids: Some("not-a-uuid".into()),
            ..Default::default()
        };
        let problem = query.into_filter().unwrap_err();
        assert_eq!(problem.status, 400);
    }
}
