//! Catalog management - categories, cuisines and meals

use super::repository::Repositories;
use super::reviews::attach_customers;
use super::validation::{optional_text, parse_price, required_text};
use super::internal;
use crate::config::Config;
use crate::contract::*;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

pub struct CatalogService {
    repos: Repositories,
    config: Config,
}

impl CatalogService {
    pub fn new(repos: Repositories, config: Config) -> Self {
        Self { repos, config }
    }

    // ===== Categories =====

    pub async fn list_categories(
        &self,
        filter: &CategoryFilter,
        page: &PageRequest,
    ) -> Result<Page<CategoryWithCount>, MarketplaceError> {
        let (categories, total) = self
            .repos
            .categories
            .list(filter, page)
            .await
            .map_err(internal)?;

        let ids: Vec<Uuid> = categories.iter().map(|c| c.id).collect();
        let counts = self
            .repos
            .meals
            .count_by_categories(&ids)
            .await
            .map_err(internal)?;

        let data = categories
            .into_iter()
            .map(|category| CategoryWithCount {
                meal_count: counts.get(&category.id).copied().unwrap_or(0),
                category,
            })
            .collect();

        Ok(Page::new(data, total, page))
    }

    /// Create a category; providers always create inside their own scope
    pub async fn create_category(
        &self,
        actor: Actor,
        input: NewCategory,
    ) -> Result<Category, MarketplaceError> {
        let name = required_text("Category name", &input.name)?;
        let scope = match actor {
            Actor::Provider(provider_id) => Some(provider_id),
            Actor::Admin => input.provider_id,
        };

        if let Some(provider_id) = scope {
            self.require_active_provider(provider_id).await?;
        }

        if self
            .repos
            .categories
            .find_by_name(&name, scope)
            .await
            .map_err(internal)?
            .is_some()
        {
            return Err(MarketplaceError::DuplicateName { name });
        }

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            provider_id: scope,
            name,
            description: optional_text(input.description),
            image: optional_text(input.image),
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let created = self
            .repos
            .categories
            .create(&category)
            .await
            .map_err(|e| {
                if super::repository::is_unique_violation(&e) {
                    MarketplaceError::DuplicateName {
                        name: category.name.clone(),
                    }
                } else {
                    internal(e)
                }
            })?;

        tracing::info!(category_id = %created.id, provider_id = ?created.provider_id, "category created");
        Ok(created)
    }

    pub async fn update_category(
        &self,
        category_id: Uuid,
        actor: Actor,
        patch: CategoryPatch,
    ) -> Result<Category, MarketplaceError> {
        let mut category = self.load_managed_category(category_id, actor).await?;

        if let Some(name) = patch.name {
            let name = required_text("Category name", &name)?;
            if name != category.name {
                let duplicate = self
                    .repos
                    .categories
                    .find_by_name(&name, category.provider_id)
                    .await
                    .map_err(internal)?;
                if duplicate.is_some_and(|other| other.id != category.id) {
                    return Err(MarketplaceError::DuplicateName { name });
                }
                category.name = name;
            }
        }
        if let Some(description) = patch.description {
            category.description = optional_text(Some(description));
        }
        if let Some(image) = patch.image {
            category.image = optional_text(Some(image));
        }
        if let Some(is_active) = patch.is_active {
            category.is_active = is_active;
        }
        category.updated_at = Utc::now();

        self.repos
            .categories
            .update(&category)
            .await
            .map_err(internal)
    }

    pub async fn delete_category(
        &self,
        category_id: Uuid,
        actor: Actor,
    ) -> Result<(), MarketplaceError> {
        let category = self.load_managed_category(category_id, actor).await?;

        let meals = self
            .repos
            .meals
            .count_by_category(category.id)
            .await
            .map_err(internal)?;
        if meals > 0 {
            return Err(MarketplaceError::has_dependents("category", meals));
        }

        self.repos
            .categories
            .delete(category.id)
            .await
            .map_err(internal)?;

        tracing::info!(category_id = %category.id, "category deleted");
        Ok(())
    }

    async fn load_managed_category(
        &self,
        category_id: Uuid,
        actor: Actor,
    ) -> Result<Category, MarketplaceError> {
        let category = self
            .repos
            .categories
            .find_by_id(category_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| MarketplaceError::not_found("category", category_id))?;

        if !actor.may_manage(category.provider_id) {
            return Err(MarketplaceError::forbidden(
                "Category does not belong to this provider",
            ));
        }
        Ok(category)
    }

    // ===== Cuisines =====

    pub async fn list_cuisines(
        &self,
        search: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<CuisineWithCount>, MarketplaceError> {
        let (cuisines, total) = self
            .repos
            .cuisines
            .list(search, page)
            .await
            .map_err(internal)?;

        let ids: Vec<Uuid> = cuisines.iter().map(|c| c.id).collect();
        let counts = self
            .repos
            .meals
            .count_by_cuisines(&ids)
            .await
            .map_err(internal)?;

        let data = cuisines
            .into_iter()
            .map(|cuisine| CuisineWithCount {
                meal_count: counts.get(&cuisine.id).copied().unwrap_or(0),
                cuisine,
            })
            .collect();

        Ok(Page::new(data, total, page))
    }

    pub async fn upsert_cuisine(&self, name: &str) -> Result<Cuisine, MarketplaceError> {
        let name = required_text("Cuisine name", name)?;
        self.repos
            .cuisines
            .upsert_by_name(&name)
            .await
            .map_err(internal)
    }

    // ===== Meals =====

    pub async fn create_meal(
        &self,
        provider_id: Uuid,
        input: NewMeal,
    ) -> Result<Meal, MarketplaceError> {
        self.require_active_provider(provider_id).await?;

        let name = required_text("Meal name", &input.name)?;
        let price = parse_price(&input.price)?;

        let category_id = match input.category_id {
            Some(id) => Some(self.resolve_category(id, provider_id).await?.id),
            None => None,
        };

        let cuisine_id = match (input.cuisine_id, optional_text(input.cuisine)) {
            (Some(id), _) => Some(self.resolve_cuisine(id).await?.id),
            (None, Some(cuisine_name)) => Some(self.upsert_cuisine(&cuisine_name).await?.id),
            (None, None) => None,
        };

        let now = Utc::now();
        let meal = Meal {
            id: Uuid::new_v4(),
            provider_id,
            category_id,
            cuisine_id,
            name,
            description: optional_text(input.description),
            price,
            image: optional_text(input.image),
            ingredients: optional_text(input.ingredients),
            allergens: optional_text(input.allergens),
            prep_time: input.prep_time,
            is_available: input.is_available.unwrap_or(true),
            is_featured: input.is_featured.unwrap_or(false),
            is_vegan: input.is_vegan.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };

        let created = self.repos.meals.create(&meal).await.map_err(internal)?;
        tracing::info!(meal_id = %created.id, provider_id = %provider_id, "meal created");
        Ok(created)
    }

    /// Patch a meal; the owning provider never changes
    pub async fn update_meal(
        &self,
        meal_id: Uuid,
        actor: Actor,
        patch: MealPatch,
    ) -> Result<Meal, MarketplaceError> {
        let mut meal = self.load_managed_meal(meal_id, actor).await?;

        if let Some(name) = patch.name {
            meal.name = required_text("Meal name", &name)?;
        }
        if let Some(price) = patch.price {
            meal.price = parse_price(&price)?;
        }
        if let Some(category_id) = patch.category_id {
            if meal.category_id != Some(category_id) {
                meal.category_id = Some(self.resolve_category(category_id, meal.provider_id).await?.id);
            }
        }
        if let Some(cuisine_id) = patch.cuisine_id {
            meal.cuisine_id = Some(self.resolve_cuisine(cuisine_id).await?.id);
        }
        if let Some(description) = patch.description {
            meal.description = optional_text(Some(description));
        }
        if let Some(image) = patch.image {
            meal.image = optional_text(Some(image));
        }
        if let Some(ingredients) = patch.ingredients {
            meal.ingredients = optional_text(Some(ingredients));
        }
        if let Some(allergens) = patch.allergens {
            meal.allergens = optional_text(Some(allergens));
        }
        if patch.prep_time.is_some() {
            meal.prep_time = patch.prep_time;
        }
        if let Some(is_available) = patch.is_available {
            meal.is_available = is_available;
        }
        if let Some(is_featured) = patch.is_featured {
            meal.is_featured = is_featured;
        }
        if let Some(is_vegan) = patch.is_vegan {
            meal.is_vegan = is_vegan;
        }
        meal.updated_at = Utc::now();

        let updated = self.repos.meals.update(&meal).await.map_err(internal)?;
        tracing::info!(meal_id = %updated.id, "meal updated");
        Ok(updated)
    }

    pub async fn delete_meal(&self, meal_id: Uuid, actor: Actor) -> Result<(), MarketplaceError> {
        let meal = self.load_managed_meal(meal_id, actor).await?;

        let referencing = self
            .repos
            .orders
            .count_items_for_meal(meal.id)
            .await
            .map_err(internal)?;
        if referencing > 0 {
            return Err(MarketplaceError::has_dependents("meal", referencing));
        }

        self.repos.meals.delete(meal.id).await.map_err(internal)?;
        tracing::info!(meal_id = %meal.id, "meal deleted");
        Ok(())
    }

    /// Public detail view; unavailable meals are not found
    pub async fn get_meal(&self, meal_id: Uuid) -> Result<MealDetails, MarketplaceError> {
        let meal = self
            .repos
            .meals
            .find_by_id(meal_id)
            .await
            .map_err(internal)?
            .filter(|m| m.is_available)
            .ok_or_else(|| MarketplaceError::not_found("meal", meal_id))?;

        let view = self
            .build_views(vec![meal])
            .await?
            .pop()
            .ok_or(MarketplaceError::Internal)?;

        let recent_page = PageRequest::new(
            Some(1),
            Some(self.config.recent_reviews_limit),
            self.config.recent_reviews_limit,
            self.config.recent_reviews_limit,
        );
        let (recent, _) = self
            .repos
            .reviews
            .list_for_meal(meal_id, &recent_page)
            .await
            .map_err(internal)?;
        let recent_reviews = attach_customers(&self.repos, recent).await?;

        let ratings = self
            .repos
            .reviews
            .ratings_for_meal(meal_id)
            .await
            .map_err(internal)?;

        Ok(MealDetails {
            view,
            recent_reviews,
            rating_summary: RatingSummary::from_ratings(&ratings),
        })
    }

    pub async fn list_meals(
        &self,
        filter: &MealFilter,
        page: &PageRequest,
    ) -> Result<Page<MealView>, MarketplaceError> {
        let (meals, total) = self
            .repos
            .meals
            .list(filter, page)
            .await
            .map_err(internal)?;

        let views = self.build_views(meals).await?;
        Ok(Page::new(views, total, page))
    }

    async fn load_managed_meal(&self, meal_id: Uuid, actor: Actor) -> Result<Meal, MarketplaceError> {
        let meal = self
            .repos
            .meals
            .find_by_id(meal_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| MarketplaceError::not_found("meal", meal_id))?;

        if !actor.may_manage(Some(meal.provider_id)) {
            return Err(MarketplaceError::forbidden(
                "Meal does not belong to this provider",
            ));
        }
        Ok(meal)
    }

    async fn require_active_provider(
        &self,
        provider_id: Uuid,
    ) -> Result<ProviderProfile, MarketplaceError> {
        let provider = self
            .repos
            .providers
            .find_by_id(provider_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| MarketplaceError::not_found("provider", provider_id))?;

        if !provider.is_active {
            return Err(MarketplaceError::forbidden(
                "Provider is inactive and awaiting approval",
            ));
        }
        Ok(provider)
    }

    /// Active category that is global or owned by the provider
    async fn resolve_category(
        &self,
        category_id: Uuid,
        provider_id: Uuid,
    ) -> Result<Category, MarketplaceError> {
        self.repos
            .categories
            .find_by_id(category_id)
            .await
            .map_err(internal)?
            .filter(|c| c.is_active && c.provider_id.is_none_or(|owner| owner == provider_id))
            .ok_or_else(|| MarketplaceError::not_found("category", category_id))
    }

    async fn resolve_cuisine(&self, cuisine_id: Uuid) -> Result<Cuisine, MarketplaceError> {
        self.repos
            .cuisines
            .find_by_id(cuisine_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| MarketplaceError::not_found("cuisine", cuisine_id))
    }

    /// Attach category, cuisine, provider and rating aggregates to each meal
    async fn build_views(&self, meals: Vec<Meal>) -> Result<Vec<MealView>, MarketplaceError> {
        if meals.is_empty() {
            return Ok(Vec::new());
        }

        let meal_ids: Vec<Uuid> = meals.iter().map(|m| m.id).collect();
        let category_ids = unique(meals.iter().filter_map(|m| m.category_id));
        let cuisine_ids = unique(meals.iter().filter_map(|m| m.cuisine_id));
        let provider_ids = unique(meals.iter().map(|m| m.provider_id));

        let categories: HashMap<Uuid, Category> = self
            .repos
            .categories
            .find_many(&category_ids)
            .await
            .map_err(internal)?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let cuisines: HashMap<Uuid, Cuisine> = self
            .repos
            .cuisines
            .find_many(&cuisine_ids)
            .await
            .map_err(internal)?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let providers: HashMap<Uuid, ProviderSummary> = self
            .repos
            .providers
            .find_many(&provider_ids)
            .await
            .map_err(internal)?
            .iter()
            .map(|p| (p.id, ProviderSummary::from(p)))
            .collect();
        let stats = self
            .repos
            .reviews
            .rating_stats(&meal_ids)
            .await
            .map_err(internal)?;

        Ok(meals
            .into_iter()
            .map(|meal| {
                let rating = stats.get(&meal.id).copied().unwrap_or_default();
                MealView {
                    category: meal.category_id.and_then(|id| categories.get(&id).cloned()),
                    cuisine: meal.cuisine_id.and_then(|id| cuisines.get(&id).cloned()),
                    provider: providers.get(&meal.provider_id).cloned(),
                    avg_rating: rating.average(),
                    review_count: rating.count,
                    meal,
                }
            })
            .collect())
    }
}

pub(crate) fn unique(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
