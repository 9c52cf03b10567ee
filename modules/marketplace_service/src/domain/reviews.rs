//! Reviews, gated on delivered orders

use super::internal;
use super::repository::{is_unique_violation, Repositories};
use super::validation::{optional_text, validate_rating};
use crate::contract::*;
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

pub struct ReviewService {
    repos: Repositories,
}

impl ReviewService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Create a review; the customer must have received the meal in a delivered order
    pub async fn create_review(
        &self,
        customer_id: Uuid,
        meal_id: Uuid,
        input: NewReview,
    ) -> Result<ReviewView, MarketplaceError> {
        validate_rating(input.rating)?;
        self.require_meal(meal_id).await?;

        let eligible = self
            .repos
            .orders
            .has_delivered_meal(customer_id, meal_id)
            .await
            .map_err(internal)?;
        if !eligible {
            return Err(MarketplaceError::forbidden(
                "You can only review meals from your delivered orders",
            ));
        }

        if self
            .repos
            .reviews
            .find_by_customer_and_meal(customer_id, meal_id)
            .await
            .map_err(internal)?
            .is_some()
        {
            return Err(already_reviewed());
        }

        let now = Utc::now();
        let review = Review {
            id: Uuid::new_v4(),
            customer_id,
            meal_id,
            rating: input.rating,
            comment: optional_text(input.comment),
            created_at: now,
            updated_at: now,
        };

        let created = self.repos.reviews.create(&review).await.map_err(|e| {
            if is_unique_violation(&e) {
                already_reviewed()
            } else {
                internal(e)
            }
        })?;

        tracing::info!(review_id = %created.id, meal_id = %meal_id, rating = created.rating, "review created");
        self.single_view(created).await
    }

    pub async fn update_review(
        &self,
        customer_id: Uuid,
        review_id: Uuid,
        patch: ReviewPatch,
    ) -> Result<ReviewView, MarketplaceError> {
        let mut review = self.load_own(customer_id, review_id).await?;

        if let Some(rating) = patch.rating {
            validate_rating(rating)?;
            review.rating = rating;
        }
        if let Some(comment) = patch.comment {
            review.comment = optional_text(Some(comment));
        }
        review.updated_at = Utc::now();

        let updated = self.repos.reviews.update(&review).await.map_err(internal)?;
        self.single_view(updated).await
    }

    pub async fn delete_review(&self, customer_id: Uuid, review_id: Uuid) -> Result<(), MarketplaceError> {
        let review = self.load_own(customer_id, review_id).await?;
        self.repos
            .reviews
            .delete(review.id)
            .await
            .map_err(internal)?;

        tracing::info!(review_id = %review.id, "review deleted");
        Ok(())
    }

    /// One page of reviews plus a summary computed over every rating of the meal
    pub async fn meal_reviews(
        &self,
        meal_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Page<ReviewView>, RatingSummary), MarketplaceError> {
        self.require_meal(meal_id).await?;

        let (reviews, total) = self
            .repos
            .reviews
            .list_for_meal(meal_id, page)
            .await
            .map_err(internal)?;
        let views = attach_customers(&self.repos, reviews).await?;

        let ratings = self
            .repos
            .reviews
            .ratings_for_meal(meal_id)
            .await
            .map_err(internal)?;

        Ok((Page::new(views, total, page), RatingSummary::from_ratings(&ratings)))
    }

    async fn require_meal(&self, meal_id: Uuid) -> Result<Meal, MarketplaceError> {
        self.repos
            .meals
            .find_by_id(meal_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| MarketplaceError::not_found("meal", meal_id))
    }

    /// Reviews of other customers are not found
    async fn load_own(&self, customer_id: Uuid, review_id: Uuid) -> Result<Review, MarketplaceError> {
        self.repos
            .reviews
            .find_by_id(review_id)
            .await
            .map_err(internal)?
            .filter(|r| r.customer_id == customer_id)
            .ok_or_else(|| MarketplaceError::not_found("review", review_id))
    }

    async fn single_view(&self, review: Review) -> Result<ReviewView, MarketplaceError> {
        attach_customers(&self.repos, vec![review])
            .await?
            .pop()
            .ok_or(MarketplaceError::Internal)
    }
}

fn already_reviewed() -> MarketplaceError {
    MarketplaceError::conflict("You have already reviewed this meal")
}

/// Pair each review with its author's display fields
pub(crate) async fn attach_customers(
    repos: &Repositories,
    reviews: Vec<Review>,
) -> Result<Vec<ReviewView>, MarketplaceError> {
    let ids = super::catalog::unique(reviews.iter().map(|r| r.customer_id));
    let customers: HashMap<Uuid, UserSummary> = if ids.is_empty() {
        HashMap::new()
    } else {
        repos
            .users
            .find_many(&ids)
            .await
            .map_err(internal)?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect()
    };

    Ok(reviews
        .into_iter()
        .map(|review| ReviewView {
            customer: customers.get(&review.customer_id).cloned(),
            review,
        })
        .collect())
}
