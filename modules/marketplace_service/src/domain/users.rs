//! Accounts, provider onboarding and admin moderation

use super::internal;
use super::repository::{is_unique_violation, Repositories};
use super::validation::{optional_text, required_text};
use crate::contract::*;
use chrono::Utc;
use uuid::Uuid;

pub struct UserService {
    repos: Repositories,
}

impl UserService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    // ===== Self-service =====

    pub async fn my_profile(&self, user_id: Uuid) -> Result<UserProfile, MarketplaceError> {
        let user = self.load_enabled(user_id).await?;
        let provider = self
            .repos
            .providers
            .find_by_user_id(user_id)
            .await
            .map_err(internal)?;
        Ok(UserProfile { user, provider })
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        patch: ProfilePatch,
    ) -> Result<User, MarketplaceError> {
        let mut user = self.load_enabled(user_id).await?;

        if let Some(name) = patch.name {
            user.name = required_text("Name", &name)?;
        }
        if let Some(phone) = patch.phone {
            user.phone = optional_text(Some(phone));
        }
        if let Some(address) = patch.address {
            user.address = optional_text(Some(address));
        }
        if let Some(image) = patch.image {
            user.image = optional_text(Some(image));
        }
        user.updated_at = Utc::now();

        self.repos.users.update(&user).await.map_err(internal)
    }

    /// Create an inactive provider profile and promote the user to PROVIDER
    pub async fn apply_for_provider(
        &self,
        user_id: Uuid,
        application: ProviderApplication,
    ) -> Result<ProviderProfile, MarketplaceError> {
        self.load_enabled(user_id).await?;

        if self
            .repos
            .providers
            .find_by_user_id(user_id)
            .await
            .map_err(internal)?
            .is_some()
        {
            return Err(already_applied());
        }

        let now = Utc::now();
        let profile = ProviderProfile {
            id: Uuid::new_v4(),
            user_id,
            business_name: required_text("Business name", &application.business_name)?,
            description: optional_text(application.description),
            logo: optional_text(application.logo),
            phone: required_text("Phone", &application.phone)?,
            address: required_text("Address", &application.address)?,
            website: None,
            cuisine: None,
            opening_hours: None,
            delivery_radius: None,
            is_active: false,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .repos
            .providers
            .create_with_role_promotion(&profile)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    already_applied()
                } else {
                    internal(e)
                }
            })?;

        tracing::info!(user_id = %user_id, provider_id = %created.id, "provider application submitted");
        Ok(created)
    }

    pub async fn update_provider_profile(
        &self,
        user_id: Uuid,
        patch: ProviderProfilePatch,
    ) -> Result<ProviderProfile, MarketplaceError> {
        let mut profile = self
            .repos
            .providers
            .find_by_user_id(user_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| MarketplaceError::not_found("provider profile", user_id))?;

        if let Some(name) = patch.business_name {
            profile.business_name = required_text("Business name", &name)?;
        }
        if let Some(phone) = patch.phone {
            profile.phone = required_text("Phone", &phone)?;
        }
        if let Some(address) = patch.address {
            profile.address = required_text("Address", &address)?;
        }
        if let Some(description) = patch.description {
            profile.description = optional_text(Some(description));
        }
        if let Some(logo) = patch.logo {
            profile.logo = optional_text(Some(logo));
        }
        if let Some(website) = patch.website {
            profile.website = optional_text(Some(website));
        }
        if let Some(cuisine) = patch.cuisine {
            profile.cuisine = optional_text(Some(cuisine));
        }
        if let Some(opening_hours) = patch.opening_hours {
            profile.opening_hours = optional_text(Some(opening_hours));
        }
        profile.updated_at = Utc::now();

        self.repos
            .providers
            .update(&profile)
            .await
            .map_err(internal)
    }

    /// Provider profile owned by the caller; callers without one may not act as a provider
    pub async fn provider_for_user(&self, user_id: Uuid) -> Result<ProviderProfile, MarketplaceError> {
        self.repos
            .providers
            .find_by_user_id(user_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| MarketplaceError::forbidden("No provider profile for this account"))
    }

    // ===== Providers =====

    pub async fn list_providers(
        &self,
        filter: &ProviderFilter,
        page: &PageRequest,
    ) -> Result<Page<ProviderWithCounts>, MarketplaceError> {
        let (profiles, total) = self
            .repos
            .providers
            .list(filter, page)
            .await
            .map_err(internal)?;
        let data = self.with_counts(profiles).await?;
        Ok(Page::new(data, total, page))
    }

    /// Public provider page; pending or deactivated providers are not found
    pub async fn get_provider(&self, provider_id: Uuid) -> Result<ProviderWithCounts, MarketplaceError> {
        let profile = self
            .repos
            .providers
            .find_by_id(provider_id)
            .await
            .map_err(internal)?
            .filter(|p| p.is_active)
            .ok_or_else(|| MarketplaceError::not_found("provider", provider_id))?;

        self.with_counts(vec![profile])
            .await?
            .pop()
            .ok_or(MarketplaceError::Internal)
    }

    pub async fn set_provider_active(
        &self,
        provider_id: Uuid,
        is_active: bool,
    ) -> Result<ProviderProfile, MarketplaceError> {
        let mut profile = self
            .repos
            .providers
            .find_by_id(provider_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| MarketplaceError::not_found("provider", provider_id))?;

        profile.is_active = is_active;
        profile.updated_at = Utc::now();
        let updated = self
            .repos
            .providers
            .update(&profile)
            .await
            .map_err(internal)?;

        tracing::info!(provider_id = %provider_id, is_active, "provider approval changed");
        Ok(updated)
    }

    async fn with_counts(
        &self,
        profiles: Vec<ProviderProfile>,
    ) -> Result<Vec<ProviderWithCounts>, MarketplaceError> {
        if profiles.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = profiles.iter().map(|p| p.id).collect();
        let owner_ids: Vec<Uuid> = profiles.iter().map(|p| p.user_id).collect();

        let meal_counts = self
            .repos
            .meals
            .count_by_providers(&ids)
            .await
            .map_err(internal)?;
        let order_counts = self
            .repos
            .orders
            .count_by_providers(&ids)
            .await
            .map_err(internal)?;
        let owners = self
            .repos
            .users
            .find_many(&owner_ids)
            .await
            .map_err(internal)?;

        Ok(profiles
            .into_iter()
            .map(|profile| ProviderWithCounts {
                owner: owners
                    .iter()
                    .find(|u| u.id == profile.user_id)
                    .map(UserSummary::from),
                meal_count: meal_counts.get(&profile.id).copied().unwrap_or(0),
                order_count: order_counts.get(&profile.id).copied().unwrap_or(0),
                profile,
            })
            .collect())
    }

    // ===== Admin user moderation =====

    pub async fn list_users(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> Result<Page<User>, MarketplaceError> {
        let (users, total) = self
            .repos
            .users
            .list(filter, page)
            .await
            .map_err(internal)?;
        Ok(Page::new(users, total, page))
    }

    pub async fn update_user(
        &self,
        user_id: Uuid,
        patch: UserAdminPatch,
    ) -> Result<User, MarketplaceError> {
        let mut user = self.load(user_id).await?;

        // Parse first so a bad value leaves the record untouched
        let role = patch.role.as_deref().map(str::parse::<Role>).transpose()?;
        let status = patch
            .status
            .as_deref()
            .map(str::parse::<UserStatus>)
            .transpose()?;

        if let Some(name) = patch.name {
            user.name = required_text("Name", &name)?;
        }
        if let Some(phone) = patch.phone {
            user.phone = optional_text(Some(phone));
        }
        if let Some(address) = patch.address {
            user.address = optional_text(Some(address));
        }
        if let Some(role) = role {
            user.role = role;
        }
        if let Some(status) = status {
            user.status = status;
        }
        if let Some(is_active) = patch.is_active {
            user.is_active = is_active;
        }
        user.updated_at = Utc::now();

        let updated = self.repos.users.update(&user).await.map_err(internal)?;
        tracing::info!(
            user_id = %user_id,
            role = %updated.role,
            status = %updated.status,
            is_active = updated.is_active,
            "user updated by admin"
        );
        Ok(updated)
    }

    /// Delete a user without order history; cart, reviews and sessions go with it
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), MarketplaceError> {
        self.load(user_id).await?;

        let orders = self
            .repos
            .orders
            .count_for_customer(user_id)
            .await
            .map_err(internal)?;
        if orders > 0 {
            return Err(MarketplaceError::has_dependents("user", orders));
        }

        if let Some(profile) = self
            .repos
            .providers
            .find_by_user_id(user_id)
            .await
            .map_err(internal)?
        {
            let meals = self
                .repos
                .meals
                .count_by_providers(&[profile.id])
                .await
                .map_err(internal)?
                .get(&profile.id)
                .copied()
                .unwrap_or(0);
            let provider_orders = self
                .repos
                .orders
                .count_by_providers(&[profile.id])
                .await
                .map_err(internal)?
                .get(&profile.id)
                .copied()
                .unwrap_or(0);
            let dependents = meals + provider_orders;
            if dependents > 0 {
                return Err(MarketplaceError::has_dependents("user", dependents));
            }
        }

        self.repos.users.delete(user_id).await.map_err(internal)?;
        tracing::info!(user_id = %user_id, "user deleted");
        Ok(())
    }

    async fn load(&self, user_id: Uuid) -> Result<User, MarketplaceError> {
        self.repos
            .users
            .find_by_id(user_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| MarketplaceError::not_found("user", user_id))
    }

    async fn load_enabled(&self, user_id: Uuid) -> Result<User, MarketplaceError> {
        Some(self.load(user_id).await?)
            .filter(User::is_enabled)
            .ok_or_else(|| MarketplaceError::not_found("user", user_id))
    }
}

fn already_applied() -> MarketplaceError {
    MarketplaceError::conflict("A provider profile already exists for this account")
}
