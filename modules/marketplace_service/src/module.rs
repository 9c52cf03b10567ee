//! Module declaration and lifecycle

use crate::api::rest::handlers::ApiContext;
use crate::config::Config;
use crate::domain::{IdentityProvider, Repositories, Services};
use crate::infra::identity::SessionIdentityProvider;
use crate::infra::storage::build_repositories;
use anyhow::Result;
use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
struct Wiring {
    services: Services,
    identity: Arc<dyn IdentityProvider>,
}

/// Marketplace service module
pub struct MarketplaceModule {
    config: RwLock<Config>,
    wiring: RwLock<Option<Wiring>>,
}

impl Default for MarketplaceModule {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl MarketplaceModule {
    pub fn new(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
            wiring: RwLock::new(None),
        }
    }

    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    /// Build repositories, services and the session identity provider on top of `db`
    pub fn init(&self, db: Arc<DatabaseConnection>) -> Result<()> {
        let repos = build_repositories(db.clone());
        let identity: Arc<dyn IdentityProvider> = Arc::new(SessionIdentityProvider::new(db));
        self.init_with(repos, identity);
        tracing::info!("Marketplace service initialized");
        Ok(())
    }

    /// Wire the module against caller-supplied storage and identity
    pub fn init_with(&self, repos: Repositories, identity: Arc<dyn IdentityProvider>) {
        let services = Services::new(repos, self.config());
        *self.wiring.write() = Some(Wiring { services, identity });
    }

    pub async fn migrate(&self, db: &DatabaseConnection) -> Result<()> {
        use crate::infra::storage::migrations::Migrator;
        use sea_orm_migration::MigratorTrait;

        Migrator::up(db, None).await?;
        tracing::info!("Marketplace service migrations completed");
        Ok(())
    }

    pub fn services(&self) -> Result<Services> {
        Ok(self.wiring()?.services)
    }

    pub fn register_rest(&self, router: axum::Router) -> Result<axum::Router> {
        let wiring = self.wiring()?;
        let ctx = ApiContext::new(wiring.services, self.config());

        tracing::info!("Registering marketplace REST routes");
        Ok(crate::api::rest::routes::register_routes(
            router,
            ctx,
            wiring.identity,
        ))
    }

    fn wiring(&self) -> Result<Wiring> {
        self.wiring
            .read()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Marketplace service not initialized"))
    }
}
