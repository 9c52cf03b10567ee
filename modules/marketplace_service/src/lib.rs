//! Marketplace Service Module
//!
//! Food marketplace backend: provider catalogs, customer carts, single-provider
//! orders with a forward-only status lifecycle, and reviews gated on delivery.

// Public exports
pub mod contract;
pub use contract::{MarketplaceError, Page, PageRequest};

pub mod module;
pub use module::MarketplaceModule;

pub mod config;
pub use config::Config;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
