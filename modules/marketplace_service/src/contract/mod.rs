//! Contract layer - public models and errors
//!
//! This layer contains transport-agnostic models shared by every other layer.
//! NO serde derives on models - these are pure domain types.

pub mod error;
pub mod list;
pub mod model;

pub use error::MarketplaceError;
pub use list::*;
pub use model::*;
