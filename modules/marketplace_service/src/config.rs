//! Configuration for the marketplace service module

use serde::{Deserialize, Serialize};

/// Marketplace service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Lead time added to the creation instant for `estimated_delivery_time` (minutes)
    #[serde(default = "default_estimated_delivery_minutes")]
    pub estimated_delivery_minutes: i64,

    /// Page size when a list request does not carry `limit`
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    /// Upper bound for `limit`
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,

    /// Number of reviews embedded in a meal detail view
    #[serde(default = "default_recent_reviews_limit")]
    pub recent_reviews_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            estimated_delivery_minutes: default_estimated_delivery_minutes(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            recent_reviews_limit: default_recent_reviews_limit(),
        }
    }
}

fn default_estimated_delivery_minutes() -> i64 {
    45
}

fn default_page_size() -> u64 {
    10
}

fn default_max_page_size() -> u64 {
    100
}

fn default_recent_reviews_limit() -> u64 {
    10
}
