//! HTTP request handlers - thin layer that delegates to domain services

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod reviews;
pub mod users;

use crate::config::Config;
use crate::contract::{PageRequest, SortField, SortOrder};
use crate::domain::Services;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Shared handler state, injected as a router extension
#[derive(Clone)]
pub struct ApiContext {
    pub services: Services,
    pub config: Config,
}

impl ApiContext {
    pub fn new(services: Services, config: Config) -> Self {
        Self { services, config }
    }

    /// Normalise page parameters against the configured limits
    pub fn page(&self, query: &PageQuery) -> PageRequest {
        PageRequest::new(
            query.page,
            query.limit,
            self.config.default_page_size,
            self.config.max_page_size,
        )
        .sorted(
            SortField::parse(query.sort_by.as_deref()),
            SortOrder::parse(query.sort_order.as_deref()),
        )
    }
}

/// Pagination and sorting parameters accepted by every list endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Blank query values count as absent
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthDto {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthDto> {
    Json(HealthDto { status: "ok" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_dropped() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" pho ".into())), Some("pho".into()));
        assert_eq!(non_blank(None), None);
    }
}
