//! HTTP error mapping to RFC-9457 Problem Details

use crate::contract::MarketplaceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// RFC-9457 Problem Details, extended with an `error` member carrying the message
#[derive(Debug, Serialize)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Same text as `detail`, for clients that read `error`
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            error: title.clone(),
            title,
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        self.error = detail.clone();
        self.detail = Some(detail);
        self
    }

    pub fn unauthorized() -> Self {
        Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized")
            .with_detail("You are not authorized. Please sign in.")
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Problem::new(StatusCode::FORBIDDEN, "Forbidden").with_detail(detail)
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Problem::new(StatusCode::BAD_REQUEST, "Validation Error").with_detail(detail)
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl From<MarketplaceError> for Problem {
    fn from(error: MarketplaceError) -> Self {
        map_domain_error(error)
    }
}

/// Map domain errors to HTTP Problem Details
pub fn map_domain_error(error: MarketplaceError) -> Problem {
    match error {
        MarketplaceError::Unauthorized => Problem::unauthorized(),

        MarketplaceError::Forbidden { reason } => Problem::forbidden(reason),

        MarketplaceError::NotFound { resource, id } => Problem::new(
            StatusCode::NOT_FOUND,
            format!("{} Not Found", capitalize(&resource)),
        )
        .with_detail(format!("{} with id '{}' was not found", resource, id)),

        MarketplaceError::InvalidArgument { message } => Problem::bad_request(message),

        MarketplaceError::DuplicateName { name } => Problem::new(StatusCode::CONFLICT, "Duplicate Name")
            .with_detail(format!("'{}' already exists", name)),

        MarketplaceError::Conflict { reason } => {
            Problem::new(StatusCode::CONFLICT, "Conflict").with_detail(reason)
        }

        MarketplaceError::HasDependents { resource, count } => Problem::new(
            StatusCode::CONFLICT,
            "Has Dependents",
        )
        .with_detail(format!(
            "Cannot delete {}: {} dependent record(s) reference it",
            resource, count
        )),

        MarketplaceError::InvalidTransition { from, to } => Problem::new(
            StatusCode::CONFLICT,
            "Invalid Status Transition",
        )
        .with_detail(format!("Cannot change order status from {} to {}", from, to)),

        MarketplaceError::Internal => Problem::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
        )
        .with_detail("An unexpected error occurred"),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (MarketplaceError::Unauthorized, 401),
            (MarketplaceError::forbidden("nope"), 403),
            (MarketplaceError::not_found("meal", "42"), 404),
            (MarketplaceError::invalid("bad"), 400),
            (MarketplaceError::DuplicateName { name: "Soups".into() }, 409),
            (MarketplaceError::conflict("again"), 409),
            (MarketplaceError::has_dependents("category", 2), 409),
            (
                MarketplaceError::InvalidTransition {
                    from: "DELIVERED".into(),
                    to: "PENDING".into(),
                },
                409,
            ),
            (MarketplaceError::Internal, 500),
        ];
        for (error, status) in cases {
            assert_eq!(map_domain_error(error).status, status);
        }
    }

    #[test]
    fn error_member_mirrors_detail() {
        let problem = map_domain_error(MarketplaceError::not_found("meal", "42"));
        assert_eq!(problem.title, "Meal Not Found");
        assert_eq!(problem.detail.as_deref(), Some(problem.error.as_str()));

        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["type"], "https://httpstatuses.io/404");
        assert_eq!(json["error"], "meal with id '42' was not found");
    }

    #[test]
    fn internal_details_are_not_echoed() {
        let problem = map_domain_error(MarketplaceError::Internal);
        assert_eq!(problem.error, "An unexpected error occurred");
    }
}
