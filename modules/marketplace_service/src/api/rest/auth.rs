//! Session authentication and role gates

use super::error::Problem;
use crate::contract::{Actor, Principal, Role};
use crate::domain::{IdentityProvider, Services};
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap, StatusCode};
use std::sync::Arc;

/// Cookie set by the external auth provider; the token is the part before the first `.`
pub const SESSION_COOKIE: &str = "better-auth.session_token";

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl CurrentUser {
    /// Reject callers whose role is not listed
    pub fn require(&self, roles: &[Role]) -> Result<&Principal, Problem> {
        if roles.contains(&self.0.role) {
            Ok(&self.0)
        } else {
            Err(Problem::forbidden(
                "Forbidden! You don't have permission to access this resource",
            ))
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<Arc<dyn IdentityProvider>>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("identity provider extension is missing");
                Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                    .with_detail("An unexpected error occurred")
            })?;

        let token = session_token(&parts.headers).ok_or_else(Problem::unauthorized)?;

        match identity.authenticate(&token).await {
            Ok(Some(principal)) => Ok(CurrentUser(principal)),
            Ok(None) => Err(Problem::unauthorized()),
            Err(e) => {
                tracing::error!(error = %e, "session lookup failed");
                Err(Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                    .with_detail("An unexpected error occurred"))
            }
        }
    }
}

/// Bearer header first, then the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.split('.').next())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Resolve who is acting on owner-scoped resources
///
/// Providers act through their profile; callers without one are forbidden.
pub async fn resolve_actor(services: &Services, principal: &Principal) -> Result<Actor, Problem> {
    match principal.role {
        Role::Admin => Ok(Actor::Admin),
        Role::Provider => {
            let profile = services.users.provider_for_user(principal.user_id).await?;
            Ok(Actor::Provider(profile.id))
        }
        Role::Customer => Err(Problem::forbidden(
            "Forbidden! You don't have permission to access this resource",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("better-auth.session_token=cookie.sig"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn cookie_token_drops_signature() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; better-auth.session_token=tok42.c2lnbmF0dXJl"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok42"));
    }

    #[test]
    fn missing_or_empty_token() {
        assert_eq!(session_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(session_token(&headers), None);
    }
}
