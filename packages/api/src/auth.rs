// ABOUTME: Owner identification for API requests
// ABOUTME: Resolves the calling user from the X-User-Id header

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Current user owning the projects a request touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
}

impl CurrentUser {
    /// Fallback identity for single-user deployments
    fn default_user() -> Self {
        Self {
            id: "default-user".to_string(),
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        Ok(match id {
            Some(id) => Self { id: id.to_string() },
            None => Self::default_user(),
        })
    }
}
