use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::{self, User};

/// Resolves the acting user for resource endpoints. Callers identify
/// themselves with an `X-User-Id` header; a Bearer token from login is
/// accepted when the header is absent.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = match parts.headers.get("x-user-id") {
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|raw| raw.trim().parse::<Uuid>().ok())
                .ok_or_else(|| ApiError::unauthorized("Invalid X-User-Id header"))?,
            None => {
                let auth = parts
                    .headers
                    .get(AUTHORIZATION)
                    .and_then(|h| h.to_str().ok())
                    .ok_or_else(|| ApiError::unauthorized("Missing X-User-Id header"))?;
                let token = auth
                    .strip_prefix("Bearer ")
                    .or_else(|| auth.strip_prefix("bearer "))
                    .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header"))?;
                let keys = JwtKeys::from_ref(state);
                match keys.verify(token) {
                    Ok(claims) => claims.sub,
                    Err(_) => {
                        warn!("invalid or expired token");
                        return Err(ApiError::unauthorized("Invalid or expired token"));
                    }
                }
            }
        };

        let user = repo::find_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User not found"))?;
        Ok(CurrentUser(user))
    }
}

/// Client address for audit entries, taken from the proxy header.
pub struct ClientIp(pub String);

pub(crate) fn forwarded_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(forwarded_ip(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn takes_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(forwarded_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn missing_header_is_unknown() {
        assert_eq!(forwarded_ip(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn blank_header_is_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("  "));
        assert_eq!(forwarded_ip(&headers), "unknown");
    }
}
