//! Bearer-token extractors.
//!
//! A request without an `Authorization` header is anonymous. A header that
//! is present but unusable is always rejected, even on routes where
//! anonymous access is fine.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use platform_api::{ApiError, ApiResult};
use platform_authz::Caller;
use uuid::Uuid;

use crate::http::AppState;

/// Caller on routes that also serve anonymous visitors.
pub struct MaybeCaller(pub Option<Caller>);

/// Caller on routes that need a signed-in account.
pub struct RequireCaller(pub Caller);

async fn bearer_caller(parts: &mut Parts, state: &AppState) -> ApiResult<Option<Caller>> {
    match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
        Ok(TypedHeader(Authorization(bearer))) => {
            state.blog.resolve_caller(bearer.token()).await.map(Some)
        }
        Err(rejection) if rejection.is_missing() => Ok(None),
        Err(_) => Err(ApiError::Unauthenticated),
    }
}

impl FromRequestParts<AppState> for MaybeCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        bearer_caller(parts, state).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        bearer_caller(parts, state)
            .await?
            .map(Self)
            .ok_or(ApiError::Unauthenticated)
    }
}

/// Ids that do not parse can never name a row.
pub fn parse_id(raw: &str, resource: &'static str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(resource))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_read_as_missing() {
        let err = parse_id("not-a-uuid", "post").unwrap_err();
        assert!(matches!(err, ApiError::NotFound("post")));
        assert!(parse_id(&Uuid::nil().to_string(), "post").is_ok());
    }
}
