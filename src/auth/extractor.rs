use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::api::{ApiError, AppState};

/// Authenticated user extractor
///
/// Reads the `Authorization: Bearer <jwt>` header and resolves it to the
/// owning user id. Handlers that take `AuthUser` reject unauthenticated
/// requests with 401 before any business logic runs.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        let claims = state
            .auth
            .verify_token(token)
            .map_err(|_| ApiError::Unauthorized("Invalid token".to_string()))?;

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}
