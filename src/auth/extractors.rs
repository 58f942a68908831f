use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use tracing::warn;

use super::claims::verify_token;
use crate::error::ApiError;
use crate::state::AppState;

/// The resolved caller, threaded explicitly into every operation. There is no
/// ambient or test-only identity; a request without a valid token never
/// reaches a handler body.
#[derive(Debug, Clone)]
pub struct Identity {
    pub subject: String,
    pub email: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

pub struct AuthIdentity(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                ApiError::Authentication("Missing Authorization header".into())
            })?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Authentication("Invalid auth scheme".into()))?;

        let claims = verify_token(&state.config.auth, token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::Authentication("Invalid or expired token".into())
        })?;

        Ok(AuthIdentity(Identity {
            subject: claims.sub,
            email: claims.email,
            given_name: claims.given_name,
            family_name: claims.family_name,
        }))
    }
}
