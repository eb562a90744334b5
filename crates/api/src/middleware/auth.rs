//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Caller authenticated with the configured API token.
///
/// Rejections are [`AppError::Unauthenticated`], which the exception
/// translator renders as an `unauthorized` envelope for JSON clients and as
/// a login redirect for browsers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The token the caller presented.
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthenticated("Missing Authorization header"))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthenticated("Invalid Authorization format. Expected: Bearer <token>")
        })?;

        match state.config.api_token.as_deref() {
            Some(expected) if expected == token => Ok(AuthUser {
                token: token.to_string(),
            }),
            _ => Err(AppError::unauthenticated("Invalid or expired token")),
        }
    }
}
