use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;

use crate::auth::{self, session};
use crate::error::AppError;
use crate::state::AppState;

/// Forwarding headers consulted for the client identifier, in priority
/// order. First hop only, best-effort.
const FORWARDED_HEADERS: &[&str] = &["x-forwarded-for", "x-real-ip", "cf-connecting-ip"];

/// Rate-limiter key for the requesting client. Un-attributable clients all
/// collapse into the "unknown" bucket and share its fate.
pub struct ClientKey(pub String);

impl<S> FromRequestParts<S> for ClientKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientKey(client_key(&parts.headers)))
    }
}

pub fn client_key(headers: &HeaderMap) -> String {
    for name in FORWARDED_HEADERS {
        let first = headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(addr) = first {
            return addr.to_string();
        }
    }
    "unknown".to_string()
}

/// Extractor guarding admin routes. Rejects with 401 when the session cookie
/// is absent, the admin password is unconfigured, or the token does not
/// verify under the current digest.
pub struct AdminSession;

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = auth::get_cookie_value(parts, &state.config.admin.cookie_name)
            .ok_or(AppError::Unauthorized)?;
        let digest = state.admin_digest().ok_or(AppError::Unauthorized)?;

        if session::verify_token(token, &digest) {
            Ok(AdminSession)
        } else {
            Err(AppError::Unauthorized)
        }
    }
}
