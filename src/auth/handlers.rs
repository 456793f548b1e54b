use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::auth::{clear_session_cookie, session, session_cookie};
use crate::error::{AppError, AppResult};
use crate::extractors::{AdminSession, ClientKey};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

/// POST /api/admin/login — verify the shared passphrase and set the session
/// cookie. Guarded by the login attempt limiter.
pub async fn login(
    State(state): State<AppState>,
    ClientKey(key): ClientKey,
    Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
    if state.login_limiter.is_limited(&key) {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let digest = state.admin_digest().ok_or(AppError::AdminNotConfigured)?;
    let supplied = session::compute_digest(req.password.as_deref().unwrap_or_default());

    if !bool::from(supplied.as_bytes().ct_eq(digest.as_bytes())) {
        state.login_limiter.record_attempt(&key, false);
        tracing::info!("Failed admin login from {key}");
        return Err(AppError::IncorrectPassword);
    }

    state.login_limiter.record_attempt(&key, true);
    let token = session::issue_token(&digest, state.config.admin.session_hours);
    let cookie = session_cookie(
        &state.config.admin.cookie_name,
        &token,
        state.config.admin.session_hours,
        state.config.admin.secure_cookies,
    );

    tracing::info!("Admin login from {key}");
    Ok((
        StatusCode::OK,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(json!({ "success": true })),
    )
        .into_response())
}

/// POST /api/admin/logout — always succeeds, clears the cookie.
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = clear_session_cookie(
        &state.config.admin.cookie_name,
        state.config.admin.secure_cookies,
    );
    (
        StatusCode::OK,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(json!({ "success": true })),
    )
        .into_response()
}

/// GET /api/admin/session — 200 with a valid session cookie, 401 otherwise.
/// Lets the dashboard probe whether it is still signed in.
pub async fn session_check(_session: AdminSession) -> Response {
    Json(json!({ "authenticated": true })).into_response()
}
