use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::extractors::{AdminSession, ClientKey};
use crate::settings::spots::{
    apply_vote, normalize_settings, EatDrinkSettings, VoteDirection, EAT_DRINK_KEY,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/spots", get(list_spots))
        .route("/api/spots/vote", post(vote))
        .route("/api/admin/spots", put(save_spots))
}

/// GET /api/spots — public listing. Missing or undecodable blob degrades to
/// an empty guide rather than an error.
async fn list_spots(State(state): State<AppState>) -> AppResult<Response> {
    let settings: EatDrinkSettings = state.settings.get(EAT_DRINK_KEY)?.unwrap_or_default();
    Ok(Json(settings).into_response())
}

#[derive(Deserialize)]
struct VoteRequest {
    id: Option<String>,
    direction: Option<String>,
}

/// POST /api/spots/vote — bump one vote counter on one spot. Guarded by the
/// vote attempt limiter, keyed per client.
///
/// Read-modify-write over the whole blob: concurrent votes can race and the
/// last writer wins. Vote counts are informational, not authoritative.
async fn vote(
    State(state): State<AppState>,
    ClientKey(key): ClientKey,
    Json(req): Json<VoteRequest>,
) -> AppResult<Response> {
    if state.vote_limiter.is_limited(&key) {
        return Err(AppError::RateLimited(
            "Too many votes from your network. Please try again later.".to_string(),
        ));
    }
    state.vote_limiter.record_attempt(&key, false);

    let id = req
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing spot id".to_string()))?;
    let direction = match req.direction.as_deref() {
        Some("up") => VoteDirection::Up,
        Some("down") => VoteDirection::Down,
        _ => {
            return Err(AppError::BadRequest(
                "direction must be \"up\" or \"down\"".to_string(),
            ))
        }
    };

    let mut settings: EatDrinkSettings = state.settings.get(EAT_DRINK_KEY)?.unwrap_or_default();
    let (up_votes, down_votes) =
        apply_vote(&mut settings, id, direction).ok_or(AppError::NotFound)?;
    state.settings.put(EAT_DRINK_KEY, &settings)?;

    Ok(Json(json!({
        "success": true,
        "upVotes": up_votes,
        "downVotes": down_votes,
        "spots": settings.spots,
    }))
    .into_response())
}

/// PUT /api/admin/spots — replace the whole guide. Every spot is normalized
/// on the way in, so a malformed save can never corrupt a later read.
async fn save_spots(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(raw): Json<Value>,
) -> AppResult<Response> {
    let settings = normalize_settings(&raw);
    state.settings.put(EAT_DRINK_KEY, &settings)?;
    Ok(Json(settings).into_response())
}
