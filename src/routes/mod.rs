pub mod auth;
pub mod spots;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router. Public content routes get a
/// permissive CORS layer; admin routes are same-origin (cookie-based).
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(spots::router().layer(CorsLayer::permissive()))
        .merge(auth::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
