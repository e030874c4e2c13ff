//! Route definitions for the Espresso Advisor

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/targets", post(handlers::resolve_shot_targets))
        .nest("/shots", shot_routes())
}

/// Shot evaluation and session history routes
fn shot_routes() -> Router<AppState> {
    Router::new()
        .route("/evaluate", post(handlers::evaluate_shot))
        .route("/history", get(handlers::list_history))
}
