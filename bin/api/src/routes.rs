use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::handlers::{confirm, stats, waitlist};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/waitlist", post(waitlist::register))
        .route("/api/confirm", get(confirm::confirm))
        .route("/api/stats", get(stats::stats))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
