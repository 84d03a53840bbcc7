use axum::{Json, extract::State};
use std::sync::Arc;
use waitlist_core::AppError;
use waitlist_storage::models::{CountScope, WaitlistStats};

use crate::{error::ApiError, state::AppState};

/// GET /api/stats - total, confirmed and pending entry counts.
///
/// All three counts must succeed; partial stats are never returned.
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<WaitlistStats>, ApiError> {
    let (total, confirmed, pending) = tokio::try_join!(
        count(&state, CountScope::All),
        count(&state, CountScope::Confirmed),
        count(&state, CountScope::Pending),
    )?;

    Ok(Json(WaitlistStats {
        total,
        confirmed,
        pending,
    }))
}

async fn count(state: &AppState, scope: CountScope) -> Result<i64, AppError> {
    state.store.count_entries(scope).await.map_err(|e| {
        tracing::error!(?scope, error = %e, "Failed to count waitlist entries");
        AppError::Dependency("Failed to fetch stats".into())
    })
}
