use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use waitlist_core::{best_effort, validate};

use super::{request_origin, waitlist::NEWSLETTER_SOURCE};
use crate::state::AppState;

/// Page the confirmation link lands on.
const STATUS_PAGE: &str = "/confirmed";

#[derive(Debug, Deserialize)]
pub struct ConfirmParams {
    token: Option<String>,
    id: Option<String>,
}

/// Result of following a confirmation link, encoded into the redirect query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Confirmed,
    AlreadyConfirmed,
    MissingParams,
    InvalidToken,
    ServerError,
}

impl Outcome {
    fn query(self) -> &'static str {
        match self {
            Outcome::Confirmed => "success=true",
            Outcome::AlreadyConfirmed => "success=true&already_confirmed=true",
            Outcome::MissingParams => "error=missing_params",
            Outcome::InvalidToken => "error=invalid_token",
            Outcome::ServerError => "error=server_error",
        }
    }
}

/// GET /api/confirm?token=&id= - confirm an entry and redirect to the status page.
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    params: Result<Query<ConfirmParams>, QueryRejection>,
) -> Response {
    let outcome = match params {
        Ok(Query(params)) => run(&state, params).await,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable confirmation query");
            Outcome::MissingParams
        }
    };

    let origin = request_origin(&headers, state.settings.trust_forwarded_headers);
    let base_url = state.settings.base_url(origin.as_deref());
    let location = format!("{base_url}{STATUS_PAGE}?{}", outcome.query());
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

async fn run(state: &AppState, params: ConfirmParams) -> Outcome {
    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(token), Some(id)) = (present(params.token), present(params.id)) else {
        return Outcome::MissingParams;
    };

    let Ok(id) = Uuid::parse_str(id.trim()) else {
        tracing::warn!(id = %id, "Confirmation id is not a valid entry id");
        return Outcome::InvalidToken;
    };

    let entry = match state.store.find_entry(id).await {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            tracing::warn!(entry_id = %id, "Entry not found for confirmation");
            return Outcome::InvalidToken;
        }
        Err(e) => {
            tracing::error!(entry_id = %id, error = %e, "Failed to load entry for confirmation");
            return Outcome::ServerError;
        }
    };

    if entry.is_confirmed() {
        tracing::info!(entry_id = %id, "Email already confirmed");
        return Outcome::AlreadyConfirmed;
    }

    if !validate::tokens_match(&token, &entry.confirmation_token) {
        tracing::warn!(entry_id = %id, "Confirmation token mismatch");
        return Outcome::InvalidToken;
    }

    // Guard on the stored token so a concurrent confirmation makes this a no-op.
    let confirmed = match state
        .store
        .confirm_entry(id, &entry.confirmation_token)
        .await
    {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            tracing::warn!(entry_id = %id, "Confirmation update matched no rows");
            return Outcome::InvalidToken;
        }
        Err(e) => {
            tracing::error!(entry_id = %id, error = %e, "Failed to confirm entry");
            return Outcome::ServerError;
        }
    };

    tracing::info!(entry_id = %id, "Email confirmed");

    let email = validate::normalize_email(&confirmed.email);
    best_effort(
        "newsletter_upsert",
        state.store.upsert_newsletter(&email, NEWSLETTER_SOURCE),
    )
    .await;

    Outcome::Confirmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::*;
    use axum::http::StatusCode;
    use chrono::Utc;
    use waitlist_storage::{
        MemoryStore, WaitlistStore,
        memory::Fault,
        models::{EntryStatus, NewEntry, SubscriptionStatus, WaitlistEntry},
    };

    async fn pending_entry(store: &MemoryStore) -> WaitlistEntry {
        store
            .insert_entry(&NewEntry {
                email: "a@x.com".into(),
                wallet_address: WALLET.to_lowercase(),
                confirmation_token: Uuid::new_v4().to_string(),
            })
            .await
            .unwrap()
    }

    fn confirm_uri(token: &str, id: impl std::fmt::Display) -> String {
        format!("/api/confirm?token={token}&id={id}")
    }

    #[tokio::test]
    async fn confirms_with_matching_token() {
        let store = Arc::new(MemoryStore::new());
        let entry = pending_entry(&store).await;
        let app = app(store.clone(), Arc::new(RecordingNotifier::default()));

        let resp = get(&app, &confirm_uri(&entry.confirmation_token, entry.id)).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "https://waitlist.test/confirmed?success=true");

        let stored = store.find_entry(entry.id).await.unwrap().unwrap();
        assert_eq!(stored.status, EntryStatus::Confirmed);
        assert!(stored.email_confirmed);
        assert!(stored.confirmed_at.is_some());

        let sub = store.find_newsletter("a@x.com").await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn token_comparison_ignores_case() {
        let store = Arc::new(MemoryStore::new());
        let entry = pending_entry(&store).await;
        let app = app(store.clone(), Arc::new(RecordingNotifier::default()));

        let upper = entry.confirmation_token.to_uppercase();
        let resp = get(&app, &confirm_uri(&upper, entry.id)).await;
        assert_eq!(location(&resp), "https://waitlist.test/confirmed?success=true");
    }

    #[tokio::test]
    async fn reconfirming_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let entry = pending_entry(&store).await;
        let app = app(store.clone(), Arc::new(RecordingNotifier::default()));
        let uri = confirm_uri(&entry.confirmation_token, entry.id);

        get(&app, &uri).await;
        let confirmed_at = store.find_entry(entry.id).await.unwrap().unwrap().confirmed_at;

        let resp = get(&app, &uri).await;
        assert_eq!(
            location(&resp),
            "https://waitlist.test/confirmed?success=true&already_confirmed=true"
        );
        let again = store.find_entry(entry.id).await.unwrap().unwrap().confirmed_at;
        assert_eq!(confirmed_at, again);
    }

    #[tokio::test]
    async fn wrong_token_does_not_confirm() {
        let store = Arc::new(MemoryStore::new());
        let entry = pending_entry(&store).await;
        let app = app(store.clone(), Arc::new(RecordingNotifier::default()));

        let resp = get(&app, &confirm_uri(&Uuid::new_v4().to_string(), entry.id)).await;
        assert_eq!(
            location(&resp),
            "https://waitlist.test/confirmed?error=invalid_token"
        );
        let stored = store.find_entry(entry.id).await.unwrap().unwrap();
        assert_eq!(stored.status, EntryStatus::Pending);
        assert!(!stored.email_confirmed);
    }

    #[tokio::test]
    async fn missing_params() {
        let app = app(
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingNotifier::default()),
        );
        for uri in ["/api/confirm", "/api/confirm?token=abc", "/api/confirm?token=&id=x"] {
            let resp = get(&app, uri).await;
            assert_eq!(resp.status(), StatusCode::FOUND);
            assert_eq!(
                location(&resp),
                "https://waitlist.test/confirmed?error=missing_params"
            );
        }
    }

    #[tokio::test]
    async fn unknown_or_malformed_id_is_invalid_token() {
        let app = app(
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingNotifier::default()),
        );
        for uri in [confirm_uri("abc", Uuid::new_v4()), confirm_uri("abc", "42")] {
            let resp = get(&app, &uri).await;
            assert_eq!(
                location(&resp),
                "https://waitlist.test/confirmed?error=invalid_token"
            );
        }
    }

    #[tokio::test]
    async fn store_failure_is_server_error() {
        let store = Arc::new(MemoryStore::new());
        let entry = pending_entry(&store).await;
        store.fail(Fault::Confirm);
        let app = app(store.clone(), Arc::new(RecordingNotifier::default()));

        let resp = get(&app, &confirm_uri(&entry.confirmation_token, entry.id)).await;
        assert_eq!(
            location(&resp),
            "https://waitlist.test/confirmed?error=server_error"
        );

        store.heal(Fault::Confirm);
        store.fail(Fault::Lookup);
        let resp = get(&app, &confirm_uri(&entry.confirmation_token, entry.id)).await;
        assert_eq!(
            location(&resp),
            "https://waitlist.test/confirmed?error=server_error"
        );
    }

    #[tokio::test]
    async fn newsletter_failure_still_confirms() {
        let store = Arc::new(MemoryStore::new());
        let entry = pending_entry(&store).await;
        store.fail(Fault::Newsletter);
        let app = app(store.clone(), Arc::new(RecordingNotifier::default()));

        let resp = get(&app, &confirm_uri(&entry.confirmation_token, entry.id)).await;
        assert_eq!(location(&resp), "https://waitlist.test/confirmed?success=true");
    }

    #[tokio::test]
    async fn legacy_flag_alone_counts_as_confirmed() {
        let store = Arc::new(MemoryStore::new());
        let entry = WaitlistEntry {
            email_confirmed: true,
            confirmed_at: Some(Utc::now()),
            ..pending_entry(&store).await
        };
        let drifted = MemoryStore::new();
        drifted.seed(entry.clone());
        let app = app(Arc::new(drifted), Arc::new(RecordingNotifier::default()));

        let resp = get(&app, &confirm_uri(&entry.confirmation_token, entry.id)).await;
        assert_eq!(
            location(&resp),
            "https://waitlist.test/confirmed?success=true&already_confirmed=true"
        );
    }

    #[tokio::test]
    async fn redirect_falls_back_to_request_origin() {
        let app = app_with(
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingNotifier::default()),
            waitlist_core::Settings::default(),
        );
        let request = axum::http::Request::get("/api/confirm")
            .header("host", "localhost:4000")
            .body(axum::body::Body::empty())
            .unwrap();
        let resp = send(&app, request).await;
        assert_eq!(
            location(&resp),
            "http://localhost:4000/confirmed?error=missing_params"
        );
    }
}
