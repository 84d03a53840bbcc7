use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use waitlist_core::{AppError, best_effort, validate};
use waitlist_mailer::{ConfirmationEmail, EmailMessage, bare_address};
use waitlist_storage::{
    StorageError,
    models::{EmailLogStatus, NewEmailLog, NewEntry, UniqueField, WaitlistEntry},
};

use super::request_origin;
use crate::{error::ApiError, state::AppState};

/// Source recorded on newsletter rows created from the waitlist.
pub const NEWSLETTER_SOURCE: &str = "waitlist";

const EMAIL_TYPE_CONFIRMATION: &str = "confirmation";

const REGISTER_FAILED: &str = "Failed to register. Please try again.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    email: Option<String>,
    wallet_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    success: bool,
    message: &'static str,
    entry: EntrySummary,
}

#[derive(Debug, Serialize)]
struct EntrySummary {
    id: Uuid,
    position: i64,
}

/// POST /api/waitlist - register an email and wallet.
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|_| AppError::Validation("Invalid request body".into()))?;

    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(email), Some(wallet)) = (present(request.email), present(request.wallet_address))
    else {
        return Err(AppError::Validation("Email and wallet address are required".into()).into());
    };

    if !validate::is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email format".into()).into());
    }
    if !validate::is_valid_wallet(&wallet) {
        return Err(AppError::Validation("Invalid wallet address format".into()).into());
    }

    let email = validate::normalize_email(&email);
    let wallet = validate::normalize_wallet(&wallet);

    // Fast path only; the insert's unique constraints are authoritative.
    if lookup(state.store.find_entry_by_email(&email).await)?.is_some() {
        return Err(duplicate(UniqueField::Email).into());
    }
    if lookup(state.store.find_entry_by_wallet(&wallet).await)?.is_some() {
        return Err(duplicate(UniqueField::Wallet).into());
    }

    let new_entry = NewEntry {
        email,
        wallet_address: wallet,
        confirmation_token: Uuid::new_v4().to_string(),
    };
    let entry = match state.store.insert_entry(&new_entry).await {
        Ok(entry) => entry,
        Err(StorageError::Duplicate(field)) => {
            tracing::info!(?field, "Duplicate registration rejected at insert");
            return Err(duplicate(field).into());
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to insert waitlist entry");
            return Err(AppError::Dependency(REGISTER_FAILED.into()).into());
        }
    };

    if entry.confirmation_token.trim().is_empty() {
        tracing::error!(entry_id = %entry.id, "Confirmation token missing from entry");
        return Err(AppError::Dependency(
            "Failed to generate confirmation token. Please try again.".into(),
        )
        .into());
    }

    tracing::info!(entry_id = %entry.id, position = entry.position, "Waitlist entry created");

    best_effort(
        "newsletter_upsert",
        state.store.upsert_newsletter(&entry.email, NEWSLETTER_SOURCE),
    )
    .await;

    let origin = request_origin(&headers, state.settings.trust_forwarded_headers);
    send_confirmation(&state, &entry, origin.as_deref()).await;

    Ok(Json(RegisterResponse {
        success: true,
        message: "Spot secured! Check your email for confirmation.",
        entry: EntrySummary {
            id: entry.id,
            position: entry.position,
        },
    }))
}

fn lookup(
    result: Result<Option<WaitlistEntry>, StorageError>,
) -> Result<Option<WaitlistEntry>, AppError> {
    result.map_err(|e| {
        tracing::error!(error = %e, "Duplicate check failed");
        AppError::Dependency(REGISTER_FAILED.into())
    })
}

fn duplicate(field: UniqueField) -> AppError {
    let message = match field {
        UniqueField::Email => "This email is already registered",
        UniqueField::Wallet => "This wallet is already registered",
    };
    AppError::Conflict(message.into())
}

/// Send the confirmation email and record the attempt. Never fails the caller.
async fn send_confirmation(state: &AppState, entry: &WaitlistEntry, origin: Option<&str>) {
    if !state.notifier.is_enabled() {
        tracing::warn!(entry_id = %entry.id, "Email provider not configured, confirmation not sent");
        return;
    }

    let settings = &state.settings;
    let base_url = settings.base_url(origin);
    let entry_id = entry.id.to_string();
    let confirmation_url = format!(
        "{base_url}/api/confirm?token={}&id={entry_id}",
        entry.confirmation_token
    );
    let template = ConfirmationEmail {
        email: &entry.email,
        wallet_address: &entry.wallet_address,
        entry_id: &entry_id,
        base_url: &base_url,
        confirmation_url: &confirmation_url,
    };

    let recipient = settings.recipient_for(&entry.email);
    if recipient != entry.email {
        tracing::info!(
            entry_id = %entry.id,
            registered = %entry.email,
            delivered_to = %recipient,
            "Non-production deployment, redirecting confirmation to test address"
        );
    }

    let message = EmailMessage::new(
        recipient,
        settings.from_email.as_str(),
        template.subject(),
        template.html(),
        template.text(),
    )
    .with_reply_to(bare_address(&settings.from_email))
    .high_priority()
    .with_tag("category", "waitlist-confirmation")
    .with_tag("user_id", entry_id.as_str());

    let (status, error_message) = match state.notifier.send(&message).await {
        Ok(()) => {
            tracing::info!(entry_id = %entry.id, "Confirmation email sent");
            best_effort(
                "mark_confirmation_sent",
                state.store.mark_confirmation_sent(entry.id),
            )
            .await;
            (EmailLogStatus::Sent, None)
        }
        Err(e) => {
            tracing::warn!(entry_id = %entry.id, error = %e, "Confirmation email failed");
            (EmailLogStatus::Failed, Some(e.to_string()))
        }
    };

    let log = NewEmailLog {
        waitlist_entry_id: entry.id,
        email_type: EMAIL_TYPE_CONFIRMATION.into(),
        status,
        error_message,
    };
    best_effort("email_log", state.store.insert_email_log(&log)).await;
}
