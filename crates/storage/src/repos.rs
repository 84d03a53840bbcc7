use sqlx::PgPool;
use uuid::Uuid;

use crate::models::*;

// ─── Entry Queries ──────────────────────────────────────────────────────────

/// Insert a new pending entry and return the stored row.
///
/// The unique constraints on `email` and `wallet_address` are the authoritative
/// duplicate check; a violation surfaces as a database error with constraint name.
pub async fn insert_entry(pool: &PgPool, entry: &NewEntry) -> Result<WaitlistEntry, sqlx::Error> {
    sqlx::query_as::<_, WaitlistEntry>(
        r#"
        INSERT INTO waitlist_entries (email, wallet_address, confirmation_token, status, email_confirmed)
        VALUES ($1, $2, $3, $4, FALSE)
        RETURNING *
        "#,
    )
    .bind(&entry.email)
    .bind(&entry.wallet_address)
    .bind(&entry.confirmation_token)
    .bind(EntryStatus::Pending.as_str())
    .fetch_one(pool)
    .await
}

/// Get a single entry by id.
pub async fn get_entry(pool: &PgPool, id: Uuid) -> Result<Option<WaitlistEntry>, sqlx::Error> {
    sqlx::query_as::<_, WaitlistEntry>("SELECT * FROM waitlist_entries WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Get an entry by its normalised email.
pub async fn get_entry_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<WaitlistEntry>, sqlx::Error> {
    sqlx::query_as::<_, WaitlistEntry>("SELECT * FROM waitlist_entries WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Get an entry by its normalised wallet address.
pub async fn get_entry_by_wallet(
    pool: &PgPool,
    wallet_address: &str,
) -> Result<Option<WaitlistEntry>, sqlx::Error> {
    sqlx::query_as::<_, WaitlistEntry>("SELECT * FROM waitlist_entries WHERE wallet_address = $1")
        .bind(wallet_address)
        .fetch_optional(pool)
        .await
}

/// Stamp `confirmation_sent_at`. Only the first successful send is recorded.
pub async fn mark_confirmation_sent(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE waitlist_entries
        SET confirmation_sent_at = NOW()
        WHERE id = $1 AND confirmation_sent_at IS NULL
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Transition a pending entry to confirmed.
///
/// Guarded on both `id` and the stored token, so a concurrent confirmation that
/// already flipped the row makes this return `None`.
pub async fn confirm_entry(
    pool: &PgPool,
    id: Uuid,
    stored_token: &str,
) -> Result<Option<WaitlistEntry>, sqlx::Error> {
    sqlx::query_as::<_, WaitlistEntry>(
        r#"
        UPDATE waitlist_entries
        SET email_confirmed = TRUE, status = $3, confirmed_at = NOW()
        WHERE id = $1 AND confirmation_token = $2 AND status = $4
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(stored_token)
    .bind(EntryStatus::Confirmed.as_str())
    .bind(EntryStatus::Pending.as_str())
    .fetch_optional(pool)
    .await
}

// ─── Newsletter Queries ─────────────────────────────────────────────────────

/// Insert or reactivate a newsletter subscription.
pub async fn upsert_newsletter(pool: &PgPool, email: &str, source: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO newsletter (email, status, source)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE
        SET status = EXCLUDED.status, source = EXCLUDED.source, unsubscribed_at = NULL
        "#,
    )
    .bind(email)
    .bind(SubscriptionStatus::Active.as_str())
    .bind(source)
    .execute(pool)
    .await?;
    Ok(())
}

/// Get the subscription for an email, if any.
pub async fn get_newsletter(
    pool: &PgPool,
    email: &str,
) -> Result<Option<NewsletterSubscription>, sqlx::Error> {
    sqlx::query_as::<_, NewsletterSubscription>(
        "SELECT email, status, source, subscribed_at, unsubscribed_at FROM newsletter WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

// ─── Email Log ──────────────────────────────────────────────────────────────

/// Append an email send attempt.
pub async fn insert_email_log(pool: &PgPool, log: &NewEmailLog) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO email_logs (waitlist_entry_id, email_type, status, error_message)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(log.waitlist_entry_id)
    .bind(&log.email_type)
    .bind(log.status.as_str())
    .bind(&log.error_message)
    .execute(pool)
    .await?;
    Ok(())
}

// ─── Stats Queries ──────────────────────────────────────────────────────────

/// Count entries in the given scope.
pub async fn count_entries(pool: &PgPool, scope: CountScope) -> Result<i64, sqlx::Error> {
    let sql = match scope {
        CountScope::All => "SELECT COUNT(*) FROM waitlist_entries",
        CountScope::Confirmed => {
            "SELECT COUNT(*) FROM waitlist_entries WHERE email_confirmed = TRUE OR status = 'confirmed'"
        }
        CountScope::Pending => {
            "SELECT COUNT(*) FROM waitlist_entries WHERE email_confirmed = FALSE AND status = 'pending'"
        }
    };
    let row: (i64,) = sqlx::query_as(sql).fetch_one(pool).await?;
    Ok(row.0)
}
