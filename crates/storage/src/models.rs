use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ─── Waitlist Entry ─────────────────────────────────────────────────────────

/// Lifecycle state of a waitlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Confirmed,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Confirmed => "confirmed",
        }
    }
}

impl TryFrom<String> for EntryStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(EntryStatus::Pending),
            "confirmed" => Ok(EntryStatus::Confirmed),
            other => Err(format!("unknown entry status: {other}")),
        }
    }
}

/// One waitlist registration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub email: String,
    pub wallet_address: String,
    pub confirmation_token: String,
    #[sqlx(try_from = "String")]
    pub status: EntryStatus,
    /// Kept in lockstep with `status` for older readers.
    pub email_confirmed: bool,
    pub position: i64,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub confirmation_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl WaitlistEntry {
    /// Either field marking the entry confirmed is enough.
    pub fn is_confirmed(&self) -> bool {
        self.email_confirmed || self.status == EntryStatus::Confirmed
    }
}

/// Insert-ready entry. `id`, `position` and timestamps come from the store.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub email: String,
    pub wallet_address: String,
    pub confirmation_token: String,
}

/// Column that made an insert collide with an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Wallet,
}

// ─── Newsletter ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Unsubscribed,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Unsubscribed => "unsubscribed",
        }
    }
}

impl TryFrom<String> for SubscriptionStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(SubscriptionStatus::Active),
            "unsubscribed" => Ok(SubscriptionStatus::Unsubscribed),
            other => Err(format!("unknown subscription status: {other}")),
        }
    }
}

/// A newsletter subscription keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NewsletterSubscription {
    pub email: String,
    #[sqlx(try_from = "String")]
    pub status: SubscriptionStatus,
    pub source: String,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

// ─── Email Log ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailLogStatus {
    Sent,
    Failed,
}

impl EmailLogStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EmailLogStatus::Sent => "sent",
            EmailLogStatus::Failed => "failed",
        }
    }
}

/// Append-only record of one send attempt.
#[derive(Debug, Clone)]
pub struct NewEmailLog {
    pub waitlist_entry_id: Uuid,
    pub email_type: String,
    pub status: EmailLogStatus,
    pub error_message: Option<String>,
}

// ─── Stats ──────────────────────────────────────────────────────────────────

/// Which rows an aggregate count covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountScope {
    All,
    /// `email_confirmed OR status = 'confirmed'`.
    Confirmed,
    /// `NOT email_confirmed AND status = 'pending'`.
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistStats {
    pub total: i64,
    pub confirmed: i64,
    pub pending: i64,
}
