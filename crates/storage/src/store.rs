use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{StorageError, models::*, repos};

/// Persistence the request handlers are written against.
///
/// Implementations must enforce email and wallet uniqueness atomically at insert
/// and apply `confirm_entry` as a single conditional update.
#[async_trait]
pub trait WaitlistStore: Send + Sync + 'static {
    async fn find_entry(&self, id: Uuid) -> Result<Option<WaitlistEntry>, StorageError>;

    async fn find_entry_by_email(&self, email: &str)
    -> Result<Option<WaitlistEntry>, StorageError>;

    async fn find_entry_by_wallet(
        &self,
        wallet_address: &str,
    ) -> Result<Option<WaitlistEntry>, StorageError>;

    /// Create a pending entry. Fails with [`StorageError::Duplicate`] on collision.
    async fn insert_entry(&self, entry: &NewEntry) -> Result<WaitlistEntry, StorageError>;

    async fn mark_confirmation_sent(&self, id: Uuid) -> Result<(), StorageError>;

    /// Confirm a pending entry whose stored token equals `stored_token`.
    /// Returns `None` when no row matched.
    async fn confirm_entry(
        &self,
        id: Uuid,
        stored_token: &str,
    ) -> Result<Option<WaitlistEntry>, StorageError>;

    /// Insert or reactivate a subscription, clearing `unsubscribed_at`.
    async fn upsert_newsletter(&self, email: &str, source: &str) -> Result<(), StorageError>;

    async fn find_newsletter(
        &self,
        email: &str,
    ) -> Result<Option<NewsletterSubscription>, StorageError>;

    async fn insert_email_log(&self, log: &NewEmailLog) -> Result<(), StorageError>;

    async fn count_entries(&self, scope: CountScope) -> Result<i64, StorageError>;
}

/// [`WaitlistStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WaitlistStore for PgStore {
    async fn find_entry(&self, id: Uuid) -> Result<Option<WaitlistEntry>, StorageError> {
        Ok(repos::get_entry(&self.pool, id).await?)
    }

    async fn find_entry_by_email(
        &self,
        email: &str,
    ) -> Result<Option<WaitlistEntry>, StorageError> {
        Ok(repos::get_entry_by_email(&self.pool, email).await?)
    }

    async fn find_entry_by_wallet(
        &self,
        wallet_address: &str,
    ) -> Result<Option<WaitlistEntry>, StorageError> {
        Ok(repos::get_entry_by_wallet(&self.pool, wallet_address).await?)
    }

    async fn insert_entry(&self, entry: &NewEntry) -> Result<WaitlistEntry, StorageError> {
        Ok(repos::insert_entry(&self.pool, entry).await?)
    }

    async fn mark_confirmation_sent(&self, id: Uuid) -> Result<(), StorageError> {
        Ok(repos::mark_confirmation_sent(&self.pool, id).await?)
    }

    async fn confirm_entry(
        &self,
        id: Uuid,
        stored_token: &str,
    ) -> Result<Option<WaitlistEntry>, StorageError> {
        Ok(repos::confirm_entry(&self.pool, id, stored_token).await?)
    }

    async fn upsert_newsletter(&self, email: &str, source: &str) -> Result<(), StorageError> {
        Ok(repos::upsert_newsletter(&self.pool, email, source).await?)
    }

    async fn find_newsletter(
        &self,
        email: &str,
    ) -> Result<Option<NewsletterSubscription>, StorageError> {
        Ok(repos::get_newsletter(&self.pool, email).await?)
    }

    async fn insert_email_log(&self, log: &NewEmailLog) -> Result<(), StorageError> {
        Ok(repos::insert_email_log(&self.pool, log).await?)
    }

    async fn count_entries(&self, scope: CountScope) -> Result<i64, StorageError> {
        Ok(repos::count_entries(&self.pool, scope).await?)
    }
}
