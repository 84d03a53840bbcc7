//! In-process [`WaitlistStore`] with the same constraint semantics as Postgres.
//!
//! Used to exercise handlers without a database. Individual operations can be
//! made to fail with [`MemoryStore::fail`].

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::{StorageError, WaitlistStore, models::*};

/// Operation to break on a [`MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    /// Lookups by id fail.
    Lookup,
    /// Lookups by email or wallet fail.
    DuplicateLookup,
    /// Lookups by email or wallet miss, as if another request had not committed yet.
    StaleReads,
    Insert,
    /// Inserts succeed but store an empty confirmation token.
    EmptyToken,
    MarkSent,
    Confirm,
    Newsletter,
    EmailLog,
    Count(CountScope),
}

#[derive(Debug, Default)]
struct State {
    entries: Vec<WaitlistEntry>,
    newsletter: HashMap<String, NewsletterSubscription>,
    email_logs: Vec<NewEmailLog>,
    next_position: i64,
    faults: HashSet<Fault>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, fault: Fault) {
        self.lock().faults.insert(fault);
    }

    pub fn heal(&self, fault: Fault) {
        self.lock().faults.remove(&fault);
    }

    /// Store a row as-is, bypassing uniqueness checks.
    pub fn seed(&self, entry: WaitlistEntry) {
        let mut state = self.lock();
        state.next_position = state.next_position.max(entry.position);
        state.entries.push(entry);
    }

    pub fn entries(&self) -> Vec<WaitlistEntry> {
        self.lock().entries.clone()
    }

    pub fn email_logs(&self) -> Vec<NewEmailLog> {
        self.lock().email_logs.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(state: &State, fault: Fault) -> Result<(), StorageError> {
        if state.faults.contains(&fault) {
            return Err(StorageError::Unavailable(format!("{fault:?} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl WaitlistStore for MemoryStore {
    async fn find_entry(&self, id: Uuid) -> Result<Option<WaitlistEntry>, StorageError> {
        let state = self.lock();
        Self::check(&state, Fault::Lookup)?;
        Ok(state.entries.iter().find(|e| e.id == id).cloned())
    }

    async fn find_entry_by_email(
        &self,
        email: &str,
    ) -> Result<Option<WaitlistEntry>, StorageError> {
        let state = self.lock();
        Self::check(&state, Fault::DuplicateLookup)?;
        if state.faults.contains(&Fault::StaleReads) {
            return Ok(None);
        }
        Ok(state.entries.iter().find(|e| e.email == email).cloned())
    }

    async fn find_entry_by_wallet(
        &self,
        wallet_address: &str,
    ) -> Result<Option<WaitlistEntry>, StorageError> {
        let state = self.lock();
        Self::check(&state, Fault::DuplicateLookup)?;
        if state.faults.contains(&Fault::StaleReads) {
            return Ok(None);
        }
        Ok(state
            .entries
            .iter()
            .find(|e| e.wallet_address == wallet_address)
            .cloned())
    }

    async fn insert_entry(&self, entry: &NewEntry) -> Result<WaitlistEntry, StorageError> {
        let mut state = self.lock();
        Self::check(&state, Fault::Insert)?;

        if state.entries.iter().any(|e| e.email == entry.email) {
            return Err(StorageError::Duplicate(UniqueField::Email));
        }
        if state
            .entries
            .iter()
            .any(|e| e.wallet_address == entry.wallet_address)
        {
            return Err(StorageError::Duplicate(UniqueField::Wallet));
        }

        let confirmation_token = if state.faults.contains(&Fault::EmptyToken) {
            String::new()
        } else {
            entry.confirmation_token.clone()
        };

        state.next_position += 1;
        let row = WaitlistEntry {
            id: Uuid::new_v4(),
            email: entry.email.clone(),
            wallet_address: entry.wallet_address.clone(),
            confirmation_token,
            status: EntryStatus::Pending,
            email_confirmed: false,
            position: state.next_position,
            confirmed_at: None,
            confirmation_sent_at: None,
            created_at: Utc::now(),
        };
        state.entries.push(row.clone());
        Ok(row)
    }

    async fn mark_confirmation_sent(&self, id: Uuid) -> Result<(), StorageError> {
        let mut state = self.lock();
        Self::check(&state, Fault::MarkSent)?;
        if let Some(entry) = state.entries.iter_mut().find(|e| e.id == id) {
            entry.confirmation_sent_at.get_or_insert_with(Utc::now);
        }
        Ok(())
    }

    async fn confirm_entry(
        &self,
        id: Uuid,
        stored_token: &str,
    ) -> Result<Option<WaitlistEntry>, StorageError> {
        let mut state = self.lock();
        Self::check(&state, Fault::Confirm)?;
        let Some(entry) = state.entries.iter_mut().find(|e| {
            e.id == id && e.confirmation_token == stored_token && e.status == EntryStatus::Pending
        }) else {
            return Ok(None);
        };
        entry.status = EntryStatus::Confirmed;
        entry.email_confirmed = true;
        entry.confirmed_at = Some(Utc::now());
        Ok(Some(entry.clone()))
    }

    async fn upsert_newsletter(&self, email: &str, source: &str) -> Result<(), StorageError> {
        let mut state = self.lock();
        Self::check(&state, Fault::Newsletter)?;
        state
            .newsletter
            .entry(email.to_string())
            .and_modify(|s| {
                s.status = SubscriptionStatus::Active;
                s.source = source.to_string();
                s.unsubscribed_at = None;
            })
            .or_insert_with(|| NewsletterSubscription {
                email: email.to_string(),
                status: SubscriptionStatus::Active,
                source: source.to_string(),
                subscribed_at: Utc::now(),
                unsubscribed_at: None,
            });
        Ok(())
    }

    async fn find_newsletter(
        &self,
        email: &str,
    ) -> Result<Option<NewsletterSubscription>, StorageError> {
        Ok(self.lock().newsletter.get(email).cloned())
    }

    async fn insert_email_log(&self, log: &NewEmailLog) -> Result<(), StorageError> {
        let mut state = self.lock();
        Self::check(&state, Fault::EmailLog)?;
        state.email_logs.push(log.clone());
        Ok(())
    }

    async fn count_entries(&self, scope: CountScope) -> Result<i64, StorageError> {
        let state = self.lock();
        Self::check(&state, Fault::Count(scope))?;
        let count = state
            .entries
            .iter()
            .filter(|e| match scope {
                CountScope::All => true,
                CountScope::Confirmed => e.email_confirmed || e.status == EntryStatus::Confirmed,
                CountScope::Pending => !e.email_confirmed && e.status == EntryStatus::Pending,
            })
            .count();
        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_entry(email: &str, wallet: &str) -> NewEntry {
        NewEntry {
            email: email.into(),
            wallet_address: wallet.into(),
            confirmation_token: Uuid::new_v4().to_string(),
        }
    }

    #[tokio::test]
    async fn positions_are_monotonic() {
        let store = MemoryStore::new();
        let a = store.insert_entry(&new_entry("a@x.com", "0xa")).await.unwrap();
        let b = store.insert_entry(&new_entry("b@x.com", "0xb")).await.unwrap();
        assert_eq!(a.position, 1);
        assert_eq!(b.position, 2);
        assert_eq!(a.status, EntryStatus::Pending);
        assert!(!a.email_confirmed);
    }

    #[tokio::test]
    async fn insert_enforces_uniqueness() {
        let store = MemoryStore::new();
        store.insert_entry(&new_entry("a@x.com", "0xa")).await.unwrap();

        let err = store.insert_entry(&new_entry("a@x.com", "0xb")).await.unwrap_err();
        assert!(matches!(err, StorageError::Duplicate(UniqueField::Email)));

        let err = store.insert_entry(&new_entry("b@x.com", "0xa")).await.unwrap_err();
        assert!(matches!(err, StorageError::Duplicate(UniqueField::Wallet)));

        assert_eq!(store.entries().len(), 1);
    }

    #[tokio::test]
    async fn confirm_is_conditional() {
        let store = MemoryStore::new();
        let entry = store.insert_entry(&new_entry("a@x.com", "0xa")).await.unwrap();

        assert!(store.confirm_entry(entry.id, "wrong").await.unwrap().is_none());

        let confirmed = store
            .confirm_entry(entry.id, &entry.confirmation_token)
            .await
            .unwrap()
            .unwrap();
        assert!(confirmed.is_confirmed());
        assert!(confirmed.confirmed_at.is_some());

        // Second attempt loses the race.
        assert!(
            store
                .confirm_entry(entry.id, &entry.confirmation_token)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn confirmation_sent_is_set_once() {
        let store = MemoryStore::new();
        let entry = store.insert_entry(&new_entry("a@x.com", "0xa")).await.unwrap();

        store.mark_confirmation_sent(entry.id).await.unwrap();
        let first = store.find_entry(entry.id).await.unwrap().unwrap().confirmation_sent_at;
        store.mark_confirmation_sent(entry.id).await.unwrap();
        let second = store.find_entry(entry.id).await.unwrap().unwrap().confirmation_sent_at;

        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn newsletter_upsert_reactivates() {
        let store = MemoryStore::new();
        store.upsert_newsletter("a@x.com", "waitlist").await.unwrap();
        {
            let mut state = store.lock();
            let sub = state.newsletter.get_mut("a@x.com").unwrap();
            sub.status = SubscriptionStatus::Unsubscribed;
            sub.unsubscribed_at = Some(Utc::now());
        }

        store.upsert_newsletter("a@x.com", "waitlist").await.unwrap();
        let sub = store.find_newsletter("a@x.com").await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.unsubscribed_at.is_none());
    }

    #[tokio::test]
    async fn faults_fail_the_named_operation() {
        let store = MemoryStore::new();
        store.fail(Fault::Count(CountScope::Pending));
        assert!(store.count_entries(CountScope::All).await.is_ok());
        assert!(store.count_entries(CountScope::Pending).await.is_err());

        store.heal(Fault::Count(CountScope::Pending));
        assert_eq!(store.count_entries(CountScope::Pending).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_lookup_fault_fails_email_and_wallet_lookups() {
        let store = MemoryStore::new();
        store.fail(Fault::DuplicateLookup);
        assert!(store.find_entry_by_email("a@x.com").await.is_err());
        assert!(store.find_entry_by_wallet("0xa").await.is_err());
        assert!(store.find_entry(Uuid::new_v4()).await.is_ok());
    }

    #[tokio::test]
    async fn empty_token_fault_stores_blank_token() {
        let store = MemoryStore::new();
        store.fail(Fault::EmptyToken);
        let entry = store.insert_entry(&new_entry("a@x.com", "0xa")).await.unwrap();
        assert!(entry.confirmation_token.is_empty());
    }
}
