use thiserror::Error;

use crate::models::UniqueField;

/// Constraint guarding `waitlist_entries.email`.
pub const EMAIL_CONSTRAINT: &str = "waitlist_entries_email_key";
/// Constraint guarding `waitlist_entries.wallet_address`.
pub const WALLET_CONSTRAINT: &str = "waitlist_entries_wallet_address_key";

#[derive(Debug, Error)]
pub enum StorageError {
    /// An insert hit one of the uniqueness constraints.
    #[error("duplicate {0:?}")]
    Duplicate(UniqueField),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Store could not be reached. Used by non-SQL backends.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                match db.constraint() {
                    Some(EMAIL_CONSTRAINT) => return StorageError::Duplicate(UniqueField::Email),
                    Some(WALLET_CONSTRAINT) => return StorageError::Duplicate(UniqueField::Wallet),
                    _ => {}
                }
            }
        }
        StorageError::Database(e)
    }
}
