pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod models;
pub mod repos;
pub mod store;

pub use error::StorageError;
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryStore;
pub use sqlx::postgres::PgPool;
pub use store::{PgStore, WaitlistStore};

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;

/// Connect to PostgreSQL.
///
/// `timeout` bounds pool acquisition and, via `statement_timeout`, every statement.
pub async fn connect(database_url: &str, timeout: Duration) -> Result<PgPool, sqlx::Error> {
    let statement_timeout = format!("{}ms", timeout.as_millis());
    tracing::debug!(%statement_timeout, "Connecting to PostgreSQL");
    let options = database_url
        .parse::<PgConnectOptions>()?
        .options([("statement_timeout", statement_timeout.as_str())]);

    PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(timeout)
        .idle_timeout(Duration::from_secs(300))
        .connect_with(options)
        .await
}
