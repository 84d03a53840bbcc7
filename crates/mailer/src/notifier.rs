use async_trait::async_trait;
use thiserror::Error;

use crate::EmailMessage;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport failure, including timeouts.
    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("email provider rejected message (status={status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("notifier misconfigured: {0}")]
    Config(String),
}

/// Best-effort delivery of one email.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// A disabled notifier is skipped entirely by callers.
    fn is_enabled(&self) -> bool {
        true
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// Notifier used when no provider key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        tracing::debug!(to = %message.to, "Email delivery disabled, dropping message");
        Ok(())
    }
}
