//! Transactional email delivery for waitlist confirmations.

pub mod message;
pub mod notifier;
pub mod resend;
pub mod template;

pub use message::{EmailMessage, Tag, bare_address};
pub use notifier::{DisabledNotifier, Notifier, NotifyError};
pub use resend::ResendNotifier;
pub use template::ConfirmationEmail;
