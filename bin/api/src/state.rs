use std::sync::Arc;
use waitlist_core::Settings;
use waitlist_mailer::Notifier;
use waitlist_storage::WaitlistStore;

/// Shared application state.
pub struct AppState {
    pub settings: Settings,
    pub store: Arc<dyn WaitlistStore>,
    pub notifier: Arc<dyn Notifier>,
}
