//! Input checks and normalisation for registrations and confirmation links.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static WALLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid wallet regex"));

/// `local@domain.tld` with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// `0x` followed by exactly 40 hex digits, any case.
pub fn is_valid_wallet(wallet: &str) -> bool {
    WALLET_RE.is_match(wallet.trim())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn normalize_wallet(wallet: &str) -> String {
    wallet.trim().to_lowercase()
}

/// Tokens are compared after this, so links mangled to upper case still work.
pub fn normalize_token(token: &str) -> String {
    token.trim().to_lowercase()
}

pub fn tokens_match(supplied: &str, stored: &str) -> bool {
    let stored = normalize_token(stored);
    !stored.is_empty() && normalize_token(supplied) == stored
}
