pub mod confirm;
pub mod stats;
pub mod waitlist;

use axum::http::{HeaderMap, header};

/// Origin the request was addressed to.
///
/// `X-Forwarded-Host` and `X-Forwarded-Proto` are client-controlled unless a
/// proxy rewrites them, so they are only read when `trust_forwarded` is set.
pub(crate) fn request_origin(headers: &HeaderMap, trust_forwarded: bool) -> Option<String> {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let forwarded = |name: &str| if trust_forwarded { header_str(name) } else { None };

    let host = forwarded("x-forwarded-host").or_else(|| header_str(header::HOST.as_str()))?;
    let proto = forwarded("x-forwarded-proto").unwrap_or("http");
    Some(format!("{proto}://{host}"))
}
