//! Request decoration. The session token is attached only to requests aimed
//! at the configured backend; third-party or asset URLs get no headers, so the
//! token cannot leak to another origin.

use crate::session::Session;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use secrecy::ExposeSecret;
use tracing::warn;

/// True when `target` is the base URL itself or a path, query or fragment
/// below it. A plain string prefix is not enough: `https://api.example` must
/// not match `https://api.example.evil`.
#[must_use]
pub fn is_backend_url(base_url: &str, target: &str) -> bool {
    let base = base_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return false;
    }
    match target.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
        None => false,
    }
}

/// Headers to send with a request to `target`.
#[must_use]
pub fn authorization_headers(base_url: &str, target: &str, session: &Session) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if !is_backend_url(base_url, target) {
        return headers;
    }
    let Some(token) = session.token() else {
        return headers;
    };

    let scheme = session.variant().scheme();
    match HeaderValue::from_str(&format!("{} {}", scheme.as_str(), token.access().expose_secret()))
    {
        Ok(mut value) => {
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Err(_) => warn!("session token is not a valid header value, sending request without it"),
    }

    headers
}
