//! Response interception shared by every backend call. Success bodies are
//! returned as parsed JSON; any other status becomes `AppError::Http` with the
//! parsed body, and 401/403 additionally tears down the session that sent the
//! request.

use crate::errors::AppError;
use crate::session::Session;
use serde_json::Value;
use tracing::debug;

/// Maximum number of characters kept from a non-JSON error body.
const MAX_ERROR_CHARS: usize = 200;

/// A completed HTTP exchange, reduced to what interception needs.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Runs `response` through the interceptor. `generation` is the session
/// generation the request was sent under.
///
/// # Errors
/// Returns `AppError::Http` for non-2xx statuses and `AppError::Parse` for a
/// success body that is not JSON.
pub fn intercept(
    session: &Session,
    generation: u64,
    response: RawResponse,
) -> Result<Option<Value>, AppError> {
    if response.is_success() {
        return parse_body(&response.body)
            .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")));
    }

    if matches!(response.status, 401 | 403) && session.is_authenticated() {
        session.force_logout(generation);
    }

    let payload = match parse_body(&response.body) {
        Ok(payload) => payload,
        Err(_) => Some(Value::String(sanitize_body(&response.body))),
    };

    debug!("backend answered {} {}", response.status, response.status_text);

    Err(AppError::Http {
        status: response.status,
        status_text: response.status_text,
        payload,
    })
}

fn parse_body(body: &str) -> Result<Option<Value>, serde_json::Error> {
    if body.is_empty() {
        Ok(None)
    } else {
        serde_json::from_str(body).map(Some)
    }
}

/// Trims and truncates a non-JSON error body for display.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
