//! Error type shared by the session core. Every backend call resolves to
//! `Result<_, AppError>`; HTTP failures keep the numeric status and the parsed
//! body so screens can render field-level validation messages.

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status} {status_text})")]
    Http {
        status: u16,
        status_text: String,
        payload: Option<Value>,
    },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Registration succeeded, but automatic sign-in failed: {0}")]
    AutoLogin(Box<AppError>),
}

impl AppError {
    /// HTTP status of the failed call, if the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::AutoLogin(inner) => inner.status(),
            _ => None,
        }
    }

    /// Parsed error body returned by the backend.
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Http { payload, .. } => payload.as_ref(),
            Self::AutoLogin(inner) => inner.payload(),
            _ => None,
        }
    }

    /// True for 401/403, the statuses that tear down the session.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Field-to-messages mapping from a validation body such as
    /// `{"username": ["already exists"], "non_field_errors": ["..."]}`.
    /// Single string values are returned as a one-element list; values of
    /// any other shape are skipped.
    #[must_use]
    pub fn field_errors(&self) -> BTreeMap<String, Vec<String>> {
        let mut errors = BTreeMap::new();
        let Some(Value::Object(fields)) = self.payload() else {
            return errors;
        };

        for (field, value) in fields {
            let messages: Vec<String> = match value {
                Value::String(message) => vec![message.clone()],
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                _ => continue,
            };
            if !messages.is_empty() {
                errors.insert(field.clone(), messages);
            }
        }

        errors
    }

    /// The `detail` message of business-rule and not-found responses.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.payload()?.get("detail")?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn http(status: u16, payload: Value) -> AppError {
        AppError::Http {
            status,
            status_text: "Bad Request".to_string(),
            payload: Some(payload),
        }
    }

    #[test]
    fn field_errors_collects_lists_and_strings() {
        let err = http(
            400,
            json!({
                "username": ["already exists"],
                "password": "too short",
                "count": 3
            }),
        );

        let fields = err.field_errors();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["username"], vec!["already exists".to_string()]);
        assert_eq!(fields["password"], vec!["too short".to_string()]);
    }

    #[test]
    fn field_errors_empty_without_object_payload() {
        let err = AppError::Network("down".to_string());
        assert!(err.field_errors().is_empty());
        assert!(http(500, json!("oops")).field_errors().is_empty());
    }

    #[test]
    fn detail_reads_not_found_message() {
        let err = http(404, json!({"detail": "No free rooms"}));
        assert_eq!(err.detail(), Some("No free rooms"));
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn auth_failure_statuses() {
        assert!(http(401, json!({})).is_auth_failure());
        assert!(http(403, json!({})).is_auth_failure());
        assert!(!AppError::Timeout("slow".to_string()).is_auth_failure());
    }

    #[test]
    fn auto_login_exposes_inner_status() {
        let err = AppError::AutoLogin(Box::new(http(400, json!({"non_field_errors": ["bad"]}))));
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.field_errors()["non_field_errors"], vec!["bad".to_string()]);
        assert!(err.to_string().starts_with("Registration succeeded"));
    }

    #[test]
    fn display_includes_status() {
        let err = AppError::Http {
            status: 401,
            status_text: "Unauthorized".to_string(),
            payload: None,
        };
        assert_eq!(err.to_string(), "Request failed (401 Unauthorized)");
    }
}
