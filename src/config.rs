//! Client configuration: backend base URL, auth variant, request timeout and
//! session file. Defaults come from build-time environment variables, and
//! runtime environment variables override them so one binary can target
//! either console. Configuration values are public; do not store secrets here.

use crate::errors::AppError;
use crate::session::AuthVariant;
use std::path::PathBuf;
use url::Url;

pub const ENV_API_BASE_URL: &str = "CONSOLE_API_BASE_URL";
pub const ENV_AUTH_VARIANT: &str = "CONSOLE_AUTH_VARIANT";
pub const ENV_TIMEOUT_MS: &str = "CONSOLE_TIMEOUT_MS";
pub const ENV_SESSION_FILE: &str = "CONSOLE_SESSION_FILE";

/// Default request timeout (milliseconds) applied to all backend calls.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_SESSION_FILE: &str = ".console-session.json";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub variant: AuthVariant,
    pub timeout_ms: u64,
    pub session_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: option_env!("CONSOLE_DEFAULT_API_BASE_URL")
                .unwrap_or(DEFAULT_API_BASE_URL)
                .to_string(),
            variant: AuthVariant::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }
}

impl AppConfig {
    /// Loads defaults and applies runtime overrides from the environment.
    ///
    /// # Errors
    /// Returns `AppError::Config` if an override cannot be parsed or the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, AppError> {
        let mut config = Self::default();
        apply_runtime_overrides(&mut config, RuntimeConfig::from_env())?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the base URL and normalizes it without a trailing slash.
    ///
    /// # Errors
    /// Returns `AppError::Config` for an empty or non-http(s) base URL, or a
    /// zero timeout.
    pub fn validate(&mut self) -> Result<(), AppError> {
        let base = self.api_base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(AppError::Config("API base URL is not configured.".to_string()));
        }

        let url = Url::parse(base)
            .map_err(|err| AppError::Config(format!("Invalid API base URL '{base}': {err}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
            return Err(AppError::Config(format!(
                "API base URL '{base}' must be an http(s) URL with a host."
            )));
        }

        if self.timeout_ms == 0 {
            return Err(AppError::Config("Request timeout must be positive.".to_string()));
        }

        self.api_base_url = base.to_string();
        Ok(())
    }
}

#[derive(Default)]
struct RuntimeConfig {
    api_base_url: Option<String>,
    variant: Option<String>,
    timeout_ms: Option<String>,
    session_file: Option<String>,
}

impl RuntimeConfig {
    fn from_env() -> Self {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .and_then(|value| normalize_runtime_value(&value))
        };
        Self {
            api_base_url: read(ENV_API_BASE_URL),
            variant: read(ENV_AUTH_VARIANT),
            timeout_ms: read(ENV_TIMEOUT_MS),
            session_file: read(ENV_SESSION_FILE),
        }
    }
}

fn apply_runtime_overrides(config: &mut AppConfig, runtime: RuntimeConfig) -> Result<(), AppError> {
    if let Some(value) = runtime.api_base_url {
        config.api_base_url = value;
    }
    if let Some(value) = runtime.variant {
        config.variant = value.parse()?;
    }
    if let Some(value) = runtime.timeout_ms {
        config.timeout_ms = value
            .parse()
            .map_err(|_| AppError::Config(format!("{ENV_TIMEOUT_MS} must be a number of milliseconds.")))?;
    }
    if let Some(value) = runtime.session_file {
        config.session_file = PathBuf::from(value);
    }
    Ok(())
}

fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
