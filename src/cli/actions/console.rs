//! Wiring for one CLI invocation: the file-backed store, the session built
//! from it, and the clients that share that session.

use crate::api::ApiClient;
use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::navigation::{HistoryNavigator, Route, Router};
use crate::session::{FileStore, Session};
use std::sync::Arc;

pub struct Console {
    pub session: Arc<Session>,
    pub api: Arc<ApiClient>,
    pub auth: AuthService,
    pub router: Router,
    navigator: Arc<HistoryNavigator>,
}

impl Console {
    /// # Errors
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn open(config: &AppConfig) -> Result<Self, AppError> {
        let store = Arc::new(FileStore::open(&config.session_file));
        let navigator = Arc::new(HistoryNavigator::new());
        let session = Arc::new(Session::initialize(
            config.variant,
            store,
            navigator.clone(),
        ));
        let api = Arc::new(ApiClient::new(config, session.clone())?);

        Ok(Self {
            auth: AuthService::new(api.clone()),
            router: Router::new(session.clone()),
            session,
            api,
            navigator,
        })
    }

    /// Where the session navigated last during this invocation.
    #[must_use]
    pub fn location(&self) -> Option<Route> {
        self.navigator.current()
    }
}

/// Converts a session error into a CLI error carrying the full description.
#[must_use]
pub fn report(err: &AppError) -> anyhow::Error {
    anyhow::anyhow!(describe(err))
}

/// Human-readable error text, including field-level validation messages.
#[must_use]
pub fn describe(err: &AppError) -> String {
    let mut message = err.to_string();
    let detail = err.detail().or_else(|| err.payload().and_then(|p| p.as_str()));
    if let Some(detail) = detail {
        message.push_str(": ");
        message.push_str(detail);
    }
    for (field, errors) in err.field_errors() {
        if field == "detail" {
            continue;
        }
        for error in errors {
            message.push_str(&format!("\n  {field}: {error}"));
        }
    }
    message
}
