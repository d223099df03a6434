//! Session token shapes and the two auth variants that produce them.
//!
//! The hotel console authenticates with a single opaque token sent as
//! `Authorization: Token <value>`; the contracts console receives an
//! access/refresh pair and sends `Authorization: Bearer <access>`. The refresh
//! token is stored and cleared with the access token but never rotated.

use crate::errors::AppError;
use crate::session::store::{CredentialStore, KEY_ACCESS, KEY_AUTH_TOKEN, KEY_REFRESH};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::{fmt, str::FromStr};

/// Credential issued by the backend. Replaced wholesale, never edited.
#[derive(Clone, Debug)]
pub struct SessionToken {
    access: SecretString,
    refresh: Option<SecretString>,
}

impl SessionToken {
    #[must_use]
    pub fn new(access: impl Into<String>) -> Self {
        Self {
            access: SecretString::from(access.into()),
            refresh: None,
        }
    }

    #[must_use]
    pub fn with_refresh(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: SecretString::from(access.into()),
            refresh: Some(SecretString::from(refresh.into())),
        }
    }

    #[must_use]
    pub fn access(&self) -> &SecretString {
        &self.access
    }

    #[must_use]
    pub fn refresh(&self) -> Option<&SecretString> {
        self.refresh.as_ref()
    }
}

/// Tokens must be usable verbatim in a header value.
#[must_use]
pub fn is_well_formed(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_graphic())
}

/// Normalizes a stored value. Older clients wrote JSON-encoded strings
/// (`"\"abc\""`), so a quoted value is decoded first. `null`, `undefined` and
/// anything else that is not a well-formed token is `None`.
#[must_use]
pub fn parse_stored(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let value = if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed).ok()?
    } else {
        trimmed.to_string()
    };
    if matches!(value.as_str(), "null" | "undefined") {
        return None;
    }
    is_well_formed(&value).then_some(value)
}

/// Authorization header scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthScheme {
    Token,
    Bearer,
}

impl AuthScheme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Token => "Token",
            Self::Bearer => "Bearer",
        }
    }
}

/// Configuration variant of the session contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthVariant {
    /// Single opaque token (`/auth/token/login/`, `Token` scheme).
    #[default]
    Token,
    /// Access/refresh pair (`/auth/jwt/create/`, `Bearer` scheme).
    Jwt,
}

impl AuthVariant {
    #[must_use]
    pub fn scheme(self) -> AuthScheme {
        match self {
            Self::Token => AuthScheme::Token,
            Self::Jwt => AuthScheme::Bearer,
        }
    }

    #[must_use]
    pub fn login_path(self) -> &'static str {
        match self {
            Self::Token => "/auth/token/login/",
            Self::Jwt => "/auth/jwt/create/",
        }
    }

    #[must_use]
    pub fn register_path(self) -> &'static str {
        "/auth/users/"
    }

    #[must_use]
    pub fn profile_path(self) -> &'static str {
        "/auth/users/me/"
    }

    /// Store keys holding token material for this variant.
    #[must_use]
    pub fn token_keys(self) -> &'static [&'static str] {
        match self {
            Self::Token => &[KEY_AUTH_TOKEN],
            Self::Jwt => &[KEY_ACCESS, KEY_REFRESH],
        }
    }

    /// Extracts the token from a successful login response.
    ///
    /// # Errors
    /// Returns `AppError::Parse` if the payload lacks a well-formed token.
    pub fn token_from_login(self, payload: Option<&Value>) -> Result<SessionToken, AppError> {
        let field = |name: &str| {
            payload
                .and_then(|body| body.get(name))
                .and_then(Value::as_str)
                .filter(|value| is_well_formed(value))
                .map(str::to_string)
        };

        match self {
            Self::Token => field("auth_token")
                .map(SessionToken::new)
                .ok_or_else(|| AppError::Parse("Login response has no auth_token".to_string())),
            Self::Jwt => {
                let access = field("access").ok_or_else(|| {
                    AppError::Parse("Login response has no access token".to_string())
                })?;
                Ok(match field("refresh") {
                    Some(refresh) => SessionToken::with_refresh(access, refresh),
                    None => SessionToken::new(access),
                })
            }
        }
    }

    /// Reads the persisted token. Absent or malformed values yield `None`.
    #[must_use]
    pub fn load(self, store: &dyn CredentialStore) -> Option<SessionToken> {
        let read = |key: &str| store.get(key).as_deref().and_then(parse_stored);

        match self {
            Self::Token => read(KEY_AUTH_TOKEN).map(SessionToken::new),
            Self::Jwt => {
                let access = read(KEY_ACCESS)?;
                Some(match read(KEY_REFRESH) {
                    Some(refresh) => SessionToken::with_refresh(access, refresh),
                    None => SessionToken::new(access),
                })
            }
        }
    }

    /// Writes the token under this variant's keys in one store update.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the store rejects the write.
    pub fn save(self, store: &dyn CredentialStore, token: &SessionToken) -> Result<(), AppError> {
        match self {
            Self::Token => store.set(KEY_AUTH_TOKEN, token.access().expose_secret()),
            Self::Jwt => {
                if let Some(refresh) = token.refresh() {
                    store.set_all(&[
                        (KEY_ACCESS, token.access().expose_secret()),
                        (KEY_REFRESH, refresh.expose_secret()),
                    ])
                } else {
                    store.remove(KEY_REFRESH)?;
                    store.set(KEY_ACCESS, token.access().expose_secret())
                }
            }
        }
    }
}

impl FromStr for AuthVariant {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "token" => Ok(Self::Token),
            "jwt" | "bearer" => Ok(Self::Jwt),
            other => Err(AppError::Config(format!(
                "Unknown auth variant '{other}', expected 'token' or 'jwt'."
            ))),
        }
    }
}

impl fmt::Display for AuthVariant {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token => write!(formatter, "token"),
            Self::Jwt => write!(formatter, "jwt"),
        }
    }
}
