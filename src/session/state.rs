//! Session context: the single source of truth for "is the user
//! authenticated, and with what token". It is constructed once and shared as
//! `Arc<Session>`; the token only changes through [`Session::establish`],
//! [`Session::logout`] and [`Session::force_logout`].
//!
//! The persisted store and the in-memory state are updated under the same
//! write lock, so readers never observe one without the other. Every token
//! change bumps a generation counter; requests remember the generation they
//! were sent under so late failures cannot tear down a newer session.

use crate::errors::AppError;
use crate::navigation::{Navigator, Route};
use crate::session::store::{CredentialStore, KEY_RETURN_URL};
use crate::session::token::{parse_stored, AuthVariant, SessionToken};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct AuthState {
    token: Option<SessionToken>,
    return_path: Option<String>,
    generation: u64,
}

pub struct Session {
    variant: AuthVariant,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    state: RwLock<AuthState>,
}

impl Session {
    /// Builds the session from whatever the store holds. Absent or malformed
    /// tokens start the session unauthenticated; malformed entries are erased
    /// so the store and the state agree.
    #[must_use]
    pub fn initialize(
        variant: AuthVariant,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let token = variant.load(store.as_ref());

        for key in variant.token_keys() {
            let Some(raw) = store.get(key) else { continue };
            if token.is_none() || parse_stored(&raw).is_none() {
                debug!("discarding malformed stored credential under {key}");
                if let Err(err) = store.remove(key) {
                    warn!("could not discard stored credential {key}: {err}");
                }
            }
        }

        let return_path = store
            .get(KEY_RETURN_URL)
            .filter(|path| path.starts_with('/'));

        debug!(
            "session initialized: variant={variant}, authenticated={}",
            token.is_some()
        );

        Self {
            variant,
            store,
            navigator,
            state: RwLock::new(AuthState {
                token,
                return_path,
                generation: 0,
            }),
        }
    }

    #[must_use]
    pub fn variant(&self) -> AuthVariant {
        self.variant
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .map(|state| state.token.is_some())
            .unwrap_or(false)
    }

    #[must_use]
    pub fn token(&self) -> Option<SessionToken> {
        self.state.read().ok()?.token.clone()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state.read().map(|state| state.generation).unwrap_or(0)
    }

    /// Replaces the token in the store and in memory.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the token cannot be persisted; the
    /// previous session is left in place.
    pub fn establish(&self, token: SessionToken) -> Result<(), AppError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| AppError::Storage("Poisoned lock".to_string()))?;

        if let Err(err) = self.variant.save(self.store.as_ref(), &token) {
            let restored = match &state.token {
                Some(previous) => self.variant.save(self.store.as_ref(), previous),
                None => self
                    .variant
                    .token_keys()
                    .iter()
                    .try_for_each(|key| self.store.remove(key)),
            };
            if let Err(restore_err) = restored {
                warn!("could not restore credential store after failed write: {restore_err}");
            }
            return Err(err);
        }

        state.token = Some(token);
        state.generation += 1;
        info!("session established (generation {})", state.generation);
        Ok(())
    }

    /// Clears the session and the store, then navigates to `/login`.
    /// Safe to call when already logged out.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the store could not be emptied. The
    /// in-memory session is cleared and navigation happens regardless.
    pub fn logout(&self) -> Result<(), AppError> {
        self.teardown(None).unwrap_or(Ok(()))
    }

    /// Logout triggered by a 401/403 on a request sent under `generation`.
    /// Returns `true` if the session was torn down. Nothing happens when the
    /// session holds no token or has changed since the request was sent.
    pub fn force_logout(&self, generation: u64) -> bool {
        match self.teardown(Some(generation)) {
            Some(result) => {
                warn!("authorization rejected by backend, session cleared");
                if let Err(err) = result {
                    warn!("forced logout could not clear the credential store: {err}");
                }
                true
            }
            None => {
                debug!("ignoring authorization failure outside the current session");
                false
            }
        }
    }

    fn teardown(&self, expected_generation: Option<u64>) -> Option<Result<(), AppError>> {
        let result = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if let Some(generation) = expected_generation {
                if state.token.is_none() || state.generation != generation {
                    return None;
                }
            }

            let result = self.store.clear();
            if state.token.take().is_some() {
                state.generation += 1;
                info!("session cleared (generation {})", state.generation);
            }
            state.return_path = None;
            result
        };

        self.navigator.navigate(&Route::login());
        Some(result)
    }

    /// Records where an unauthenticated user was heading.
    pub fn set_return_path(&self, path: &str) {
        if let Ok(mut state) = self.state.write() {
            state.return_path = Some(path.to_string());
        }
        if let Err(err) = self.store.set(KEY_RETURN_URL, path) {
            warn!("could not persist return path: {err}");
        }
    }

    #[must_use]
    pub fn return_path(&self) -> Option<String> {
        self.state.read().ok()?.return_path.clone()
    }

    /// Reads and clears the pending return path.
    pub fn take_return_path(&self) -> Option<String> {
        let path = self.state.write().ok()?.return_path.take();
        if path.is_some() {
            if let Err(err) = self.store.remove(KEY_RETURN_URL) {
                warn!("could not clear persisted return path: {err}");
            }
        }
        path
    }

    pub fn navigate(&self, route: &Route) {
        self.navigator.navigate(route);
    }
}
