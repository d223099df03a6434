//! Route handling for the console: route parsing, the navigation capability,
//! and the guard that keeps protected screens behind login.

pub mod guard;
pub mod navigator;
pub mod route;

pub use guard::{GuardDecision, RouteGuard};
pub use navigator::{HistoryNavigator, Navigator};
pub use route::Route;

use crate::errors::AppError;
use crate::session::Session;
use std::sync::Arc;

/// Guarded navigation: every `open` goes through the [`RouteGuard`] before the
/// session's navigator is asked to move.
pub struct Router {
    session: Arc<Session>,
    guard: RouteGuard,
}

impl Router {
    #[must_use]
    pub fn new(session: Arc<Session>) -> Self {
        Self::with_guard(session, RouteGuard::default())
    }

    #[must_use]
    pub fn with_guard(session: Arc<Session>, guard: RouteGuard) -> Self {
        Self { session, guard }
    }

    /// Opens `target` and returns where the console actually landed.
    ///
    /// # Errors
    /// Returns `AppError::Config` if `target` is not a console route.
    pub fn open(&self, target: &str) -> Result<Route, AppError> {
        let to = Route::parse(target)?;
        let destination = match self.guard.check(&to, &self.session) {
            GuardDecision::Allow => to,
            GuardDecision::Redirect(route) => route,
        };
        self.session.navigate(&destination);
        Ok(destination)
    }
}
