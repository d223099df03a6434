use crate::navigation::route::{Route, LOGIN_PATH, REGISTER_PATH, ROOT_PATH};
use crate::session::Session;
use tracing::debug;

/// Outcome of evaluating a navigation target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

/// Decides whether a route may be entered with the current session.
///
/// UX-only guard; the backend still rejects unauthenticated calls, and the
/// response interceptor handles that path.
#[derive(Clone, Debug)]
pub struct RouteGuard {
    public: Vec<String>,
    auth_only: Vec<String>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        let auth_only = vec![LOGIN_PATH.to_string(), REGISTER_PATH.to_string()];
        Self {
            public: auth_only.clone(),
            auth_only,
        }
    }
}

impl RouteGuard {
    /// Adds a route reachable without a session. It stays reachable after
    /// login too; only `/login` and `/register` bounce authenticated users.
    #[must_use]
    pub fn with_public_route(mut self, path: &str) -> Self {
        let route = Route::new(path);
        self.public.push(route.normalized_path().to_string());
        self
    }

    #[must_use]
    pub fn is_public(&self, route: &Route) -> bool {
        let path = route.normalized_path();
        self.public.iter().any(|public| public == path)
    }

    fn is_auth_only(&self, route: &Route) -> bool {
        let path = route.normalized_path();
        self.auth_only.iter().any(|auth_only| auth_only == path)
    }

    /// Evaluates `to`. Redirecting an unauthenticated user records `to` as
    /// the session's pending return path.
    #[must_use]
    pub fn check(&self, to: &Route, session: &Session) -> GuardDecision {
        let authenticated = session.is_authenticated();

        if authenticated && self.is_auth_only(to) {
            debug!("already signed in, leaving {}", to.path());
            return GuardDecision::Redirect(to.redirect_to(ROOT_PATH));
        }

        if !authenticated && !self.is_public(to) {
            debug!("sign-in required for {}", to.path());
            session.set_return_path(&to.full_path());
            return GuardDecision::Redirect(to.redirect_to(LOGIN_PATH));
        }

        GuardDecision::Allow
    }
}
