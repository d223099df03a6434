use crate::errors::AppError;
use std::fmt;
use url::{form_urlencoded, Url};

/// Base used to resolve route targets; routes never carry an origin.
const ROUTE_BASE: &str = "http://console.local/";

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

/// Navigable location inside the console: a path plus query parameters.
/// A parsed route keeps its query string as written so it can be restored
/// exactly after login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    path: String,
    query: Vec<(String, String)>,
    raw_query: Option<String>,
}

impl Route {
    #[must_use]
    pub fn new(path: &str) -> Self {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Self {
            path,
            query: Vec::new(),
            raw_query: None,
        }
    }

    #[must_use]
    pub fn root() -> Self {
        Self::new(ROOT_PATH)
    }

    #[must_use]
    pub fn login() -> Self {
        Self::new(LOGIN_PATH)
    }

    /// Parses a target such as `/clients?page=2`. Fragments are dropped.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the target is empty or points at another origin.
    pub fn parse(target: &str) -> Result<Self, AppError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(AppError::Config("Route target is empty.".to_string()));
        }

        let base = Url::parse(ROUTE_BASE)
            .map_err(|err| AppError::Config(format!("Invalid route base: {err}")))?;
        let url = base
            .join(target)
            .map_err(|err| AppError::Config(format!("Invalid route '{target}': {err}")))?;

        if url.origin() != base.origin() {
            return Err(AppError::Config(format!(
                "Route '{target}' must be a path inside the console."
            )));
        }

        Ok(Self {
            path: url.path().to_string(),
            query: url.query_pairs().into_owned().collect(),
            raw_query: url.query().filter(|q| !q.is_empty()).map(str::to_string),
        })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Path with a trailing `/` removed, except for the root.
    #[must_use]
    pub fn normalized_path(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        if trimmed.is_empty() {
            ROOT_PATH
        } else {
            trimmed
        }
    }

    /// Same query parameters, different path. Used by guard redirects.
    #[must_use]
    pub fn redirect_to(&self, path: &str) -> Self {
        Self {
            path: Self::new(path).path,
            query: self.query.clone(),
            raw_query: self.raw_query.clone(),
        }
    }

    /// Path plus encoded query, the form recorded as a pending return path.
    #[must_use]
    pub fn full_path(&self) -> String {
        if let Some(raw) = &self.raw_query {
            return format!("{}?{raw}", self.path);
        }
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.full_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_path_and_query() -> Result<(), AppError> {
        let route = Route::parse("/clients?page=2&search=ann")?;
        assert_eq!(route.path(), "/clients");
        assert_eq!(
            route.query(),
            &[
                ("page".to_string(), "2".to_string()),
                ("search".to_string(), "ann".to_string())
            ]
        );
        assert_eq!(route.full_path(), "/clients?page=2&search=ann");
        Ok(())
    }

    #[test]
    fn parse_relative_target_and_fragment() -> Result<(), AppError> {
        let route = Route::parse("rooms#top")?;
        assert_eq!(route.full_path(), "/rooms");
        Ok(())
    }

    #[test]
    fn parse_rejects_foreign_origin_and_empty() {
        assert!(Route::parse("https://evil.example/login").is_err());
        assert!(Route::parse("//evil.example/login").is_err());
        assert!(Route::parse("   ").is_err());
    }

    #[test]
    fn normalized_path_trims_trailing_slash() {
        assert_eq!(Route::new("/login/").normalized_path(), "/login");
        assert_eq!(Route::root().normalized_path(), "/");
        assert_eq!(Route::new("cleaning-schedule").path(), "/cleaning-schedule");
    }

    #[test]
    fn redirect_keeps_query() -> Result<(), AppError> {
        let route = Route::parse("/bookings?room=12")?;
        let redirect = route.redirect_to(LOGIN_PATH);
        assert_eq!(redirect.to_string(), "/login?room=12");
        Ok(())
    }

    #[test]
    fn full_path_encodes_query_values() {
        let route = Route {
            path: "/reports".to_string(),
            query: vec![("q".to_string(), "a b&c".to_string())],
            raw_query: None,
        };
        assert_eq!(route.full_path(), "/reports?q=a+b%26c");
    }

    #[test]
    fn full_path_keeps_query_as_written() -> Result<(), AppError> {
        assert_eq!(Route::parse("/clients?flag")?.full_path(), "/clients?flag");
        assert_eq!(
            Route::parse("/clients?search=a%20b")?.full_path(),
            "/clients?search=a%20b"
        );
        assert_eq!(
            Route::parse("/clients?search=a%20b")?.redirect_to(LOGIN_PATH).to_string(),
            "/login?search=a%20b"
        );
        assert_eq!(Route::parse("/clients?")?.full_path(), "/clients");
        Ok(())
    }
}
