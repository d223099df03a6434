//! Login, registration and profile calls against the auth endpoints. All of
//! them go through [`ApiClient`], so they share the decorator and the
//! interceptor with every other backend call. Credential payloads must never
//! be logged.

use crate::api::client::{decode, ApiClient};
use crate::auth::types::{LoginRequest, RegisterRequest, UserProfile};
use crate::errors::AppError;
use crate::navigation::Route;
use crate::session::store::{KEY_EMAIL, KEY_FIRST_NAME, KEY_LAST_NAME, KEY_USERNAME};
use crate::session::{AuthVariant, Session};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct AuthService {
    api: Arc<ApiClient>,
}

impl AuthService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        self.api.session()
    }

    /// Exchanges credentials for a session token, stores it and navigates to
    /// the pending return path (or `/`). Returns the route navigated to.
    ///
    /// # Errors
    /// Propagates the backend error unchanged; the session is not touched on
    /// failure.
    pub async fn login(&self, request: &LoginRequest) -> Result<Route, AppError> {
        let session = self.session();
        let variant = session.variant();

        let payload = self
            .api
            .post(variant.login_path(), &to_body(request)?)
            .await?;
        let token = variant.token_from_login(payload.as_ref())?;
        session.establish(token)?;
        let generation = session.generation();
        info!("signed in as {}", request.username);

        if variant == AuthVariant::Token {
            if let Err(err) = self.profile().await {
                // A 401/403 here already tore the session down and moved to /login.
                if !session.is_authenticated() || session.generation() != generation {
                    return Err(err);
                }
                warn!("signed in, but the profile could not be loaded: {err}");
            }
        }

        let destination = session
            .take_return_path()
            .and_then(|path| match Route::parse(&path) {
                Ok(route) => Some(route),
                Err(err) => {
                    debug!("dropping unusable return path: {err}");
                    None
                }
            })
            .unwrap_or_else(Route::root);
        session.navigate(&destination);
        Ok(destination)
    }

    /// Creates the account and signs in with the same credentials.
    ///
    /// # Errors
    /// A rejected registration propagates with its field errors intact. If
    /// the account was created but the follow-up login failed, the cause is
    /// wrapped in `AppError::AutoLogin`.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Route, AppError> {
        let variant = self.session().variant();
        self.api
            .post(variant.register_path(), &to_body(request)?)
            .await?;
        info!("registered {}", request.username);

        self.login(&request.credentials())
            .await
            .map_err(|err| AppError::AutoLogin(Box::new(err)))
    }

    /// # Errors
    /// Returns `AppError::Storage` if the store could not be emptied.
    pub fn logout(&self) -> Result<(), AppError> {
        self.session().logout()
    }

    /// Fetches the current user and caches the profile in the store.
    ///
    /// # Errors
    /// Propagates request errors; a 401 here also ends the session.
    pub async fn profile(&self) -> Result<UserProfile, AppError> {
        let session = self.session();
        let payload = self.api.get(session.variant().profile_path()).await?;
        let profile: UserProfile = decode(payload)?;

        session.store().set_all(&[
            (KEY_USERNAME, profile.username.as_str()),
            (KEY_FIRST_NAME, profile.first_name.as_str()),
            (KEY_LAST_NAME, profile.last_name.as_str()),
            (KEY_EMAIL, profile.email.as_str()),
        ])?;
        Ok(profile)
    }

    /// Profile cached by the last [`AuthService::profile`] call, if any.
    #[must_use]
    pub fn cached_profile(&self) -> Option<UserProfile> {
        let store = self.session().store();
        let username = store.get(KEY_USERNAME)?;
        Some(UserProfile {
            id: None,
            username,
            first_name: store.get(KEY_FIRST_NAME).unwrap_or_default(),
            last_name: store.get(KEY_LAST_NAME).unwrap_or_default(),
            email: store.get(KEY_EMAIL).unwrap_or_default(),
        })
    }
}

fn to_body<T: Serialize>(request: &T) -> Result<Value, AppError> {
    serde_json::to_value(request).map_err(|err| AppError::Serialization(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::navigation::{HistoryNavigator, Router};
    use crate::session::{CredentialStore, MemoryStore};
    use secrecy::{ExposeSecret, SecretString};
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    struct Fixture {
        auth: AuthService,
        session: Arc<Session>,
        store: Arc<MemoryStore>,
        navigator: Arc<HistoryNavigator>,
    }

    fn fixture(server: &MockServer, variant: AuthVariant) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let navigator = Arc::new(HistoryNavigator::new());
        let session = Arc::new(Session::initialize(variant, store.clone(), navigator.clone()));
        let config = AppConfig {
            api_base_url: server.uri(),
            variant,
            timeout_ms: 2_000,
            ..AppConfig::default()
        };
        let api = ApiClient::new(&config, session.clone()).expect("api client");
        Fixture {
            auth: AuthService::new(Arc::new(api)),
            session,
            store,
            navigator,
        }
    }

    fn credentials(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: SecretString::from(password.to_string()),
        }
    }

    async fn mount_profile(server: &MockServer, token: &str) {
        Mock::given(method("GET"))
            .and(path("/auth/users/me/"))
            .and(header("Authorization", format!("Token {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "username": "ann",
                "first_name": "Ann",
                "last_name": "Lee",
                "email": "ann@hotel.example"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn login_returns_to_recorded_route() -> Result<(), AppError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token/login/"))
            .and(body_json(json!({"username": "ann", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"auth_token": "t1"})))
            .expect(1)
            .mount(&server)
            .await;
        mount_profile(&server, "t1").await;

        let fx = fixture(&server, AuthVariant::Token);
        let router = Router::new(fx.session.clone());
        assert_eq!(router.open("/clients")?, Route::login());

        let landed = fx.auth.login(&credentials("ann", "pw")).await?;

        assert_eq!(landed, Route::new("/clients"));
        assert_eq!(fx.navigator.current(), Some(Route::new("/clients")));
        assert_eq!(fx.session.return_path(), None);
        assert_eq!(fx.store.get("auth_token"), Some("t1".to_string()));
        assert_eq!(fx.store.get("return_url"), None);
        assert_eq!(
            fx.auth.cached_profile().map(|p| p.display_name()),
            Some("Ann Lee".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn login_without_return_path_goes_home() -> Result<(), AppError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/jwt/create/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
            )
            .mount(&server)
            .await;

        let fx = fixture(&server, AuthVariant::Jwt);
        assert_eq!(fx.auth.login(&credentials("ann", "pw")).await?, Route::root());

        let token = fx.session.token();
        assert_eq!(
            token.as_ref().map(|t| t.access().expose_secret().to_string()),
            Some("a1".to_string())
        );
        assert_eq!(
            token
                .as_ref()
                .and_then(|t| t.refresh())
                .map(|r| r.expose_secret().to_string()),
            Some("r1".to_string())
        );
        assert_eq!(fx.store.get("refresh"), Some("r1".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn login_profile_failure_is_not_fatal() -> Result<(), AppError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"auth_token": "t1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/users/me/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fx = fixture(&server, AuthVariant::Token);
        assert_eq!(fx.auth.login(&credentials("ann", "pw")).await?, Route::root());
        assert!(fx.session.is_authenticated());
        assert_eq!(fx.auth.cached_profile(), None);
        Ok(())
    }

    #[tokio::test]
    async fn login_rejected_by_profile_fetch_fails() -> Result<(), AppError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"auth_token": "t1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/users/me/"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token."})),
            )
            .mount(&server)
            .await;

        let fx = fixture(&server, AuthVariant::Token);
        let result = fx.auth.login(&credentials("ann", "pw")).await;

        assert_eq!(result.err().and_then(|e| e.status()), Some(401));
        assert!(!fx.session.is_authenticated());
        assert_eq!(fx.store.get("auth_token"), None);
        assert_eq!(fx.navigator.history(), vec![Route::login()]);
        Ok(())
    }

    #[tokio::test]
    async fn rejected_login_leaves_state_untouched() -> Result<(), AppError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token/login/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "non_field_errors": ["Unable to log in with provided credentials."]
            })))
            .mount(&server)
            .await;

        let fx = fixture(&server, AuthVariant::Token);
        fx.session.set_return_path("/rooms");

        let err = fx.auth.login(&credentials("ann", "wrong")).await.err();

        assert_eq!(err.as_ref().and_then(AppError::status), Some(400));
        assert_eq!(
            err.map(|e| e.field_errors()).and_then(|f| f.get("non_field_errors").cloned()),
            Some(vec!["Unable to log in with provided credentials.".to_string()])
        );
        assert!(!fx.session.is_authenticated());
        assert_eq!(fx.session.return_path(), Some("/rooms".to_string()));
        assert!(fx.navigator.history().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn login_without_token_in_payload_is_parse_error() -> Result<(), AppError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let fx = fixture(&server, AuthVariant::Token);
        let result = fx.auth.login(&credentials("ann", "pw")).await;
        assert!(matches!(result, Err(AppError::Parse(_))));
        assert!(!fx.session.is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn register_chains_login() -> Result<(), AppError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/users/"))
            .and(body_json(json!({
                "username": "ann",
                "password": "pw",
                "email": "ann@hotel.example"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1, "username": "ann"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/jwt/create/"))
            .and(body_json(json!({"username": "ann", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "a1"})))
            .expect(1)
            .mount(&server)
            .await;

        let fx = fixture(&server, AuthVariant::Jwt);
        let request = RegisterRequest {
            username: "ann".to_string(),
            password: SecretString::from("pw".to_string()),
            first_name: String::new(),
            last_name: String::new(),
            email: "ann@hotel.example".to_string(),
        };

        assert_eq!(fx.auth.register(&request).await?, Route::root());
        assert!(fx.session.is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn register_validation_error_keeps_field_errors() -> Result<(), AppError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/users/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "username": ["A user with that username already exists."]
            })))
            .mount(&server)
            .await;

        let fx = fixture(&server, AuthVariant::Token);
        let request = RegisterRequest {
            username: "ann".to_string(),
            password: SecretString::from("pw".to_string()),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
        };

        let err = fx.auth.register(&request).await.err();
        assert!(matches!(err, Some(AppError::Http { status: 400, .. })));
        assert_eq!(
            err.map(|e| e.field_errors()).and_then(|f| f.get("username").cloned()),
            Some(vec!["A user with that username already exists.".to_string()])
        );
        assert!(!fx.session.is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn register_then_failed_login_is_auto_login_error() -> Result<(), AppError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/users/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 2})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/token/login/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fx = fixture(&server, AuthVariant::Token);
        let request = RegisterRequest {
            username: "bob".to_string(),
            password: SecretString::from("pw".to_string()),
            first_name: "Bob".to_string(),
            last_name: String::new(),
            email: String::new(),
        };

        let err = fx.auth.register(&request).await.err();
        match err {
            Some(AppError::AutoLogin(cause)) => assert_eq!(cause.status(), Some(503)),
            other => panic!("expected auto-login error, got {other:?}"),
        }
        assert!(!fx.session.is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn logout_erases_cached_profile() -> Result<(), AppError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"auth_token": "t9"})))
            .mount(&server)
            .await;
        mount_profile(&server, "t9").await;

        let fx = fixture(&server, AuthVariant::Token);
        fx.auth.login(&credentials("ann", "pw")).await?;
        assert!(fx.auth.cached_profile().is_some());

        fx.auth.logout()?;
        assert_eq!(fx.auth.cached_profile(), None);
        assert!(fx.store.is_empty());
        assert_eq!(fx.navigator.current(), Some(Route::login()));
        Ok(())
    }
}
