//! # console-session (session and request-authorization pipeline)
//!
//! `console-session` is the session core shared by the hotel-management and
//! contracts-management lab consoles. It owns the session token lifecycle and
//! wraps every backend call so that authorization is attached and revoked in
//! one place.
//!
//! ## Components
//!
//! - **Credential store** ([`session::store`]): key/value persistence for the
//!   token(s), the pending return path, and the cached profile.
//! - **Session** ([`session::Session`]): the explicitly constructed auth state.
//!   It is passed as `Arc<Session>` to everything that needs it.
//! - **Request decorator** ([`api::decorator`]): attaches `Authorization` only
//!   to requests under the configured backend base URL.
//! - **Response interceptor** ([`api::interceptor`]): turns responses into
//!   `Result<Option<Value>, AppError>` and forces a logout on 401/403.
//! - **Navigation guard** ([`navigation::guard`]): keeps protected routes
//!   behind login and sends authenticated users away from `/login` and
//!   `/register`.
//!
//! ## Auth variants
//!
//! The hotel console uses a single opaque token (`Authorization: Token <v>`),
//! the contracts console an access/refresh pair (`Authorization: Bearer <v>`).
//! Both are [`session::AuthVariant`]s of the same session contract.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod navigation;
pub mod session;

pub use errors::AppError;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
