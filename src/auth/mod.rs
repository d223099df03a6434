//! Account flows: login, registration with automatic sign-in, logout and the
//! current-user profile.

pub mod client;
pub mod types;

pub use client::AuthService;
pub use types::{LoginRequest, RegisterRequest, UserProfile};
