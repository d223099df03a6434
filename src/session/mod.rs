//! Session core: persisted credentials, token shapes, and the shared auth
//! state built on top of them. Token material flowing through this module is
//! wrapped in `SecretString` and must never be logged.

pub mod state;
pub mod store;
pub mod token;

pub use state::Session;
pub use store::{CredentialStore, FileStore, MemoryStore};
pub use token::{AuthScheme, AuthVariant, SessionToken};
