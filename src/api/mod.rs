//! Backend access: the request decorator, the response interceptor, and the
//! client that chains them around `reqwest`.

pub mod client;
pub mod decorator;
pub mod interceptor;

pub use client::ApiClient;
pub use decorator::{authorization_headers, is_backend_url};
pub use interceptor::{intercept, RawResponse};
