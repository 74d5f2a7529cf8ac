//! Transport layer for the authentication backend: configuration, the HTTP
//! wrapper that attaches and invalidates the bearer token, and the error type
//! every request surfaces. Nothing here keeps session state; the token is read
//! from the store on each request and is never logged.

pub mod api;
pub mod config;
pub mod errors;

pub use api::ApiClient;
pub use config::{AppConfig, Environment};
pub use errors::{AppError, FieldError};
