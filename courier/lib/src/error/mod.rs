//! Layered error types for the dispatcher.
//!
//! The error hierarchy is structured for actionable diagnostics:
//! - [`ApiError`] - Top-level error type for all dispatcher operations
//! - [`ConfigError`] - Provider and endpoint configuration errors
//! - [`AuthError`] - Missing credentials and unusable authentication types
//! - [`ClientError`] - Request construction and transport errors
//! - [`ValidationError`] - Response decoding errors

mod api_error;
mod auth_error;
mod client_error;
mod config_error;
mod validation_error;

pub use api_error::{ApiError, ErrorKind};
pub use auth_error::AuthError;
pub use client_error::ClientError;
pub use config_error::ConfigError;
pub use validation_error::ValidationError;
