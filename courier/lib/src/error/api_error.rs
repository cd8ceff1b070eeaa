//! Top-level API error type.

use super::{AuthError, ClientError, ConfigError, ValidationError};
use thiserror::Error;

/// Top-level error type for all dispatcher operations.
///
/// This enum aggregates all error categories, enabling unified error handling
/// while preserving the ability to match on specific error types when needed.
/// Use [`ApiError::kind`] to branch on the failure kind without matching the
/// nested enums.
///
/// ## Examples
///
/// ```rust,ignore
/// use courier_lib::error::{ApiError, ErrorKind};
///
/// fn handle_error(err: ApiError) {
///     match err.kind() {
///         ErrorKind::MissingCredentials => eprintln!("set a token first: {err}"),
///         ErrorKind::MissingEndpointConfig => eprintln!("unknown endpoint: {err}"),
///         _ => eprintln!("call failed: {err}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request construction and transport errors.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Response decoding errors.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Authentication errors detected before a request is sent.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Provider and endpoint configuration errors.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Flat classification of every [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The provider has no configuration.
    MissingProviderConfig,
    /// The provider's `authentication.type` is not a known type.
    InvalidAuthenticationType,
    /// The named endpoint is not configured.
    MissingEndpointConfig,
    /// An endpoint entry has no usable URL or method.
    BadEndpointConfig,
    /// No bearer token or http credentials are available.
    MissingCredentials,
    /// An http client's type is neither basic nor query.
    BadAuthenticationType,
    /// The verb is not one of the six lowercase HTTP verbs.
    BadHttpMethod,
    /// Bad request URL, network failure or timeout.
    Transport,
    /// A response body could not be decoded.
    Decode,
    /// A configuration file could not be read or parsed.
    Load,
}

impl ApiError {
    /// Returns the failure kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(e) => match e {
                ConfigError::MissingProviderConfig { .. } => ErrorKind::MissingProviderConfig,
                ConfigError::InvalidAuthenticationType { .. } => {
                    ErrorKind::InvalidAuthenticationType
                }
                ConfigError::MissingEndpointConfig { .. } => ErrorKind::MissingEndpointConfig,
                ConfigError::BadEndpointConfig { .. } => ErrorKind::BadEndpointConfig,
                ConfigError::Io { .. }
                | ConfigError::Yaml(_)
                | ConfigError::Toml(_)
                | ConfigError::Json(_)
                | ConfigError::UnsupportedFormat { .. } => ErrorKind::Load,
            },
            Self::Auth(e) => match e {
                AuthError::MissingCredentials { .. } => ErrorKind::MissingCredentials,
                AuthError::BadAuthenticationType { .. } => ErrorKind::BadAuthenticationType,
            },
            Self::Client(ClientError::BadHttpMethod { .. }) => ErrorKind::BadHttpMethod,
            Self::Client(_) => ErrorKind::Transport,
            Self::Validation(_) => ErrorKind::Decode,
        }
    }
}
