//! Authentication errors.

use thiserror::Error;

/// Errors detected while attaching credentials to a request.
///
/// Both variants surface at send time, after any lazy configuration lookup
/// has already been attempted.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token or credentials required by the strategy are absent.
    #[error("Missing credentials for api provider {provider}: {reason}")]
    MissingCredentials {
        /// The provider whose client attempted the call.
        provider: String,
        /// Which credential was missing.
        reason: String,
    },

    /// The strategy holds an authentication type it cannot apply.
    #[error("Invalid authentication type {auth_type} for http client of api provider {provider}")]
    BadAuthenticationType {
        /// The provider whose client attempted the call.
        provider: String,
        /// The offending type after normalisation.
        auth_type: String,
    },
}

impl AuthError {
    /// Creates a missing credentials error.
    pub fn missing(provider: &str, reason: impl Into<String>) -> Self {
        Self::MissingCredentials {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_display() {
        let err = AuthError::missing("mySanctumProvider", "no bearer token");
        assert_eq!(
            err.to_string(),
            "Missing credentials for api provider mySanctumProvider: no bearer token"
        );
    }

    #[test]
    fn test_bad_authentication_type_display() {
        let err = AuthError::BadAuthenticationType {
            provider: "vipas".to_string(),
            auth_type: "digest".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid authentication type digest for http client of api provider vipas"
        );
    }
}
