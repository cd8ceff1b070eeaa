//! Provider and endpoint configuration errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors in provider or endpoint configuration.
///
/// Provider-level errors surface when a client is built; endpoint-level
/// errors surface when an endpoint is called. Loading errors come from
/// [`ConfigTree`](crate::config::ConfigTree) constructors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration subtree exists for the provider.
    #[error("Missing config for api provider {provider}")]
    MissingProviderConfig {
        /// The requested provider name.
        provider: String,
    },

    /// The configured authentication type has no client kind.
    #[error(
        "No client type found for authentication method {auth_type} in api provider {provider}"
    )]
    InvalidAuthenticationType {
        /// The provider being built.
        provider: String,
        /// The unrecognised authentication type.
        auth_type: String,
    },

    /// The provider has no entry for the endpoint.
    #[error("Missing endpoint config for api provider {provider}, endpoint {endpoint}")]
    MissingEndpointConfig {
        /// The provider being called.
        provider: String,
        /// The requested endpoint name.
        endpoint: String,
    },

    /// The endpoint entry exists but cannot be used.
    #[error("Bad api endpoint config for provider {provider}, endpoint {endpoint}: {reason}")]
    BadEndpointConfig {
        /// The provider being called.
        provider: String,
        /// The endpoint name.
        endpoint: String,
        /// What is wrong with the entry.
        reason: String,
    },

    /// A configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing failed.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension does not map to a supported format.
    #[error("Unsupported config format for {path}")]
    UnsupportedFormat {
        /// The offending file.
        path: PathBuf,
    },
}

impl ConfigError {
    /// Creates a bad endpoint config error.
    pub fn bad_endpoint(provider: &str, endpoint: &str, reason: impl Into<String>) -> Self {
        Self::BadEndpointConfig {
            provider: provider.to_string(),
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_provider_display() {
        let err = ConfigError::MissingProviderConfig {
            provider: "vipas".to_string(),
        };
        assert_eq!(err.to_string(), "Missing config for api provider vipas");
    }

    #[test]
    fn test_bad_endpoint() {
        let err = ConfigError::bad_endpoint("myHttpClient", "badMethodEndpoint", "bad method bla");
        assert_eq!(
            err.to_string(),
            "Bad api endpoint config for provider myHttpClient, endpoint badMethodEndpoint: bad method bla"
        );
    }

    #[test]
    fn test_invalid_authentication_type() {
        let err = ConfigError::InvalidAuthenticationType {
            provider: "myBadClient".to_string(),
            auth_type: "blabla".to_string(),
        };
        assert!(err.to_string().contains("blabla"));
        assert!(err.to_string().contains("myBadClient"));
    }
}
