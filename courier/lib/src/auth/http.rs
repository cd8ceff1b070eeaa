//! HTTP basic and query-parameter authentication.

use std::str::FromStr;
use std::sync::RwLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::debug;

use super::{PreparedRequest, RequestData};
use crate::config::{Credentials, ProviderConfig};
use crate::error::AuthError;
use crate::lock;
use crate::method::HttpMethod;

/// How an [`HttpAuth`] strategy attaches its credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum HttpAuthType {
    /// `Authorization: Basic base64(username:password)`.
    #[default]
    Basic,
    /// Credentials merged into the request data.
    Query,
}

impl HttpAuthType {
    /// Strips a leading `http:` or `http-` prefix, case-insensitively.
    ///
    /// ```rust
    /// use courier_lib::auth::HttpAuthType;
    ///
    /// assert_eq!(HttpAuthType::normalize("http:basic"), "basic");
    /// assert_eq!(HttpAuthType::normalize("HTTP-query"), "query");
    /// assert_eq!(HttpAuthType::normalize("digest"), "digest");
    /// ```
    pub fn normalize(raw: &str) -> &str {
        let raw = raw.trim();
        match raw.get(..5) {
            Some(prefix)
                if prefix.eq_ignore_ascii_case("http:") || prefix.eq_ignore_ascii_case("http-") =>
            {
                &raw[5..]
            }
            _ => raw,
        }
    }
}

/// Authenticates with username/password or with credential parameters.
///
/// Both the authentication type and the credentials are resolved when a
/// request is prepared. Explicitly set values win; otherwise
/// `authentication.type` (default `basic`) and `authentication.credentials`
/// (default empty) are read from the provider's configuration and remembered.
#[derive(Debug)]
pub struct HttpAuth {
    config: ProviderConfig,
    auth_type: RwLock<Option<String>>,
    credentials: RwLock<Credentials>,
}

impl HttpAuth {
    /// Creates a strategy that reads its type and credentials from configuration.
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            auth_type: RwLock::new(None),
            credentials: RwLock::new(Credentials::new()),
        }
    }

    /// Creates a strategy with a fixed authentication type.
    pub fn with_type(config: ProviderConfig, auth_type: HttpAuthType) -> Self {
        let auth = Self::new(config);
        auth.set_authentication_type(auth_type.to_string());
        auth
    }

    /// Sets the authentication type, e.g. `basic`, `query` or `http:basic`.
    ///
    /// The value is validated only when a request is prepared.
    pub fn set_authentication_type(&self, auth_type: impl AsRef<str>) {
        let normalized = HttpAuthType::normalize(auth_type.as_ref()).to_string();
        *lock::write(&self.auth_type) = Some(normalized);
    }

    /// Returns the normalised authentication type, falling back to
    /// configuration and then to `basic`.
    pub fn authentication_type(&self) -> String {
        if let Some(auth_type) = lock::read(&self.auth_type).clone() {
            return auth_type;
        }

        let auth_type = self
            .config
            .authentication_type()
            .map_or_else(
                || HttpAuthType::Basic.to_string(),
                |raw| HttpAuthType::normalize(&raw).to_string(),
            );
        *lock::write(&self.auth_type) = Some(auth_type.clone());
        auth_type
    }

    /// Sets the credentials used by subsequent requests.
    pub fn set_credentials(&self, credentials: Credentials) {
        *lock::write(&self.credentials) = credentials;
    }

    /// Returns the credentials, falling back to configuration.
    pub fn credentials(&self) -> Credentials {
        {
            let stored = lock::read(&self.credentials);
            if !stored.is_empty() {
                return stored.clone();
            }
        }

        let credentials = self.config.credentials();
        if !credentials.is_empty() {
            debug!(provider = self.config.name(), "http credentials read from configuration");
            *lock::write(&self.credentials) = credentials.clone();
        }
        credentials
    }

    /// Produces an authenticated request.
    ///
    /// Basic authentication requires non-empty `username` and `password`.
    /// Query authentication requires at least one credential and merges the
    /// credentials into `data`, letting `data` win on key collisions.
    ///
    /// ## Errors
    ///
    /// - [`AuthError::MissingCredentials`] if the credentials do not satisfy
    ///   the authentication type
    /// - [`AuthError::BadAuthenticationType`] if the type is neither `basic`
    ///   nor `query`
    pub fn prepare(
        &self,
        method: HttpMethod,
        url: &str,
        data: RequestData,
    ) -> Result<PreparedRequest, AuthError> {
        let raw_type = self.authentication_type();
        let auth_type =
            HttpAuthType::from_str(&raw_type).map_err(|_| AuthError::BadAuthenticationType {
                provider: self.config.name().to_string(),
                auth_type: raw_type.clone(),
            })?;
        let credentials = self.credentials();

        match auth_type {
            HttpAuthType::Basic => {
                let field = |name: &str| {
                    credentials
                        .get(name)
                        .filter(|value| !value.is_empty())
                        .cloned()
                };
                let (Some(username), Some(password)) = (field("username"), field("password"))
                else {
                    return Err(AuthError::missing(
                        self.config.name(),
                        "basic authentication needs a username and a password",
                    ));
                };

                let encoded = STANDARD.encode(format!("{username}:{password}"));
                Ok(PreparedRequest::new(method, url, data)
                    .with_header("Authorization", format!("Basic {encoded}")))
            }
            HttpAuthType::Query => {
                if credentials.is_empty() {
                    return Err(AuthError::missing(
                        self.config.name(),
                        "query authentication needs at least one credential",
                    ));
                }

                let mut merged: RequestData = credentials
                    .into_iter()
                    .map(|(key, value)| (key, Value::String(value)))
                    .collect();
                merged.extend(data);
                Ok(PreparedRequest::new(method, url, merged))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ConfigTree;
    use serde_json::json;

    fn config(name: &str) -> ProviderConfig {
        let tree = ConfigTree::new(json!({
            "basicWithCredentials": {
                "authentication": {
                    "type": "http:basic",
                    "credentials": { "username": "me", "password": "my-pass" }
                }
            },
            "basicNoCredentials": { "authentication": { "type": "http:basic" } },
            "queryWithCredentials": {
                "authentication": {
                    "type": "http:query",
                    "credentials": { "key": "my-key", "passphrase": "my-phrase" }
                }
            },
            "queryNoCredentials": { "authentication": { "type": "http:query" } },
            "noAuthentication": { "endpoints": {} },
            "digest": { "authentication": { "type": "http:digest" } }
        }));
        ProviderConfig::new(Arc::new(tree), name)
    }

    fn credentials(pairs: &[(&str, &str)]) -> Credentials {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(HttpAuthType::normalize("http:query"), "query");
        assert_eq!(HttpAuthType::normalize("Http:basic"), "basic");
        assert_eq!(HttpAuthType::normalize("http-basic"), "basic");
        assert_eq!(HttpAuthType::normalize("basic"), "basic");
        assert_eq!(HttpAuthType::normalize("http"), "http");
    }

    #[test]
    fn test_type_from_config() {
        assert_eq!(
            HttpAuth::new(config("queryWithCredentials")).authentication_type(),
            "query"
        );
        assert_eq!(
            HttpAuth::new(config("noAuthentication")).authentication_type(),
            "basic"
        );
    }

    #[test]
    fn test_basic_header() {
        let auth = HttpAuth::new(config("basicWithCredentials"));
        let request = auth
            .prepare(HttpMethod::Post, "http://localhost:1718/sync", RequestData::new())
            .unwrap();

        let expected = format!("Basic {}", STANDARD.encode("me:my-pass"));
        assert_eq!(request.header("Authorization"), Some(expected.as_str()));
        assert_eq!(request.header("Authorization"), Some("Basic bWU6bXktcGFzcw=="));
        assert!(request.data.is_empty());
    }

    #[test]
    fn test_basic_without_credentials_fails() {
        let auth = HttpAuth::new(config("basicNoCredentials"));
        let err = auth
            .prepare(HttpMethod::Get, "http://x", RequestData::new())
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials { .. }));
    }

    #[test]
    fn test_basic_with_empty_password_fails() {
        let auth = HttpAuth::new(config("basicNoCredentials"));
        auth.set_credentials(credentials(&[("username", "me"), ("password", "")]));
        assert!(auth.prepare(HttpMethod::Get, "http://x", RequestData::new()).is_err());
    }

    #[test]
    fn test_explicit_credentials_are_used() {
        let auth = HttpAuth::new(config("basicNoCredentials"));
        auth.set_credentials(credentials(&[("username", "me-too"), ("password", "my-pass-too")]));
        let request = auth
            .prepare(HttpMethod::Get, "http://x", RequestData::new())
            .unwrap();
        let expected = format!("Basic {}", STANDARD.encode("me-too:my-pass-too"));
        assert_eq!(request.header("authorization"), Some(expected.as_str()));
    }

    #[test]
    fn test_query_merges_credentials_without_header() {
        let auth = HttpAuth::new(config("queryWithCredentials"));
        let request = auth
            .prepare(HttpMethod::Get, "http://x", RequestData::new())
            .unwrap();

        assert_eq!(request.header("Authorization"), None);
        assert_eq!(request.data.len(), 2);
        assert_eq!(request.data["key"], json!("my-key"));
        assert_eq!(request.data["passphrase"], json!("my-phrase"));
    }

    #[test]
    fn test_query_data_wins_over_credentials() {
        let auth = HttpAuth::new(config("queryWithCredentials"));
        let mut data = RequestData::new();
        data.insert("key".to_string(), json!("from-data"));
        data.insert("page".to_string(), json!(2));

        let request = auth.prepare(HttpMethod::Get, "http://x", data).unwrap();
        assert_eq!(request.data["key"], json!("from-data"));
        assert_eq!(request.data["passphrase"], json!("my-phrase"));
        assert_eq!(request.data["page"], json!(2));
    }

    #[test]
    fn test_query_without_credentials_fails() {
        let auth = HttpAuth::new(config("queryNoCredentials"));
        let err = auth
            .prepare(HttpMethod::Get, "http://x", RequestData::new())
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials { .. }));
    }

    #[test]
    fn test_unknown_type_fails_at_send_time() {
        let auth = HttpAuth::new(config("digest"));
        assert_eq!(auth.authentication_type(), "digest");
        let err = auth
            .prepare(HttpMethod::Get, "http://x", RequestData::new())
            .unwrap_err();
        assert!(matches!(err, AuthError::BadAuthenticationType { ref auth_type, .. } if auth_type == "digest"));
    }

    #[test]
    fn test_explicit_type_overrides_config() {
        let auth = HttpAuth::with_type(config("basicWithCredentials"), HttpAuthType::Query);
        let request = auth
            .prepare(HttpMethod::Get, "http://x", RequestData::new())
            .unwrap();
        assert_eq!(request.header("Authorization"), None);
        assert_eq!(request.data["username"], json!("me"));
    }

    #[test]
    fn test_set_authentication_type_normalizes() {
        let auth = HttpAuth::new(config("noAuthentication"));
        auth.set_authentication_type("http:query");
        assert_eq!(auth.authentication_type(), "query");
    }
}
