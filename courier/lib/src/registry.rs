//! Provider client registry.
//!
//! The registry maps provider names to shared [`ApiClient`] instances. A
//! client is built from configuration on first use and cached until it is
//! rebuilt with [`ClientRegistry::make`] or removed.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use strum::{Display, EnumString};
use tracing::debug;

use crate::client::ApiClient;
use crate::config::{AUTHENTICATION_TYPE_KEY, ConfigSource, Credentials, ProviderConfig};
use crate::error::{ClientError, ConfigError};
use crate::lock;
use crate::transport::{ReqwestTransport, Transport};

/// The `authentication.type` values a provider may declare.
///
/// `sanctum` is accepted as an alias of `bearer`, and both `http-` and
/// `http:` spellings are accepted for the http types. A provider without a
/// type uses [`AuthenticationType::HttpBasic`]; an empty or non-string type
/// is rejected.
///
/// ```rust
/// use courier_lib::AuthenticationType;
///
/// assert_eq!("sanctum".parse::<AuthenticationType>().unwrap(), AuthenticationType::Bearer);
/// assert_eq!("http:query".parse::<AuthenticationType>().unwrap(), AuthenticationType::HttpQuery);
/// assert!("digest".parse::<AuthenticationType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
pub enum AuthenticationType {
    /// Bearer token client.
    #[strum(to_string = "bearer", serialize = "sanctum")]
    Bearer,
    /// Http client using basic authentication.
    #[default]
    #[strum(to_string = "http-basic", serialize = "http:basic")]
    HttpBasic,
    /// Http client sending credentials as request data.
    #[strum(to_string = "http-query", serialize = "http:query")]
    HttpQuery,
}

/// Lazily built, shared clients keyed by provider name.
///
/// Lookups take a read lock; building a missing client happens outside any
/// lock, so two concurrent first calls may both build, and the first insert
/// wins.
///
/// ## Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use courier_lib::ClientRegistry;
/// use courier_lib::config::ConfigTree;
///
/// let registry = ClientRegistry::new(Arc::new(ConfigTree::load("providers.yaml")?))?;
/// let client = registry.get("mySanctumProvider")?;
/// let response = client.call_endpoint("getTracks", Default::default()).await?;
/// ```
pub struct ClientRegistry<T: Transport + Clone = ReqwestTransport> {
    config: Arc<dyn ConfigSource>,
    transport: T,
    clients: RwLock<HashMap<String, Arc<ApiClient<T>>>>,
}

impl<T: Transport + Clone> fmt::Debug for ClientRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("providers", &self.providers())
            .finish_non_exhaustive()
    }
}

impl ClientRegistry<ReqwestTransport> {
    /// Creates a registry sending through a default [`ReqwestTransport`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: Arc<dyn ConfigSource>) -> Result<Self, ClientError> {
        Ok(Self::with_transport(config, ReqwestTransport::new()?))
    }
}

impl<T: Transport + Clone> ClientRegistry<T> {
    /// Creates a registry whose clients share clones of `transport`.
    pub fn with_transport(config: Arc<dyn ConfigSource>, transport: T) -> Self {
        Self {
            config,
            transport,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached client for `provider`, building it on first use.
    ///
    /// ## Errors
    ///
    /// - [`ConfigError::MissingProviderConfig`] if the provider has no
    ///   configuration
    /// - [`ConfigError::InvalidAuthenticationType`] if its
    ///   `authentication.type` is not supported
    pub fn get(&self, provider: &str) -> Result<Arc<ApiClient<T>>, ConfigError> {
        if let Some(client) = lock::read(&self.clients).get(provider) {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(self.build(provider)?);
        let mut clients = lock::write(&self.clients);
        let entry = clients.entry(provider.to_string()).or_insert(client);
        Ok(Arc::clone(entry))
    }

    /// Builds a fresh client for `provider`, replacing any cached one.
    ///
    /// ## Errors
    ///
    /// Same as [`ClientRegistry::get`].
    pub fn make(&self, provider: &str) -> Result<Arc<ApiClient<T>>, ConfigError> {
        let client = Arc::new(self.build(provider)?);
        self.insert(provider, Arc::clone(&client));
        Ok(client)
    }

    /// Returns `true` if a client for `provider` is cached.
    pub fn exists(&self, provider: &str) -> bool {
        lock::read(&self.clients).contains_key(provider)
    }

    /// Builds a bearer client without consulting `authentication.type`.
    ///
    /// The client is cached when a provider name is given. Without one it
    /// reads nothing from configuration and needs an explicit token.
    pub fn bearer_client(&self, provider: Option<&str>, token: Option<String>) -> Arc<ApiClient<T>> {
        let client = Arc::new(ApiClient::bearer(
            self.provider_config(provider.unwrap_or_default()),
            token.filter(|t| !t.is_empty()),
            self.transport.clone(),
        ));
        if let Some(provider) = provider {
            self.insert(provider, Arc::clone(&client));
        }
        client
    }

    /// Builds an http client without consulting the lookup table.
    ///
    /// `auth_type` is validated when the first request is prepared. The
    /// client is cached when a provider name is given.
    pub fn http_client(
        &self,
        provider: Option<&str>,
        auth_type: Option<&str>,
        credentials: Option<Credentials>,
    ) -> Arc<ApiClient<T>> {
        let client = Arc::new(ApiClient::http(
            self.provider_config(provider.unwrap_or_default()),
            auth_type.filter(|t| !t.is_empty()),
            credentials,
            self.transport.clone(),
        ));
        if let Some(provider) = provider {
            self.insert(provider, Arc::clone(&client));
        }
        client
    }

    /// Caches `client` under `provider`, replacing any existing entry.
    pub fn insert(&self, provider: &str, client: Arc<ApiClient<T>>) {
        lock::write(&self.clients).insert(provider.to_string(), client);
    }

    /// Removes and returns the cached client for `provider`.
    pub fn remove(&self, provider: &str) -> Option<Arc<ApiClient<T>>> {
        lock::write(&self.clients).remove(provider)
    }

    /// Returns the names of all cached providers, sorted.
    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = lock::read(&self.clients).keys().cloned().collect();
        names.sort();
        names
    }

    fn provider_config(&self, provider: &str) -> ProviderConfig {
        ProviderConfig::new(Arc::clone(&self.config), provider)
    }

    fn build(&self, provider: &str) -> Result<ApiClient<T>, ConfigError> {
        let config = self.provider_config(provider);
        if !config.exists() {
            return Err(ConfigError::MissingProviderConfig {
                provider: provider.to_string(),
            });
        }

        let invalid = |auth_type: String| ConfigError::InvalidAuthenticationType {
            provider: provider.to_string(),
            auth_type,
        };
        let auth_type = match config.get(AUTHENTICATION_TYPE_KEY) {
            None => AuthenticationType::default(),
            Some(Value::String(raw)) => {
                AuthenticationType::from_str(&raw).map_err(|_| invalid(raw.clone()))?
            }
            Some(other) => return Err(invalid(other.to_string())),
        };

        debug!(provider, auth_type = %auth_type, "building api client");

        let transport = self.transport.clone();
        Ok(match auth_type {
            AuthenticationType::Bearer => ApiClient::bearer(config, None, transport),
            AuthenticationType::HttpBasic => ApiClient::http(config, Some("basic"), None, transport),
            AuthenticationType::HttpQuery => ApiClient::http(config, Some("query"), None, transport),
        })
    }
}
