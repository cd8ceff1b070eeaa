//! Endpoint resolution.
//!
//! An endpoint entry in a provider's configuration is either a bare path
//! (always a GET) or a `{ url, method }` record. [`resolve`] turns that entry
//! and the provider's `rootUrl` into a validated [`ResolvedEndpoint`].

use std::str::FromStr;

use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::ConfigError;
use crate::method::HttpMethod;

/// The raw shape of an endpoint entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointSpec {
    /// A bare path, requested with GET.
    Path(String),
    /// A structured record. Both fields are validated during resolution.
    Detailed {
        /// Path or absolute URL of the endpoint.
        url: Option<String>,
        /// Verb name; GET when absent.
        method: Option<String>,
    },
}

impl EndpointSpec {
    /// Reads an endpoint entry from its configuration value.
    ///
    /// Returns `None` for values that are neither a string nor a record.
    /// A non-string `url` reads as missing, and a non-string `method` is kept
    /// in its JSON form so that resolution rejects it.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(path) => Some(Self::Path(path.clone())),
            Value::Object(map) => {
                let url = map.get("url").and_then(Value::as_str).map(str::to_string);
                let method = match map.get("method") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(method)) => Some(method.clone()),
                    Some(other) => Some(other.to_string()),
                };
                Some(Self::Detailed { url, method })
            }
            _ => None,
        }
    }
}

/// A validated endpoint: a non-empty URL and one of the six verbs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    url: String,
    method: HttpMethod,
}

impl ResolvedEndpoint {
    /// Returns the composed URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Splits into `(url, method)`.
    pub fn into_parts(self) -> (String, HttpMethod) {
        (self.url, self.method)
    }
}

/// Resolves an endpoint of a provider from configuration.
///
/// ## Errors
///
/// - [`ConfigError::MissingEndpointConfig`] if the provider has no entry for
///   `endpoint_name`
/// - [`ConfigError::BadEndpointConfig`] if the entry has no usable URL or an
///   unsupported method
pub fn resolve(
    provider: &ProviderConfig,
    endpoint_name: &str,
) -> Result<ResolvedEndpoint, ConfigError> {
    let value =
        provider
            .endpoint(endpoint_name)
            .ok_or_else(|| ConfigError::MissingEndpointConfig {
                provider: provider.name().to_string(),
                endpoint: endpoint_name.to_string(),
            })?;

    let spec = EndpointSpec::from_value(&value).ok_or_else(|| {
        ConfigError::bad_endpoint(
            provider.name(),
            endpoint_name,
            "entry must be a path or a { url, method } record",
        )
    })?;

    resolve_spec(provider.name(), endpoint_name, &provider.root_url(), &spec)
}

/// Resolves an already parsed endpoint entry against a root url.
///
/// ## Errors
///
/// Returns [`ConfigError::BadEndpointConfig`] if the URL is missing or empty
/// after composition, or the method is not one of the six verbs.
pub fn resolve_spec(
    provider_name: &str,
    endpoint_name: &str,
    root_url: &str,
    spec: &EndpointSpec,
) -> Result<ResolvedEndpoint, ConfigError> {
    let (path, method) = match spec {
        EndpointSpec::Path(path) => (path.as_str(), HttpMethod::Get),
        EndpointSpec::Detailed { url, method } => {
            let path = url
                .as_deref()
                .filter(|url| !url.is_empty())
                .ok_or_else(|| ConfigError::bad_endpoint(provider_name, endpoint_name, "bad url"))?;

            let method = match method.as_deref() {
                None => HttpMethod::Get,
                Some(name) => HttpMethod::from_str(name).map_err(|_| {
                    ConfigError::bad_endpoint(
                        provider_name,
                        endpoint_name,
                        format!("bad method {name}"),
                    )
                })?,
            };
            (path, method)
        }
    };

    let url = compose_url([root_url, path]);
    if url.is_empty() {
        return Err(ConfigError::bad_endpoint(
            provider_name,
            endpoint_name,
            "url is empty",
        ));
    }

    Ok(ResolvedEndpoint { url, method })
}

/// Joins url parts with a single `/`.
///
/// Each part is trimmed of leading and trailing slashes and empty parts are
/// dropped. Schemes are not detected, so an absolute endpoint URL behind a
/// non-empty root is appended like any other path.
///
/// ## Examples
///
/// ```rust
/// use courier_lib::endpoint::compose_url;
///
/// assert_eq!(compose_url(["https://localhost:8080/", "/tracks/"]), "https://localhost:8080/tracks");
/// assert_eq!(compose_url(["", "http://localhost:1617/positions"]), "http://localhost:1617/positions");
/// ```
pub fn compose_url<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|part| part.trim_matches('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
