//! Configuration tree lookups.
//!
//! The dispatcher never owns its configuration. It reads from a
//! [`ConfigSource`], a dotted-path key lookup over a JSON-like tree keyed by
//! provider name. [`ConfigTree`] is the bundled implementation and can be
//! loaded from YAML, TOML or JSON. [`ProviderConfig`] narrows a source to a
//! single provider.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;

/// Credentials attached by the http strategies, e.g. `username`/`password`.
pub type Credentials = BTreeMap<String, String>;

/// Key of the authentication type within a provider subtree.
pub const AUTHENTICATION_TYPE_KEY: &str = "authentication.type";
/// Key of the bearer token within a provider subtree.
pub const AUTHENTICATION_TOKEN_KEY: &str = "authentication.token";
/// Key of the http credentials within a provider subtree.
pub const AUTHENTICATION_CREDENTIALS_KEY: &str = "authentication.credentials";
/// Key of the root url within a provider subtree.
pub const ROOT_URL_KEY: &str = "rootUrl";
/// Key of the endpoint table within a provider subtree.
pub const ENDPOINTS_KEY: &str = "endpoints";

/// Matches `${NAME}` environment placeholders in string values.
static ENV_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid env placeholder regex")
});

/// Read-only key/value source for provider configuration.
///
/// Keys use dotted-path semantics: `"myProvider.authentication.type"`.
/// Implementations must return `None` for explicit `null` values so that
/// callers can treat "absent" and "null" the same way.
pub trait ConfigSource: Send + Sync {
    /// Looks up the value at a dotted path.
    fn get(&self, key: &str) -> Option<Value>;
}

/// A configuration tree backed by a `serde_json::Value`.
///
/// String values of the form `${NAME}` are replaced with the value of the
/// environment variable `NAME` when the tree is constructed. A string that is
/// exactly one unset placeholder becomes `null`; placeholders embedded in
/// longer strings expand to the empty string.
///
/// ## Examples
///
/// ```rust
/// use courier_lib::config::{ConfigSource, ConfigTree};
///
/// let tree = ConfigTree::from_yaml_str(r#"
/// myProvider:
///   rootUrl: https://localhost:8080
///   endpoints:
///     getPositions: /positions
/// "#).unwrap();
///
/// assert_eq!(
///     tree.get("myProvider.endpoints.getPositions"),
///     Some(serde_json::json!("/positions"))
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigTree {
    root: Value,
}

impl ConfigTree {
    /// Creates a tree from an in-memory value, expanding `${VAR}` placeholders.
    pub fn new(root: Value) -> Self {
        Self {
            root: expand_env(root),
        }
    }

    /// Parses a YAML document.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the document is not valid YAML.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_yaml::from_str(content)?;
        Ok(Self::new(root))
    }

    /// Parses a TOML document.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is not valid TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let root: Value = toml::from_str(content)?;
        Ok(Self::new(root))
    }

    /// Parses a JSON document.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Json`] if the document is not valid JSON.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_json::from_str(content)?;
        Ok(Self::new(root))
    }

    /// Loads a configuration file, picking the format from its extension
    /// (`yaml`, `yml`, `toml` or `json`).
    ///
    /// ## Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown extension
    /// or fails to parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str,
            Some("toml") => Self::from_toml_str,
            Some("json") => Self::from_json_str,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "loading provider configuration");
        parse(&content)
    }

    /// Returns the value at a dotted path without cloning.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in key.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        (!current.is_null()).then_some(current)
    }

    /// Returns the names of the top-level entries (the configured providers).
    pub fn providers(&self) -> Vec<String> {
        match &self.root {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

impl ConfigSource for ConfigTree {
    fn get(&self, key: &str) -> Option<Value> {
        self.lookup(key).cloned()
    }
}

/// Configuration of a single provider, read lazily from a shared source.
///
/// A provider with an empty name never finds any value; this is how clients
/// built without a provider behave.
#[derive(Clone)]
pub struct ProviderConfig {
    name: String,
    source: Arc<dyn ConfigSource>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ProviderConfig {
    /// Creates a view of `name` within `source`.
    pub fn new(source: Arc<dyn ConfigSource>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Creates a view with no backing configuration.
    pub fn detached(name: impl Into<String>) -> Self {
        Self::new(Arc::new(ConfigTree::default()), name)
    }

    /// Returns the provider name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the backing source.
    pub fn source(&self) -> &Arc<dyn ConfigSource> {
        &self.source
    }

    /// Looks up a dotted key relative to this provider.
    pub fn get(&self, key: &str) -> Option<Value> {
        if self.name.is_empty() {
            return None;
        }
        self.source.get(&format!("{}.{key}", self.name))
    }

    /// Returns `true` if the provider has a non-empty configuration subtree.
    pub fn exists(&self) -> bool {
        if self.name.is_empty() {
            return false;
        }
        match self.source.get(&self.name) {
            None => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Bool(flag)) => flag,
            Some(_) => true,
        }
    }

    /// Returns a non-empty scalar value as a string.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).as_ref().and_then(scalar_to_string)
    }

    /// Returns the root url, or an empty string when unset.
    pub fn root_url(&self) -> String {
        self.get_string(ROOT_URL_KEY).unwrap_or_default()
    }

    /// Returns the raw configuration entry of an endpoint.
    pub fn endpoint(&self, endpoint_name: &str) -> Option<Value> {
        self.get(&format!("{ENDPOINTS_KEY}.{endpoint_name}"))
    }

    /// Returns the names of all configured endpoints.
    pub fn endpoint_names(&self) -> Vec<String> {
        match self.get(ENDPOINTS_KEY) {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Returns the configured authentication type, if any.
    pub fn authentication_type(&self) -> Option<String> {
        self.get_string(AUTHENTICATION_TYPE_KEY)
    }

    /// Returns the configured bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.get_string(AUTHENTICATION_TOKEN_KEY)
    }

    /// Returns the configured http credentials, or an empty mapping.
    ///
    /// Scalar values are stringified; nulls and nested values are skipped.
    pub fn credentials(&self) -> Credentials {
        match self.get(AUTHENTICATION_CREDENTIALS_KEY) {
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(key, value)| Some((key.clone(), scalar_to_string(value)?)))
                .collect(),
            _ => Credentials::new(),
        }
    }
}

/// Converts a scalar to a non-empty string.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn expand_env(value: Value) -> Value {
    match value {
        Value::String(s) => expand_env_string(s),
        Value::Array(items) => Value::Array(items.into_iter().map(expand_env).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, expand_env(value)))
                .collect(),
        ),
        other => other,
    }
}

fn expand_env_string(s: String) -> Value {
    if !s.contains("${") {
        return Value::String(s);
    }

    if let Some(caps) = ENV_PLACEHOLDER.captures(&s) {
        if caps.get(0).is_some_and(|m| m.as_str().len() == s.len()) {
            return std::env::var(&caps[1]).map_or(Value::Null, Value::String);
        }
    }

    let expanded = ENV_PLACEHOLDER.replace_all(&s, |caps: &Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_default()
    });
    Value::String(expanded.into_owned())
}
