//! Authentication strategies.
//!
//! A strategy turns a logical request (method, url, data) into a
//! [`PreparedRequest`] that a [`Transport`](crate::transport::Transport) can
//! send. Two strategies exist:
//!
//! - [`BearerAuth`] adds `Authorization: Bearer <token>`
//! - [`HttpAuth`] adds `Authorization: Basic ...` or merges credentials into
//!   the request data, depending on its [`HttpAuthType`]
//!
//! Credentials are resolved lazily when a request is prepared, so values set
//! after construction are honoured by the next call.

mod bearer;
mod http;

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::{Map, Value};

pub use bearer::BearerAuth;
pub use http::{HttpAuth, HttpAuthType};

use crate::error::AuthError;
use crate::method::HttpMethod;

/// Request payload: query parameters for GET/HEAD, a JSON body otherwise.
pub type RequestData = Map<String, Value>;

/// A fully authenticated request, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The final URL, before query parameters are appended.
    pub url: String,
    /// Headers to send, keyed by their canonical spelling.
    pub headers: BTreeMap<String, String>,
    /// The final payload.
    pub data: RequestData,
    /// Per-request timeout handed to the transport.
    pub timeout: Option<Duration>,
}

impl PreparedRequest {
    /// Creates an unauthenticated request.
    pub fn new(method: HttpMethod, url: impl Into<String>, data: RequestData) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            data,
            timeout: None,
        }
    }

    /// Adds or replaces a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns a header value, matching the name case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Flattens the payload into query pairs.
    ///
    /// Strings are sent as-is, other scalars in their JSON spelling, nulls as
    /// empty values and nested values as JSON text.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.data
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

/// The authentication strategy owned by an [`ApiClient`](crate::ApiClient).
#[derive(Debug)]
pub enum AuthStrategy {
    /// Bearer token authentication.
    Bearer(BearerAuth),
    /// Basic or query-parameter authentication.
    Http(HttpAuth),
}

impl AuthStrategy {
    /// Produces an authenticated request.
    ///
    /// ## Errors
    ///
    /// - [`AuthError::MissingCredentials`] if the token or credentials are
    ///   absent after the configuration fallback
    /// - [`AuthError::BadAuthenticationType`] if an http strategy holds an
    ///   unknown type
    pub fn prepare(
        &self,
        method: HttpMethod,
        url: &str,
        data: RequestData,
    ) -> Result<PreparedRequest, AuthError> {
        match self {
            Self::Bearer(auth) => auth.prepare(method, url, data),
            Self::Http(auth) => auth.prepare(method, url, data),
        }
    }

    /// Returns a short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bearer(_) => "bearer",
            Self::Http(_) => "http",
        }
    }

    /// Returns the bearer strategy, if this is one.
    pub fn as_bearer(&self) -> Option<&BearerAuth> {
        match self {
            Self::Bearer(auth) => Some(auth),
            Self::Http(_) => None,
        }
    }

    /// Returns the http strategy, if this is one.
    pub fn as_http(&self) -> Option<&HttpAuth> {
        match self {
            Self::Http(auth) => Some(auth),
            Self::Bearer(_) => None,
        }
    }
}

impl From<BearerAuth> for AuthStrategy {
    fn from(auth: BearerAuth) -> Self {
        Self::Bearer(auth)
    }
}

impl From<HttpAuth> for AuthStrategy {
    fn from(auth: HttpAuth) -> Self {
        Self::Http(auth)
    }
}
