//! Transport responses.

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::ValidationError;

/// A response as returned by the transport.
///
/// The dispatcher hands responses back unchanged: a non-success status is
/// not an error. The decoding helpers are for callers that want them.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    /// Creates a response from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Returns the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value if it is valid visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Returns the raw body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the body as JSON.
    ///
    /// ## Errors
    ///
    /// Returns [`ValidationError::EmptyBody`] for an empty body and
    /// [`ValidationError::JsonParse`] if the body is not valid for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ValidationError> {
        if self.body.is_empty() {
            return Err(ValidationError::EmptyBody);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}
