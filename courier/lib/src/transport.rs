//! The network transport collaborator.
//!
//! The dispatcher only prepares requests. Sending them is delegated to a
//! [`Transport`], so tests and hosts can substitute their own. The default
//! [`ReqwestTransport`] wraps a pooled `reqwest::Client`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::auth::PreparedRequest;
use crate::error::ClientError;
use crate::response::ApiResponse;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sends prepared requests.
///
/// ## Native Async Traits
///
/// This trait uses native Rust async functions in traits, so clients are
/// generic over their transport rather than boxing it.
///
/// ## Examples
///
/// ```ignore
/// use courier_lib::{ApiResponse, PreparedRequest, Transport};
/// use courier_lib::error::ClientError;
///
/// struct Offline;
///
/// impl Transport for Offline {
///     async fn send(&self, _request: PreparedRequest) -> Result<ApiResponse, ClientError> {
///         Err(ClientError::Timeout { duration_ms: 0 })
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Sends a request and returns the response unchanged.
    ///
    /// GET and HEAD requests carry `data` as query parameters; every other
    /// method sends it as a JSON body. Empty data sends neither.
    ///
    /// ## Errors
    ///
    /// Returns [`ClientError`] if the request cannot be built or fails on the
    /// network. HTTP error statuses are not errors.
    fn send(
        &self,
        request: PreparedRequest,
    ) -> impl std::future::Future<Output = Result<ApiResponse, ClientError>> + Send;
}

/// Builder for configuring a [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    timeout: Duration,
    default_headers: HeaderMap,
}

impl ReqwestTransportBuilder {
    fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: HeaderMap::new(),
        }
    }

    /// Sets the timeout for requests that do not carry their own.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a default header to all requests.
    ///
    /// ## Errors
    ///
    /// Returns [`ClientError::InvalidHeader`] if the header name or value is
    /// invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, ClientError> {
        let (name, value) = header_pair(name.as_ref(), value.as_ref())?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Builds the transport.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ReqwestTransport, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(self.default_headers)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(ReqwestTransport {
            client,
            timeout: self.timeout,
        })
    }
}

/// [`Transport`] backed by a pooled `reqwest::Client`.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a new builder.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::new()
    }

    /// Creates a transport with default settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, ClientError> {
        Self::builder().build()
    }

    /// Wraps an existing client. `timeout` is only used for error reporting.
    pub fn from_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> Result<ApiResponse, ClientError> {
        let url = Url::parse(&request.url).map_err(|source| ClientError::InvalidUrl {
            url: request.url.clone(),
            source,
        })?;

        let mut builder = self.client.request(request.method.to_reqwest(), url);

        for (name, value) in &request.headers {
            let (name, value) = header_pair(name, value)?;
            builder = builder.header(name, value);
        }

        if !request.data.is_empty() {
            builder = if request.method.sends_body() {
                builder.json(&request.data)
            } else {
                builder.query(&request.query_pairs())
            };
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                let duration = request.timeout.unwrap_or(self.timeout);
                ClientError::Timeout {
                    duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                }
            } else {
                ClientError::Request(e)
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(ApiResponse::new(status, headers, body))
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ClientError> {
    let invalid = || ClientError::InvalidHeader {
        name: name.to_string(),
    };
    let header_name = HeaderName::try_from(name).map_err(|_| invalid())?;
    let header_value = HeaderValue::try_from(value).map_err(|_| invalid())?;
    Ok((header_name, header_value))
}
