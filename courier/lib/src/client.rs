//! The per-provider API client.
//!
//! An [`ApiClient`] owns one authentication strategy, a view of its
//! provider's configuration and a transport. Named endpoints are resolved
//! from configuration; raw verb calls take a URL directly. Both paths end in
//! [`ApiClient::send`].

use std::sync::RwLock;
use std::time::Duration;

use tracing::{Span, instrument, warn};

use crate::auth::{AuthStrategy, BearerAuth, HttpAuth, RequestData};
use crate::config::{Credentials, ProviderConfig};
use crate::endpoint::{self, ResolvedEndpoint};
use crate::error::{ApiError, ClientError, ConfigError};
use crate::lock;
use crate::method::HttpMethod;
use crate::response::ApiResponse;
use crate::transport::{ReqwestTransport, Transport};

/// Client for a single API provider.
///
/// Setters take `&self` so a client shared through an `Arc` (as handed out
/// by the [`ClientRegistry`](crate::ClientRegistry)) can still be adjusted.
/// Concurrent setters on one client are not coordinated: the last write wins.
///
/// ## Examples
///
/// ```rust,ignore
/// use courier_lib::{ApiClient, ReqwestTransport};
/// use courier_lib::config::ProviderConfig;
///
/// let client = ApiClient::bearer(ProviderConfig::detached(""), None, ReqwestTransport::new()?);
/// client.with_token("my-token");
///
/// let response = client.get("https://api.example.com/me", Default::default()).await?;
/// println!("{}", response.text());
/// ```
#[derive(Debug)]
pub struct ApiClient<T: Transport = ReqwestTransport> {
    config: ProviderConfig,
    strategy: AuthStrategy,
    request_data: RwLock<RequestData>,
    timeout: RwLock<Option<Duration>>,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    /// Creates a client from an existing strategy.
    pub fn new(config: ProviderConfig, strategy: impl Into<AuthStrategy>, transport: T) -> Self {
        Self {
            config,
            strategy: strategy.into(),
            request_data: RwLock::new(RequestData::new()),
            timeout: RwLock::new(None),
            transport,
        }
    }

    /// Creates a bearer token client, optionally with an explicit token.
    pub fn bearer(config: ProviderConfig, token: Option<String>, transport: T) -> Self {
        let auth = BearerAuth::new(config.clone());
        if let Some(token) = token {
            auth.set_token(token);
        }
        Self::new(config, auth, transport)
    }

    /// Creates an http client, optionally with an explicit type such as
    /// `basic` or `http:query` and explicit credentials.
    pub fn http(
        config: ProviderConfig,
        auth_type: Option<&str>,
        credentials: Option<Credentials>,
        transport: T,
    ) -> Self {
        let auth = HttpAuth::new(config.clone());
        if let Some(auth_type) = auth_type {
            auth.set_authentication_type(auth_type);
        }
        if let Some(credentials) = credentials.filter(|c| !c.is_empty()) {
            auth.set_credentials(credentials);
        }
        Self::new(config, auth, transport)
    }

    /// Returns the provider name. Empty for unnamed clients.
    pub fn provider(&self) -> &str {
        self.config.name()
    }

    /// Returns the provider configuration view.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Returns the authentication strategy.
    pub fn strategy(&self) -> &AuthStrategy {
        &self.strategy
    }

    /// Returns a copy of the stored request data.
    pub fn request_data(&self) -> RequestData {
        lock::read(&self.request_data).clone()
    }

    /// Returns the per-request timeout, if set.
    pub fn timeout(&self) -> Option<Duration> {
        *lock::read(&self.timeout)
    }

    /// Resolves an endpoint without sending anything.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::MissingEndpointConfig`] or
    /// [`ConfigError::BadEndpointConfig`].
    pub fn endpoint(&self, endpoint_name: &str) -> Result<ResolvedEndpoint, ConfigError> {
        endpoint::resolve(&self.config, endpoint_name)
    }

    /// Sets the bearer token. Ignored by http clients.
    pub fn with_token(&self, token: impl Into<String>) -> &Self {
        match self.strategy.as_bearer() {
            Some(auth) => auth.set_token(token),
            None => self.ignored("with_token"),
        }
        self
    }

    /// Sets the http credentials. Ignored by bearer clients.
    pub fn with_credentials(&self, credentials: Credentials) -> &Self {
        match self.strategy.as_http() {
            Some(auth) => auth.set_credentials(credentials),
            None => self.ignored("with_credentials"),
        }
        self
    }

    /// Sets the http authentication type. Ignored by bearer clients.
    pub fn with_authentication_type(&self, auth_type: impl AsRef<str>) -> &Self {
        match self.strategy.as_http() {
            Some(auth) => auth.set_authentication_type(auth_type),
            None => self.ignored("with_authentication_type"),
        }
        self
    }

    /// Sets the timeout handed to the transport with every request.
    pub fn with_timeout(&self, timeout: Duration) -> &Self {
        *lock::write(&self.timeout) = Some(timeout);
        self
    }

    /// Merges `data` into the stored request data. Later keys win.
    pub fn with_data(&self, data: RequestData) -> &Self {
        lock::write(&self.request_data).extend(data);
        self
    }

    /// Replaces the stored request data.
    pub fn set_request_data(&self, data: RequestData) -> &Self {
        *lock::write(&self.request_data) = data;
        self
    }

    /// Calls a configured endpoint.
    ///
    /// The endpoint's method decides whether `data` is sent as query
    /// parameters or as a JSON body. `data` is merged over the stored request
    /// data. The response is returned as-is, whatever its status.
    ///
    /// ## Errors
    ///
    /// Returns an error if the endpoint cannot be resolved, the strategy has
    /// no usable credentials, or the transport fails.
    #[instrument(
        name = "api_call",
        skip(self, data),
        fields(provider = %self.config.name())
    )]
    pub async fn call_endpoint(
        &self,
        endpoint_name: &str,
        data: RequestData,
    ) -> Result<ApiResponse, ApiError> {
        let (url, method) = self.endpoint(endpoint_name)?.into_parts();
        self.send(method, &url, data).await
    }

    /// Sends a GET request with `data` as query parameters.
    ///
    /// ## Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get(&self, url: &str, data: RequestData) -> Result<ApiResponse, ApiError> {
        self.send(HttpMethod::Get, url, data).await
    }

    /// Sends a HEAD request with `data` as query parameters.
    ///
    /// ## Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn head(&self, url: &str, data: RequestData) -> Result<ApiResponse, ApiError> {
        self.send(HttpMethod::Head, url, data).await
    }

    /// Sends a POST request with `data` as a JSON body.
    ///
    /// ## Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post(&self, url: &str, data: RequestData) -> Result<ApiResponse, ApiError> {
        self.send(HttpMethod::Post, url, data).await
    }

    /// Sends a PUT request with `data` as a JSON body.
    ///
    /// ## Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn put(&self, url: &str, data: RequestData) -> Result<ApiResponse, ApiError> {
        self.send(HttpMethod::Put, url, data).await
    }

    /// Sends a PATCH request with `data` as a JSON body.
    ///
    /// ## Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn patch(&self, url: &str, data: RequestData) -> Result<ApiResponse, ApiError> {
        self.send(HttpMethod::Patch, url, data).await
    }

    /// Sends a DELETE request with `data` as a JSON body.
    ///
    /// ## Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete(&self, url: &str, data: RequestData) -> Result<ApiResponse, ApiError> {
        self.send(HttpMethod::Delete, url, data).await
    }

    /// Sends a request with a verb given by name.
    ///
    /// ## Errors
    ///
    /// Returns [`ClientError::BadHttpMethod`] for anything but the six
    /// lowercase verbs, otherwise see [`ApiClient::send`].
    pub async fn dispatch(
        &self,
        verb: &str,
        url: &str,
        data: RequestData,
    ) -> Result<ApiResponse, ApiError> {
        let method = HttpMethod::parse_verb(verb)?;
        self.send(method, url, data).await
    }

    /// Authenticates and sends a request.
    ///
    /// ## Errors
    ///
    /// - [`ClientError::BadRequestUrl`] if `url` is empty
    /// - [`AuthError`](crate::error::AuthError) if the strategy cannot
    ///   authenticate
    /// - [`ClientError`] if the transport fails
    #[instrument(
        name = "api_request",
        skip(self, url, data),
        fields(
            http.method = %method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
        )
    )]
    pub async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        data: RequestData,
    ) -> Result<ApiResponse, ApiError> {
        if url.is_empty() {
            return Err(ClientError::BadRequestUrl.into());
        }
        Span::current().record("http.url", url);

        let mut payload = self.request_data();
        payload.extend(data);

        let mut request = self.strategy.prepare(method, url, payload)?;
        request.timeout = self.timeout();

        let response = self.transport.send(request).await?;
        Span::current().record("http.status_code", response.status());

        Ok(response)
    }

    fn ignored(&self, setter: &str) {
        warn!(
            provider = self.config.name(),
            strategy = self.strategy.name(),
            "{setter} does not apply to this client and was ignored"
        );
    }
}
