//! Bearer token authentication.

use std::sync::RwLock;

use tracing::debug;

use super::{PreparedRequest, RequestData};
use crate::config::ProviderConfig;
use crate::error::AuthError;
use crate::lock;
use crate::method::HttpMethod;

/// Adds `Authorization: Bearer <token>` to every request.
///
/// The token is resolved when a request is prepared: an explicitly set token
/// wins, otherwise `authentication.token` is read from the provider's
/// configuration and remembered on first success.
#[derive(Debug)]
pub struct BearerAuth {
    config: ProviderConfig,
    token: RwLock<Option<String>>,
}

impl BearerAuth {
    /// Creates a strategy that reads its token from configuration.
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            token: RwLock::new(None),
        }
    }

    /// Creates a strategy with an explicit token.
    pub fn with_token(config: ProviderConfig, token: impl Into<String>) -> Self {
        let auth = Self::new(config);
        auth.set_token(token);
        auth
    }

    /// Sets the token used by subsequent requests.
    ///
    /// An empty token clears the override.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        *lock::write(&self.token) = (!token.is_empty()).then_some(token);
    }

    /// Returns the stored token without consulting configuration.
    pub fn stored_token(&self) -> Option<String> {
        lock::read(&self.token).clone()
    }

    /// Returns the token, falling back to configuration.
    ///
    /// ## Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] if neither source has one.
    pub fn token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.stored_token() {
            return Ok(token);
        }

        let token = self
            .config
            .token()
            .ok_or_else(|| AuthError::missing(self.config.name(), "no bearer token found"))?;

        debug!(provider = self.config.name(), "bearer token read from configuration");
        *lock::write(&self.token) = Some(token.clone());
        Ok(token)
    }

    /// Produces an authenticated request.
    ///
    /// ## Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] if no token is available.
    pub fn prepare(
        &self,
        method: HttpMethod,
        url: &str,
        data: RequestData,
    ) -> Result<PreparedRequest, AuthError> {
        let token = self.token()?;
        Ok(PreparedRequest::new(method, url, data)
            .with_header("Authorization", format!("Bearer {token}")))
    }
}
