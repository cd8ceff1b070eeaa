//! Request construction and transport errors.

use thiserror::Error;

/// Errors from building or sending a request.
///
/// `BadHttpMethod` and `BadRequestUrl` are detected locally before anything
/// reaches the network. The remaining variants come from the transport.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A verb outside the six supported methods was dispatched.
    #[error("Bad api call method: {method}")]
    BadHttpMethod {
        /// The rejected verb.
        method: String,
    },

    /// A raw verb call was made without a URL.
    #[error("No url for http client request")]
    BadRequestUrl,

    /// The final request URL could not be parsed.
    #[error("Invalid request url {url}: {source}")]
    InvalidUrl {
        /// The URL as composed.
        url: String,
        /// The parser error.
        #[source]
        source: url::ParseError,
    },

    /// A header name or value could not be encoded.
    #[error("Invalid header {name}")]
    InvalidHeader {
        /// The header name.
        name: String,
    },

    /// HTTP request failed due to network or protocol error.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Request exceeded the configured timeout.
    #[error("Request timeout after {duration_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        duration_ms: u64,
    },
}

impl ClientError {
    /// Returns `true` if the request never left the process.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::BadHttpMethod { .. }
                | Self::BadRequestUrl
                | Self::InvalidUrl { .. }
                | Self::InvalidHeader { .. }
        )
    }
}
