//! Configuration-driven dispatcher for named HTTP API providers.
//!
//! Given a provider name and an endpoint name, `courier_lib` resolves the
//! authentication strategy, root URL, endpoint path and method from a
//! declarative configuration tree and issues the HTTP call.
//!
//! ## Features
//!
//! - **Provider registry**: Clients are built from configuration on first use
//!   and shared through `Arc`
//! - **Endpoint resolution**: Bare paths or `{ url, method }` records joined
//!   onto a provider's `rootUrl`
//! - **Authentication strategies**: Bearer tokens, HTTP basic, and
//!   credentials sent as request data
//! - **Pluggable transport**: `reqwest` by default, any [`Transport`] in tests
//! - **Layered error handling**: Structured errors with a flat [`ErrorKind`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use courier_lib::ClientRegistry;
//! use courier_lib::config::ConfigTree;
//!
//! let config = ConfigTree::from_yaml_str(r#"
//! mySanctumProvider:
//!   authentication: { type: sanctum, token: my-token }
//!   rootUrl: https://localhost:8080
//!   endpoints:
//!     getTracks: { url: /tracks, method: post }
//! "#)?;
//!
//! let registry = ClientRegistry::new(Arc::new(config))?;
//! let client = registry.get("mySanctumProvider")?;
//!
//! let mut data = serde_json::Map::new();
//! data.insert("id".into(), 15.into());
//! let response = client.call_endpoint("getTracks", data).await?;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod method;
pub mod registry;
pub mod response;
pub mod transport;

mod lock;

// Re-exports for convenience
pub use auth::{AuthStrategy, BearerAuth, HttpAuth, HttpAuthType, PreparedRequest, RequestData};
pub use client::ApiClient;
pub use config::{ConfigSource, ConfigTree, Credentials, ProviderConfig};
pub use endpoint::{EndpointSpec, ResolvedEndpoint};
pub use error::{ApiError, AuthError, ClientError, ConfigError, ErrorKind, ValidationError};
pub use method::HttpMethod;
pub use registry::{AuthenticationType, ClientRegistry};
pub use response::ApiResponse;
pub use transport::{ReqwestTransport, ReqwestTransportBuilder, Transport};
