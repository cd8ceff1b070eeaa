//! HTTP verbs accepted by provider endpoints.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use crate::error::ClientError;

/// The six HTTP verbs an endpoint or raw call may use.
///
/// Verbs are spelled in lowercase in configuration and parsing is
/// case-sensitive, so `"GET"` is rejected just like `"bla"`.
///
/// ## Examples
///
/// ```rust
/// use courier_lib::HttpMethod;
///
/// let method: HttpMethod = "post".parse().unwrap();
/// assert_eq!(method, HttpMethod::Post);
/// assert!(method.sends_body());
/// assert_eq!(method.to_string(), "post");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum HttpMethod {
    /// HTTP GET - Retrieve a resource.
    #[default]
    Get,
    /// HTTP POST - Create a resource or trigger an action.
    Post,
    /// HTTP PUT - Replace a resource entirely.
    Put,
    /// HTTP PATCH - Partially update a resource.
    Patch,
    /// HTTP DELETE - Remove a resource.
    Delete,
    /// HTTP HEAD - Retrieve headers only.
    Head,
}

impl HttpMethod {
    /// Parses a verb name at a string call boundary.
    ///
    /// ## Errors
    ///
    /// Returns [`ClientError::BadHttpMethod`] for anything outside the
    /// allow-list.
    pub fn parse_verb(verb: &str) -> Result<Self, ClientError> {
        Self::from_str(verb).map_err(|_| ClientError::BadHttpMethod {
            method: verb.to_string(),
        })
    }

    /// Returns `true` if request data travels as a JSON body.
    ///
    /// GET and HEAD carry their data in the query string instead.
    pub fn sends_body(&self) -> bool {
        !matches!(self, Self::Get | Self::Head)
    }

    /// Converts to the equivalent `reqwest::Method`.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
            Self::Head => reqwest::Method::HEAD,
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        method.to_reqwest()
    }
}
