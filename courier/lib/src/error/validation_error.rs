//! Response decoding errors.

use thiserror::Error;

/// Errors raised by the decoding helpers on
/// [`ApiResponse`](crate::response::ApiResponse).
///
/// The dispatcher itself never decodes responses; these only occur when a
/// caller asks for a typed body.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Empty response body when content was expected.
    #[error("Empty response body")]
    EmptyBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_parse_display() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = ValidationError::from(source);
        assert!(err.to_string().starts_with("JSON parse error"));
    }

    #[test]
    fn test_empty_body_display() {
        assert_eq!(ValidationError::EmptyBody.to_string(), "Empty response body");
    }
}
