//! Error types for the Brevo API client.

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Brevo API error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error response from the API.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code (e.g. 401).
        status: u16,
        /// Machine-readable error code (e.g. `invalid_parameter`).
        code: Option<String>,
        /// Human-readable description from the server.
        message: String,
    },
}

impl Error {
    /// Returns the HTTP status code for API-level errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(_) => None,
        }
    }

    /// Returns the machine-readable error code, if the server sent one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            Self::Http(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_accessors() {
        let error = Error::Api {
            status: 401,
            code: Some("unauthorized".to_string()),
            message: "Key not found".to_string(),
        };
        assert_eq!(error.status(), Some(401));
        assert_eq!(error.code(), Some("unauthorized"));
    }

    #[test]
    fn test_api_error_display() {
        let error = Error::Api {
            status: 429,
            code: None,
            message: "Too many requests".to_string(),
        };
        assert_eq!(error.to_string(), "API error 429: Too many requests");
    }
}
