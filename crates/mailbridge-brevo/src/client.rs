//! HTTP client for the transactional email endpoint.

use crate::error::Result;
use crate::types::{CreateSmtpEmail, ErrorResponse, SendSmtpEmail};

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://api.brevo.com/v3";

/// Brevo API client.
///
/// Cheap to construct; holds a `reqwest::Client` which pools connections
/// internally. One instance per API key.
#[derive(Debug, Clone)]
pub struct Client {
    api_key: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl Client {
    /// Creates a new client authenticating with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Overrides the API base URL (e.g. to point at a relay or a test
    /// server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sends a transactional email.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`](crate::Error::Api) when the server rejects
    /// the request (the variant carries the HTTP status and the server's
    /// error code) and [`Error::Http`](crate::Error::Http) when the
    /// request itself fails.
    pub async fn send_transac_email(&self, email: &SendSmtpEmail) -> Result<CreateSmtpEmail> {
        let response = self
            .http_client
            .post(format!("{}/smtp/email", self.base_url))
            .header("api-key", &self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Keep the status even when the error body is not decodable.
            let body: ErrorResponse = response.json().await.unwrap_or_default();
            return Err(body.into_error(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = Client::new("xkeysib-test");
        assert_eq!(client.api_key, "xkeysib-test");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_client_with_base_url() {
        let client = Client::new("xkeysib-test").with_base_url("http://localhost:9090/v3");
        assert_eq!(client.base_url, "http://localhost:9090/v3");
    }
}
