//! Request and response types for the transactional email endpoint.

use serde::{Deserialize, Serialize};

use crate::address::EmailAddress;
use crate::error::Error;

/// Payload for the `POST /v3/smtp/email` endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmtpEmail {
    /// Sender mailbox.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<EmailAddress>,
    /// Primary recipients.
    pub to: Vec<EmailAddress>,
    /// Carbon-copy recipients.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<EmailAddress>,
    /// Blind-carbon-copy recipients.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<EmailAddress>,
    /// Reply-to mailbox.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<EmailAddress>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    /// HTML body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
}

/// Response body for a successfully queued message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSmtpEmail {
    /// Provider-assigned message identifier.
    pub message_id: String,
}

/// Error body returned by the API on a non-success status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. `invalid_parameter`).
    pub code: Option<String>,
    /// Human-readable description.
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Converts the body into an [`Error`] carrying the HTTP status.
    #[must_use]
    pub fn into_error(self, status: u16) -> Error {
        Error::Api {
            status,
            code: self.code,
            message: self
                .message
                .unwrap_or_else(|| format!("HTTP status {status}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    fn minimal_email() -> SendSmtpEmail {
        SendSmtpEmail {
            sender: None,
            to: vec![EmailAddress::parse("user@example.com")],
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: None,
            subject: "Hello".to_string(),
            text_content: None,
            html_content: None,
        }
    }

    #[test]
    fn test_serialize_minimal_payload() {
        let json = serde_json::to_value(minimal_email()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "to": [{"email": "user@example.com"}],
                "subject": "Hello",
            })
        );
    }

    #[test]
    fn test_serialize_full_payload_uses_camel_case() {
        let mut email = minimal_email();
        email.sender = Some(EmailAddress::parse("Support <support@example.com>"));
        email.reply_to = Some(EmailAddress::parse("replies@example.com"));
        email.text_content = Some("plain".to_string());
        email.html_content = Some("<p>html</p>".to_string());

        let json = serde_json::to_value(email).unwrap();
        assert_eq!(json["sender"]["name"], "Support");
        assert_eq!(json["replyTo"]["email"], "replies@example.com");
        assert_eq!(json["textContent"], "plain");
        assert_eq!(json["htmlContent"], "<p>html</p>");
    }

    #[test]
    fn test_deserialize_created_response() {
        let created: CreateSmtpEmail =
            serde_json::from_str(r#"{"messageId":"<202408050001.123@smtp-relay>"}"#).unwrap();
        assert_eq!(created.message_id, "<202408050001.123@smtp-relay>");
    }

    #[test]
    fn test_error_response_into_error() {
        let body: ErrorResponse =
            serde_json::from_str(r#"{"code":"invalid_parameter","message":"bad recipient"}"#)
                .unwrap();
        let error = body.into_error(400);
        assert_eq!(error.status(), Some(400));
        assert_eq!(error.code(), Some("invalid_parameter"));
    }

    #[test]
    fn test_error_response_without_message() {
        let error = ErrorResponse::default().into_error(503);
        assert_eq!(error.status(), Some(503));
        assert!(error.to_string().contains("503"));
    }
}
