//! # mailbridge-brevo
//!
//! Minimal client for the Brevo transactional email HTTP API.
//!
//! ## Features
//!
//! - **Transactional send**: `POST /v3/smtp/email` with API-key
//!   authentication
//! - **Address parsing**: best-effort parsing of free-form address strings
//!   (`user@example.com`, `Name <user@example.com>`, quoted display names)
//! - **Structured errors**: server rejections carry the HTTP status and the
//!   machine-readable error code for upstream classification
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailbridge_brevo::{Client, EmailAddress, SendSmtpEmail};
//!
//! #[tokio::main]
//! async fn main() -> mailbridge_brevo::Result<()> {
//!     let client = Client::new("xkeysib-...");
//!
//!     let email = SendSmtpEmail {
//!         sender: Some(EmailAddress::parse("Support <support@example.com>")),
//!         to: vec![EmailAddress::parse("user@example.com")],
//!         cc: Vec::new(),
//!         bcc: Vec::new(),
//!         reply_to: None,
//!         subject: "Welcome!".to_string(),
//!         text_content: Some("Thanks for signing up.".to_string()),
//!         html_content: None,
//!     };
//!
//!     let created = client.send_transac_email(&email).await?;
//!     println!("queued as {}", created.message_id);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod client;
mod error;
mod types;

pub use address::EmailAddress;
pub use client::Client;
pub use error::{Error, Result};
pub use types::{CreateSmtpEmail, ErrorResponse, SendSmtpEmail};
