//! Email delivery services.
//!
//! This module provides the send pipeline that bridges resolved settings
//! with the provider API client.

pub mod send;

pub use send::{Mailer, OutgoingEmail, SendError};
