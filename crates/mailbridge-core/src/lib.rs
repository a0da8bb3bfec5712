//! # mailbridge-core
//!
//! Core business logic for Mailbridge transactional email delivery.
//!
//! This crate provides:
//! - Delivery settings with layered resolution (persisted store, static
//!   configuration, hard defaults)
//! - Settings validation and a masked projection that never exposes the
//!   API key
//! - The send pipeline: log-only fallback when delivery is disabled,
//!   payload assembly with sender/reply-to defaulting, and a stable error
//!   taxonomy over provider failures

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod service;
pub mod settings;

pub use error::{Error, Result};
pub use service::{Mailer, OutgoingEmail, SendError};
pub use settings::{
    MaskedSettings, PartialSettings, Settings, SettingsResolver, SettingsStore,
    SqliteSettingsStore, ValidationError, ValidationResult, validate_settings,
};
