//! Delivery settings management.
//!
//! Provides the settings model, persistence, layered resolution, and
//! validation.

mod model;
mod resolver;
mod store;
mod validation;

pub use model::{MaskedSettings, PartialSettings, Settings};
pub use resolver::SettingsResolver;
pub use store::{SettingsStore, SqliteSettingsStore};
pub use validation::{ValidationError, ValidationResult, validate_settings};

pub(crate) use validation::is_valid_email;
