//! Settings validation.

use super::model::Settings;

/// Validation error for a submitted settings record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// API key is empty while delivery is enabled.
    MissingApiKey,
    /// Default sender is empty while delivery is enabled.
    MissingDefaultFrom,
    /// Default sender is not a valid email address.
    InvalidDefaultFrom,
    /// Default reply-to is not a valid email address.
    InvalidDefaultReplyTo,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "API key is required when delivery is enabled",
            Self::MissingDefaultFrom => "Default from email is required when delivery is enabled",
            Self::InvalidDefaultFrom | Self::InvalidDefaultReplyTo => "Invalid email format",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "api_key",
            Self::MissingDefaultFrom | Self::InvalidDefaultFrom => "default_from",
            Self::InvalidDefaultReplyTo => "default_reply_to",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a settings record.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate a settings record submitted for update.
///
/// A disabled record is always valid; an enabled record must carry an API
/// key and a well-formed default sender, and a well-formed reply-to if one
/// is set.
///
/// # Errors
///
/// Returns a vector of `ValidationError` with every failed field.
pub fn validate_settings(settings: &Settings) -> ValidationResult {
    let mut errors = Vec::new();

    if settings.enabled {
        if settings.api_key.trim().is_empty() {
            errors.push(ValidationError::MissingApiKey);
        }

        if settings.default_from.trim().is_empty() {
            errors.push(ValidationError::MissingDefaultFrom);
        } else if !is_valid_email(&settings.default_from) {
            errors.push(ValidationError::InvalidDefaultFrom);
        }

        if !settings.default_reply_to.trim().is_empty()
            && !is_valid_email(&settings.default_reply_to)
        {
            errors.push(ValidationError::InvalidDefaultReplyTo);
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Basic email validation: exactly one `@`, a non-blank local part, and a
/// dotted domain, with no whitespace anywhere.
pub(crate) fn is_valid_email(email: &str) -> bool {
    let email = email.trim();

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || local.contains(char::is_whitespace) {
        return false;
    }

    if domain.is_empty() || !domain.contains('.') || domain.contains(char::is_whitespace) {
        return false;
    }

    true
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn enabled_settings() -> Settings {
        Settings {
            enabled: true,
            api_key: "xkeysib-12345678".to_string(),
            default_from: "noreply@example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user.name@example.com"));
        assert!(is_valid_email("user@sub.example.com"));
        assert!(is_valid_email("  user@example.com  "));
    }

    #[test]
    fn test_invalid_email() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("user"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("us er@example.com"));
    }

    #[test]
    fn test_disabled_settings_always_valid() {
        let result = validate_settings(&Settings::default());
        assert!(result.is_ok());
    }

    #[test]
    fn test_enabled_empty_settings_fail_both_required_fields() {
        let settings = Settings {
            enabled: true,
            ..Default::default()
        };
        let errors = validate_settings(&settings).unwrap_err();
        assert!(errors.contains(&ValidationError::MissingApiKey));
        assert!(errors.contains(&ValidationError::MissingDefaultFrom));
    }

    #[test]
    fn test_enabled_complete_settings_pass() {
        assert!(validate_settings(&enabled_settings()).is_ok());
    }

    #[test]
    fn test_malformed_default_from_fails() {
        let mut settings = enabled_settings();
        settings.default_from = "not-an-address".to_string();
        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidDefaultFrom]);
    }

    #[test]
    fn test_malformed_reply_to_fails() {
        let mut settings = enabled_settings();
        settings.default_reply_to = "not-an-address".to_string();
        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidDefaultReplyTo]);
    }

    #[test]
    fn test_empty_reply_to_is_allowed() {
        assert!(validate_settings(&enabled_settings()).is_ok());
    }

    #[test]
    fn test_error_fields_and_messages() {
        assert_eq!(ValidationError::MissingApiKey.field(), "api_key");
        assert_eq!(ValidationError::MissingDefaultFrom.field(), "default_from");
        assert_eq!(ValidationError::InvalidDefaultReplyTo.field(), "default_reply_to");
        assert_eq!(
            ValidationError::MissingApiKey.to_string(),
            "API key is required when delivery is enabled"
        );
    }
}
