//! Settings model types.

use serde::{Deserialize, Serialize};

/// Mask prefix shown in place of the real API key.
const MASK_PREFIX: &str = "••••••••";

/// Delivery settings.
///
/// A resolved record always has all five fields defined; the hard default
/// is delivery disabled with every field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Whether real delivery is active. When false, outgoing messages are
    /// logged instead of sent.
    pub enabled: bool,
    /// Provider API key.
    pub api_key: String,
    /// Sender address used when a message carries none.
    pub default_from: String,
    /// Display name attached to senders that carry none.
    pub default_from_name: String,
    /// Reply-to address used when a message carries none.
    pub default_reply_to: String,
}

impl Settings {
    /// Returns a redacted projection safe to hand to any consumer that
    /// must not see the raw credential.
    #[must_use]
    pub fn masked(&self) -> MaskedSettings {
        let api_key = if self.api_key.is_empty() {
            String::new()
        } else {
            format!("{MASK_PREFIX}{}", key_tail(&self.api_key))
        };

        MaskedSettings {
            enabled: self.enabled,
            api_key,
            default_from: self.default_from.clone(),
            default_from_name: self.default_from_name.clone(),
            default_reply_to: self.default_reply_to.clone(),
            has_api_key: !self.api_key.is_empty(),
        }
    }
}

/// Last four characters of the key, or the whole key if shorter.
fn key_tail(api_key: &str) -> &str {
    let tail_start = api_key
        .char_indices()
        .rev()
        .nth(3)
        .map_or(0, |(index, _)| index);
    &api_key[tail_start..]
}

/// Redacted view of [`Settings`] for consumers outside the pipeline.
///
/// Never persisted; recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskedSettings {
    /// Whether real delivery is active.
    pub enabled: bool,
    /// Masked API key: a fixed prefix plus the last four characters of
    /// the real key, or empty when no key is set.
    pub api_key: String,
    /// Sender address used when a message carries none.
    pub default_from: String,
    /// Display name attached to senders that carry none.
    pub default_from_name: String,
    /// Reply-to address used when a message carries none.
    pub default_reply_to: String,
    /// Whether a real API key is stored.
    pub has_api_key: bool,
}

/// Settings candidate from a single configuration source.
///
/// Every field is optional; a candidate qualifies for resolution only
/// when [`is_usable`](Self::is_usable) holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialSettings {
    /// Whether real delivery is active.
    pub enabled: Option<bool>,
    /// Provider API key.
    pub api_key: Option<String>,
    /// Sender address used when a message carries none.
    pub default_from: Option<String>,
    /// Display name attached to senders that carry none.
    pub default_from_name: Option<String>,
    /// Reply-to address used when a message carries none.
    pub default_reply_to: Option<String>,
}

impl PartialSettings {
    /// Whether this candidate carries enough to act as a sender identity:
    /// both the API key and the default sender must be non-blank.
    ///
    /// A half-configured candidate is rejected outright, even when
    /// `enabled` is set.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        let has_key = self
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        let has_from = self
            .default_from
            .as_deref()
            .is_some_and(|from| !from.trim().is_empty());
        has_key && has_from
    }

    /// Merges this candidate over the hard defaults, filling unset fields.
    #[must_use]
    pub fn into_settings(self) -> Settings {
        Settings {
            enabled: self.enabled.unwrap_or_default(),
            api_key: self.api_key.unwrap_or_default(),
            default_from: self.default_from.unwrap_or_default(),
            default_from_name: self.default_from_name.unwrap_or_default(),
            default_reply_to: self.default_reply_to.unwrap_or_default(),
        }
    }

    /// Reads the static-configuration candidate from `MAILBRIDGE_*`
    /// environment variables, field by field. Unset variables stay unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("MAILBRIDGE_ENABLED")
                .ok()
                .map(|value| parse_flag(&value)),
            api_key: std::env::var("MAILBRIDGE_API_KEY").ok(),
            default_from: std::env::var("MAILBRIDGE_DEFAULT_FROM").ok(),
            default_from_name: std::env::var("MAILBRIDGE_DEFAULT_FROM_NAME").ok(),
            default_reply_to: std::env::var("MAILBRIDGE_DEFAULT_REPLY_TO").ok(),
        }
    }
}

impl From<Settings> for PartialSettings {
    fn from(settings: Settings) -> Self {
        Self {
            enabled: Some(settings.enabled),
            api_key: Some(settings.api_key),
            default_from: Some(settings.default_from),
            default_from_name: Some(settings.default_from_name),
            default_reply_to: Some(settings.default_reply_to),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
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

    fn usable() -> PartialSettings {
        PartialSettings {
            enabled: Some(true),
            api_key: Some("xkeysib-12345678".to_string()),
            default_from: Some("noreply@example.com".to_string()),
            ..Default::default()
        }
    }

    mod masking_tests {
        use super::*;

        #[test]
        fn keeps_only_last_four_characters() {
            let settings = Settings {
                api_key: "xkeysib-12345678".to_string(),
                ..Default::default()
            };
            let masked = settings.masked();
            assert_eq!(masked.api_key, "••••••••5678");
            assert!(masked.has_api_key);
        }

        #[test]
        fn short_key_is_kept_whole() {
            let settings = Settings {
                api_key: "abc".to_string(),
                ..Default::default()
            };
            assert_eq!(settings.masked().api_key, "••••••••abc");
        }

        #[test]
        fn empty_key_masks_to_empty() {
            let masked = Settings::default().masked();
            assert_eq!(masked.api_key, "");
            assert!(!masked.has_api_key);
        }

        #[test]
        fn copies_remaining_fields() {
            let settings = Settings {
                enabled: true,
                api_key: "xkeysib-12345678".to_string(),
                default_from: "noreply@example.com".to_string(),
                default_from_name: "Example".to_string(),
                default_reply_to: "replies@example.com".to_string(),
            };
            let masked = settings.masked();
            assert!(masked.enabled);
            assert_eq!(masked.default_from, "noreply@example.com");
            assert_eq!(masked.default_from_name, "Example");
            assert_eq!(masked.default_reply_to, "replies@example.com");
        }
    }

    mod usability_tests {
        use super::*;

        #[test]
        fn complete_candidate_is_usable() {
            assert!(usable().is_usable());
        }

        #[test]
        fn missing_api_key_is_not_usable() {
            let mut candidate = usable();
            candidate.api_key = None;
            assert!(!candidate.is_usable());
        }

        #[test]
        fn blank_api_key_is_not_usable() {
            let mut candidate = usable();
            candidate.api_key = Some("   ".to_string());
            assert!(!candidate.is_usable());
        }

        #[test]
        fn missing_default_from_is_not_usable() {
            let mut candidate = usable();
            candidate.default_from = None;
            assert!(!candidate.is_usable());
        }

        #[test]
        fn enabled_alone_is_not_usable() {
            let candidate = PartialSettings {
                enabled: Some(true),
                ..Default::default()
            };
            assert!(!candidate.is_usable());
        }
    }

    mod merge_tests {
        use super::*;

        #[test]
        fn fills_unset_fields_with_defaults() {
            let settings = usable().into_settings();
            assert!(settings.enabled);
            assert_eq!(settings.api_key, "xkeysib-12345678");
            assert_eq!(settings.default_from, "noreply@example.com");
            assert_eq!(settings.default_from_name, "");
            assert_eq!(settings.default_reply_to, "");
        }

        #[test]
        fn empty_candidate_yields_hard_defaults() {
            assert_eq!(PartialSettings::default().into_settings(), Settings::default());
        }

        #[test]
        fn round_trips_through_partial() {
            let settings = Settings {
                enabled: true,
                api_key: "xkeysib-12345678".to_string(),
                default_from: "noreply@example.com".to_string(),
                default_from_name: "Example".to_string(),
                default_reply_to: "replies@example.com".to_string(),
            };
            let partial = PartialSettings::from(settings.clone());
            assert_eq!(partial.into_settings(), settings);
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn settings_serialize_as_camel_case() {
            let settings = Settings {
                enabled: true,
                api_key: "xkeysib-12345678".to_string(),
                default_from: "noreply@example.com".to_string(),
                ..Default::default()
            };
            let json = serde_json::to_value(&settings).unwrap();
            assert_eq!(json["apiKey"], "xkeysib-12345678");
            assert_eq!(json["defaultFrom"], "noreply@example.com");
        }

        #[test]
        fn partial_record_deserializes_with_missing_fields() {
            let partial: PartialSettings =
                serde_json::from_str(r#"{"apiKey":"xkeysib-12345678"}"#).unwrap();
            assert_eq!(partial.api_key.as_deref(), Some("xkeysib-12345678"));
            assert!(partial.default_from.is_none());
        }
    }

    mod flag_tests {
        use super::*;

        #[test]
        fn truthy_values() {
            assert!(parse_flag("1"));
            assert!(parse_flag("true"));
            assert!(parse_flag("TRUE"));
            assert!(parse_flag("yes"));
            assert!(parse_flag("on"));
        }

        #[test]
        fn falsy_values() {
            assert!(!parse_flag("0"));
            assert!(!parse_flag("false"));
            assert!(!parse_flag(""));
            assert!(!parse_flag("enabled"));
        }
    }
}
