//! Email address types and free-form parsing.

use serde::{Deserialize, Serialize};

/// Email address with optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Address part (`user@example.com`).
    pub email: String,
    /// Display name, if one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EmailAddress {
    /// Parses a free-form address string, best effort.
    ///
    /// Accepts a bare address (`user@example.com`) or a display form
    /// (`Name <user@example.com>`, `"Name" <user@example.com>`,
    /// `Name user@example.com`). Input that fits neither form is passed
    /// through whole as the address, so callers never fail here; format
    /// validation is a separate concern.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        // Bracketed form: the address sits inside the last <...> pair,
        // anything before it is the display name.
        if let Some(open) = trimmed.rfind('<') {
            let address = trimmed[open + 1..].trim_end_matches('>').trim();
            return Self {
                email: address.to_string(),
                name: clean_name(&trimmed[..open]),
            };
        }

        // Unbracketed display form: name, whitespace, then the address as
        // the final token.
        if let Some((idx, ws)) = trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
        {
            let address = trimmed[idx + ws.len_utf8()..].trim();
            return Self {
                email: address.to_string(),
                name: clean_name(&trimmed[..idx]),
            };
        }

        Self {
            email: trimmed.to_string(),
            name: None,
        }
    }

    /// Parses a list of free-form address strings, preserving order.
    #[must_use]
    pub fn parse_list(raw: &[String]) -> Vec<Self> {
        raw.iter().map(|entry| Self::parse(entry)).collect()
    }
}

/// Trims a name segment and its surrounding quotes; empty names are dropped.
fn clean_name(segment: &str) -> Option<String> {
    let name = segment.trim().trim_matches('"').trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_address() {
        let parsed = EmailAddress::parse("user@example.com");
        assert_eq!(parsed.email, "user@example.com");
        assert!(parsed.name.is_none());
    }

    #[test]
    fn test_parse_bare_address_with_whitespace() {
        let parsed = EmailAddress::parse("  user@example.com  ");
        assert_eq!(parsed.email, "user@example.com");
        assert!(parsed.name.is_none());
    }

    #[test]
    fn test_parse_display_form() {
        let parsed = EmailAddress::parse("John Doe <john@example.com>");
        assert_eq!(parsed.email, "john@example.com");
        assert_eq!(parsed.name.as_deref(), Some("John Doe"));
    }

    #[test]
    fn test_parse_quoted_display_form() {
        let parsed = EmailAddress::parse("\"John Doe\" <john@example.com>");
        assert_eq!(parsed.email, "john@example.com");
        assert_eq!(parsed.name.as_deref(), Some("John Doe"));
    }

    #[test]
    fn test_parse_brackets_without_name() {
        let parsed = EmailAddress::parse("<john@example.com>");
        assert_eq!(parsed.email, "john@example.com");
        assert!(parsed.name.is_none());
    }

    #[test]
    fn test_parse_unbracketed_display_form() {
        let parsed = EmailAddress::parse("John john@example.com");
        assert_eq!(parsed.email, "john@example.com");
        assert_eq!(parsed.name.as_deref(), Some("John"));
    }

    #[test]
    fn test_parse_empty_input() {
        let parsed = EmailAddress::parse("");
        assert_eq!(parsed.email, "");
        assert!(parsed.name.is_none());
    }

    #[test]
    fn test_parse_whitespace_only_input() {
        let parsed = EmailAddress::parse("   ");
        assert_eq!(parsed.email, "");
        assert!(parsed.name.is_none());
    }

    #[test]
    fn test_parse_list_preserves_order() {
        let raw = vec![
            "a@example.com".to_string(),
            "B <b@example.com>".to_string(),
            "c@example.com".to_string(),
        ];
        let parsed = EmailAddress::parse_list(&raw);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].email, "a@example.com");
        assert_eq!(parsed[1].email, "b@example.com");
        assert_eq!(parsed[1].name.as_deref(), Some("B"));
        assert_eq!(parsed[2].email, "c@example.com");
    }

    #[test]
    fn test_parse_list_single_entry() {
        let parsed = EmailAddress::parse_list(&["a@example.com".to_string()]);
        assert_eq!(parsed, vec![EmailAddress::parse("a@example.com")]);
    }

    #[test]
    fn test_serialize_skips_missing_name() {
        let parsed = EmailAddress::parse("user@example.com");
        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json, serde_json::json!({"email": "user@example.com"}));
    }

    #[test]
    fn test_serialize_includes_name() {
        let parsed = EmailAddress::parse("User <user@example.com>");
        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"email": "user@example.com", "name": "User"})
        );
    }
}
