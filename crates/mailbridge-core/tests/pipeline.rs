//! Integration tests for settings resolution and the send pipeline.
//!
//! These tests run against an in-memory SQLite store. No network access
//! is needed: every exercised path stops before the provider call.

#![allow(clippy::unwrap_used)]

use mailbridge_core::{
    Mailer, OutgoingEmail, PartialSettings, SendError, Settings, SettingsResolver, SettingsStore,
    SqliteSettingsStore, validate_settings,
};

fn usable_settings() -> Settings {
    Settings {
        enabled: true,
        api_key: "xkeysib-12345678".to_string(),
        default_from: "noreply@example.com".to_string(),
        default_from_name: "Example".to_string(),
        default_reply_to: String::new(),
    }
}

async fn sqlite_resolver() -> SettingsResolver<SqliteSettingsStore> {
    SettingsResolver::new(SqliteSettingsStore::in_memory().await.unwrap())
}

#[tokio::test]
async fn fresh_store_resolves_to_hard_defaults() {
    let resolver = sqlite_resolver().await;

    let settings = resolver.get().await;
    assert!(!settings.enabled);
    assert!(settings.api_key.is_empty());
    assert!(settings.default_from.is_empty());
}

#[tokio::test]
async fn update_then_get_returns_the_persisted_record() {
    let resolver = sqlite_resolver().await;

    let patch = usable_settings();
    let updated = resolver.update(patch.clone()).await.unwrap();
    assert_eq!(updated, patch);
    assert_eq!(resolver.get().await, patch);
}

#[tokio::test]
async fn unusable_stored_record_falls_through_to_static_config() {
    let store = SqliteSettingsStore::in_memory().await.unwrap();

    // A record with an empty API key is persisted but never resolved.
    let mut record = usable_settings();
    record.api_key = String::new();
    store.save(&record).await.unwrap();

    let resolver = SettingsResolver::new(store).with_static_config(PartialSettings {
        enabled: Some(false),
        api_key: Some("xkeysib-static".to_string()),
        default_from: Some("static@example.com".to_string()),
        ..Default::default()
    });

    let settings = resolver.get().await;
    assert_eq!(settings.api_key, "xkeysib-static");
    assert_eq!(settings.default_from, "static@example.com");
}

#[tokio::test]
async fn stored_record_takes_precedence_over_static_config() {
    let store = SqliteSettingsStore::in_memory().await.unwrap();
    store.save(&usable_settings()).await.unwrap();

    let resolver = SettingsResolver::new(store).with_static_config(PartialSettings {
        api_key: Some("xkeysib-static".to_string()),
        default_from: Some("static@example.com".to_string()),
        ..Default::default()
    });

    assert_eq!(resolver.get().await, usable_settings());
}

#[tokio::test]
async fn masked_view_of_resolved_settings_redacts_the_key() {
    let resolver = sqlite_resolver().await;
    resolver.update(usable_settings()).await.unwrap();

    let masked = resolver.get().await.masked();
    assert!(masked.api_key.ends_with("5678"));
    assert!(!masked.api_key.contains("xkeysib"));
    assert!(masked.has_api_key);
}

#[tokio::test]
async fn validation_gates_an_enabled_update() {
    let submitted = Settings {
        enabled: true,
        ..Default::default()
    };

    let errors = validate_settings(&submitted).unwrap_err();
    let fields: Vec<&str> = errors.iter().map(|error| error.field()).collect();
    assert!(fields.contains(&"api_key"));
    assert!(fields.contains(&"default_from"));
}

#[tokio::test]
async fn disabled_mailer_accepts_sends_without_a_provider() {
    let mailer = Mailer::new(sqlite_resolver().await);

    let email = OutgoingEmail::new("Welcome!")
        .to("user@example.com")
        .cc("copy@example.com")
        .text("Thanks for signing up.")
        .html("<p>Thanks for signing up.</p>");

    assert!(mailer.send(email).await.is_ok());
}

#[tokio::test]
async fn disabled_mailer_accepts_test_sends() {
    let mailer = Mailer::new(sqlite_resolver().await);
    assert!(mailer.send_test("user@example.com").await.is_ok());
}

#[tokio::test]
async fn test_send_to_malformed_recipient_fails_fast() {
    let mailer = Mailer::new(sqlite_resolver().await);
    assert_eq!(
        mailer.send_test("not-an-address").await,
        Err(SendError::InvalidRecipient)
    );
}

#[tokio::test]
async fn mailer_observes_settings_updates_between_sends() {
    let mailer = Mailer::new(sqlite_resolver().await);

    // Disabled at first: the send is logged, not delivered.
    let email = OutgoingEmail::new("Hello").to("user@example.com");
    assert!(mailer.send(email).await.is_ok());

    // Enable delivery through the same resolver; the next resolution must
    // pick up the persisted record.
    let updated = mailer.resolver().update(usable_settings()).await.unwrap();
    assert!(updated.enabled);
    assert_eq!(mailer.resolver().get().await, usable_settings());
}

#[tokio::test]
async fn failing_store_degrades_resolution_to_defaults() {
    struct FailingStore;

    impl SettingsStore for FailingStore {
        async fn load(&self) -> mailbridge_core::Result<Option<PartialSettings>> {
            Err(sqlx::Error::PoolClosed.into())
        }

        async fn save(&self, _settings: &Settings) -> mailbridge_core::Result<()> {
            Err(sqlx::Error::PoolClosed.into())
        }
    }

    let resolver = SettingsResolver::new(FailingStore);
    assert_eq!(resolver.get().await, Settings::default());

    // The write path does surface the failure.
    assert!(resolver.update(usable_settings()).await.is_err());

    // A mailer over the failing store still accepts sends via the
    // log-only fallback.
    let mailer = Mailer::new(SettingsResolver::new(FailingStore));
    let email = OutgoingEmail::new("Hello").to("user@example.com");
    assert!(mailer.send(email).await.is_ok());
}
