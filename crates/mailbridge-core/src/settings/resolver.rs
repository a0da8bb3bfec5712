//! Layered settings resolution.

use tracing::warn;

use super::model::{PartialSettings, Settings};
use super::store::SettingsStore;
use crate::Result;

/// Resolves effective settings from layered sources.
///
/// Precedence: the persisted store record, then static configuration,
/// then hard defaults. The first usable candidate wins; a candidate
/// missing the API key or the default sender falls through regardless of
/// its other fields.
pub struct SettingsResolver<S> {
    store: S,
    static_config: PartialSettings,
}

impl<S: SettingsStore> SettingsResolver<S> {
    /// Creates a resolver over the given store with no static
    /// configuration.
    pub fn new(store: S) -> Self {
        Self {
            store,
            static_config: PartialSettings::default(),
        }
    }

    /// Sets the static-configuration candidate consulted when the store
    /// yields no usable record.
    #[must_use]
    pub fn with_static_config(mut self, config: PartialSettings) -> Self {
        self.static_config = config;
        self
    }

    /// Resolves the effective settings.
    ///
    /// Never fails the caller: store errors are logged and treated as "no
    /// candidate", and the hard defaults terminate the chain. The result
    /// always has all fields defined.
    pub async fn get(&self) -> Settings {
        if let Some(candidate) = self.stored_candidate().await {
            return candidate.into_settings();
        }

        if self.static_config.is_usable() {
            return self.static_config.clone().into_settings();
        }

        Settings::default()
    }

    /// Overwrites the persisted record, then re-resolves.
    ///
    /// The returned value comes from a fresh resolution rather than an
    /// echo of the patch, so it matches what a subsequent
    /// [`get`](Self::get) would yield.
    ///
    /// # Errors
    ///
    /// Returns an error when the store write fails.
    pub async fn update(&self, settings: Settings) -> Result<Settings> {
        self.store.save(&settings).await?;
        Ok(self.get().await)
    }

    async fn stored_candidate(&self) -> Option<PartialSettings> {
        match self.store.load().await {
            Ok(candidate) => candidate.filter(PartialSettings::is_usable),
            Err(error) => {
                warn!("Failed to read settings from store: {error}");
                None
            }
        }
    }
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
    use std::sync::Mutex;

    use super::*;

    /// Store stub with a scriptable record and failure mode.
    struct StubStore {
        record: Mutex<Option<PartialSettings>>,
        fail_reads: bool,
    }

    impl StubStore {
        fn empty() -> Self {
            Self {
                record: Mutex::new(None),
                fail_reads: false,
            }
        }

        fn with_record(record: PartialSettings) -> Self {
            Self {
                record: Mutex::new(Some(record)),
                fail_reads: false,
            }
        }

        fn failing() -> Self {
            Self {
                record: Mutex::new(None),
                fail_reads: true,
            }
        }
    }

    impl SettingsStore for StubStore {
        async fn load(&self) -> Result<Option<PartialSettings>> {
            if self.fail_reads {
                return Err(sqlx::Error::PoolClosed.into());
            }
            Ok(self.record.lock().unwrap().clone())
        }

        async fn save(&self, settings: &Settings) -> Result<()> {
            *self.record.lock().unwrap() = Some(PartialSettings::from(settings.clone()));
            Ok(())
        }
    }

    fn usable_record() -> PartialSettings {
        PartialSettings {
            enabled: Some(true),
            api_key: Some("xkeysib-stored".to_string()),
            default_from: Some("stored@example.com".to_string()),
            ..Default::default()
        }
    }

    fn static_config() -> PartialSettings {
        PartialSettings {
            enabled: Some(true),
            api_key: Some("xkeysib-static".to_string()),
            default_from: Some("static@example.com".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_stored_record_wins() {
        let resolver = SettingsResolver::new(StubStore::with_record(usable_record()))
            .with_static_config(static_config());

        let settings = resolver.get().await;
        assert_eq!(settings.api_key, "xkeysib-stored");
        assert_eq!(settings.default_from, "stored@example.com");
    }

    #[tokio::test]
    async fn test_unusable_record_falls_through_to_static_config() {
        let mut record = usable_record();
        record.api_key = Some(String::new());

        let resolver = SettingsResolver::new(StubStore::with_record(record))
            .with_static_config(static_config());

        let settings = resolver.get().await;
        assert_eq!(settings.api_key, "xkeysib-static");
    }

    #[tokio::test]
    async fn test_empty_store_and_config_yield_defaults() {
        let resolver = SettingsResolver::new(StubStore::empty());
        assert_eq!(resolver.get().await, Settings::default());
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_static_config() {
        let resolver =
            SettingsResolver::new(StubStore::failing()).with_static_config(static_config());

        let settings = resolver.get().await;
        assert_eq!(settings.api_key, "xkeysib-static");
    }

    #[tokio::test]
    async fn test_store_failure_without_config_degrades_to_defaults() {
        let resolver = SettingsResolver::new(StubStore::failing());
        assert_eq!(resolver.get().await, Settings::default());
    }

    #[tokio::test]
    async fn test_unusable_static_config_is_skipped() {
        let resolver = SettingsResolver::new(StubStore::empty()).with_static_config(
            PartialSettings {
                enabled: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(resolver.get().await, Settings::default());
    }

    #[tokio::test]
    async fn test_update_persists_and_re_resolves() {
        let resolver = SettingsResolver::new(StubStore::empty());

        let patch = Settings {
            enabled: true,
            api_key: "xkeysib-12345678".to_string(),
            default_from: "noreply@example.com".to_string(),
            ..Default::default()
        };

        let updated = resolver.update(patch.clone()).await.unwrap();
        assert_eq!(updated, patch);
        assert_eq!(resolver.get().await, patch);
    }

    #[tokio::test]
    async fn test_update_of_unusable_patch_returns_next_candidate() {
        let resolver = SettingsResolver::new(StubStore::empty());

        // Writing a disabled, keyless record is allowed; resolution then
        // skips it.
        let updated = resolver.update(Settings::default()).await.unwrap();
        assert_eq!(updated, Settings::default());
    }
}
