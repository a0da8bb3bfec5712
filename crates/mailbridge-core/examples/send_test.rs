//! Example: resolve delivery settings and send a test email.
//!
//! Settings are resolved from the SQLite store first, then from
//! `MAILBRIDGE_*` environment variables, then hard defaults (delivery
//! disabled, messages logged instead of sent). With no configuration at
//! all this example is safe to run: the test message lands in the log.
//!
//! ## Running
//!
//! ```bash
//! export MAILBRIDGE_ENABLED=true
//! export MAILBRIDGE_API_KEY="xkeysib-..."
//! export MAILBRIDGE_DEFAULT_FROM="noreply@example.com"
//! export TEST_RECIPIENT="you@example.com"
//! cargo run --package mailbridge-core --example send_test
//! ```

use std::env;

use mailbridge_core::{Mailer, PartialSettings, SettingsResolver, SqliteSettingsStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailbridge_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Store-backed settings with the environment as the static fallback.
    let store = SqliteSettingsStore::new("mailbridge.db").await?;
    let resolver = SettingsResolver::new(store).with_static_config(PartialSettings::from_env());
    let mailer = Mailer::new(resolver);

    mailer.log_delivery_state().await;

    let recipient = env::var("TEST_RECIPIENT").unwrap_or_else(|_| "test@example.com".to_string());
    mailer.send_test(&recipient).await?;

    mailer.shutdown().await;
    Ok(())
}
