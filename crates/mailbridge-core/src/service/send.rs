//! Transactional email send pipeline.
//!
//! Resolves effective settings per send, falls back to structured log
//! output when delivery is disabled, and maps provider failures into a
//! small stable error taxonomy.

use mailbridge_brevo::{Client, EmailAddress, SendSmtpEmail};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::settings::{Settings, SettingsResolver, SettingsStore, is_valid_email};

/// Characters of plain-text body shown in the log-only fallback.
const TEXT_PREVIEW_LIMIT: usize = 200;

/// HTML body of the fixed test message.
const TEST_EMAIL_HTML: &str = "<div style=\"font-family: Arial, sans-serif; padding: 20px;\">\
    <h2>Test Email</h2>\
    <p>This is a test email from Mailbridge.</p>\
    <p>If you received this email, your configuration is working correctly!</p>\
    </div>";

/// Errors surfaced by the send pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// Delivery is enabled but no API key is available.
    #[error("email delivery is enabled but no API key is configured")]
    Configuration,

    /// The provider rejected the API key.
    #[error("email provider rejected the API key")]
    Authentication,

    /// The provider throttled the request.
    #[error("email provider rate limit exceeded")]
    RateLimited,

    /// A recipient address was rejected.
    #[error("recipient address rejected")]
    InvalidRecipient,

    /// Any other provider-side failure.
    #[error("email send failed")]
    SendFailed,
}

/// An email message to send.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    /// Sender address; the configured default is used when absent.
    pub from: Option<String>,
    /// Recipient addresses.
    pub to: Vec<String>,
    /// CC addresses.
    pub cc: Vec<String>,
    /// BCC addresses.
    pub bcc: Vec<String>,
    /// Reply-to address; the configured default is used when absent.
    pub reply_to: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub text: Option<String>,
    /// HTML body.
    pub html: Option<String>,
}

impl OutgoingEmail {
    /// Creates a new message with the given subject.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            from: None,
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: None,
            subject: subject.into(),
            text: None,
            html: None,
        }
    }

    /// Sets an explicit sender, overriding the configured default.
    #[must_use]
    pub fn sender(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Adds a recipient.
    #[must_use]
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.to.push(recipient.into());
        self
    }

    /// Adds a CC recipient.
    #[must_use]
    pub fn cc(mut self, recipient: impl Into<String>) -> Self {
        self.cc.push(recipient.into());
        self
    }

    /// Adds a BCC recipient.
    #[must_use]
    pub fn bcc(mut self, recipient: impl Into<String>) -> Self {
        self.bcc.push(recipient.into());
        self
    }

    /// Sets an explicit reply-to, overriding the configured default.
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Sets the plain text body.
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = Some(body.into());
        self
    }
}

/// Provider client cached against the API key it was built with.
struct CachedClient {
    api_key: String,
    client: Client,
}

impl CachedClient {
    fn new(api_key: &str, base_url: Option<&str>) -> Self {
        let mut client = Client::new(api_key);
        if let Some(base_url) = base_url {
            client = client.with_base_url(base_url);
        }
        Self {
            api_key: api_key.to_string(),
            client,
        }
    }
}

/// Transactional email send pipeline.
///
/// Safe to share across concurrent sends: the cached client is checked
/// against the API key in use and rebuilt under a single critical
/// section, so a settings update can never race a send onto a stale
/// credential.
pub struct Mailer<S> {
    resolver: SettingsResolver<S>,
    client: Mutex<Option<CachedClient>>,
    base_url: Option<String>,
}

impl<S: SettingsStore> Mailer<S> {
    /// Creates a mailer over the given resolver.
    pub fn new(resolver: SettingsResolver<S>) -> Self {
        Self {
            resolver,
            client: Mutex::new(None),
            base_url: None,
        }
    }

    /// Overrides the provider API base URL (e.g. to point at a relay or a
    /// test server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Returns the resolver backing this mailer.
    pub const fn resolver(&self) -> &SettingsResolver<S> {
        &self.resolver
    }

    /// Sends an email through the provider, or logs it when delivery is
    /// disabled.
    ///
    /// # Errors
    ///
    /// Fails with one of the [`SendError`] variants; provider failures are
    /// logged with their raw message before being classified.
    pub async fn send(&self, email: OutgoingEmail) -> Result<(), SendError> {
        let settings = self.resolver.get().await;
        self.dispatch(&settings, email).await
    }

    /// Sends the fixed test message to a single recipient.
    ///
    /// # Errors
    ///
    /// Fails with [`SendError::InvalidRecipient`] before any provider
    /// call when the recipient is not a well-formed address; otherwise
    /// behaves like [`send`](Self::send).
    pub async fn send_test(&self, to: &str) -> Result<(), SendError> {
        if !is_valid_email(to) {
            return Err(SendError::InvalidRecipient);
        }

        let email = OutgoingEmail::new("Mailbridge test email")
            .to(to)
            .text("This is a test email from Mailbridge.")
            .html(TEST_EMAIL_HTML);

        self.send(email).await
    }

    /// Logs whether real delivery or the log-only fallback is active.
    ///
    /// Intended for process startup, so operators can tell from the log
    /// which mode the mailer is in.
    pub async fn log_delivery_state(&self) {
        let settings = self.resolver.get().await;
        if settings.enabled {
            info!(sender = %settings.default_from, "Email delivery enabled");
        } else {
            info!("Email delivery disabled - outgoing messages will be logged only");
        }
    }

    /// Drops the cached provider client and the credential it holds.
    ///
    /// Call at process shutdown so no credential survives reuse across
    /// independent lifecycles.
    pub async fn shutdown(&self) {
        *self.client.lock().await = None;
    }

    async fn dispatch(&self, settings: &Settings, email: OutgoingEmail) -> Result<(), SendError> {
        if !settings.enabled {
            log_suppressed_email(&email, settings);
            return Ok(());
        }

        // The resolver never yields an enabled record without a key, but a
        // concurrent settings update can land between resolution and here.
        if settings.api_key.is_empty() {
            return Err(SendError::Configuration);
        }

        if email.to.is_empty() {
            return Err(SendError::InvalidRecipient);
        }

        let payload = build_payload(&email, settings);

        // Single critical section: check the cached key, rebuild on
        // mismatch, and send on the client it yields.
        let mut cache = self.client.lock().await;
        if cache
            .as_ref()
            .is_some_and(|cached| cached.api_key != settings.api_key)
        {
            debug!("API key changed - rebuilding provider client");
            *cache = None;
        }
        let cached = cache.get_or_insert_with(|| {
            CachedClient::new(&settings.api_key, self.base_url.as_deref())
        });

        match cached.client.send_transac_email(&payload).await {
            Ok(created) => {
                info!(message_id = %created.message_id, "Email sent");
                Ok(())
            }
            Err(provider_error) => {
                error!("Failed to send email: {provider_error}");
                Err(classify_provider_error(&provider_error))
            }
        }
    }
}

/// Maps a raw provider error onto the stable taxonomy.
fn classify_provider_error(error: &mailbridge_brevo::Error) -> SendError {
    match error.status() {
        Some(401) => SendError::Authentication,
        Some(429) => SendError::RateLimited,
        _ => {
            if error.code() == Some("invalid_parameter") {
                SendError::InvalidRecipient
            } else {
                SendError::SendFailed
            }
        }
    }
}

/// Assembles the provider payload from the message and resolved settings.
fn build_payload(email: &OutgoingEmail, settings: &Settings) -> SendSmtpEmail {
    let sender_raw = email.from.as_deref().unwrap_or(&settings.default_from);
    let sender = (!sender_raw.trim().is_empty()).then(|| {
        let mut sender = EmailAddress::parse(sender_raw);
        if sender.name.is_none() && !settings.default_from_name.is_empty() {
            sender.name = Some(settings.default_from_name.clone());
        }
        sender
    });

    let reply_to = email
        .reply_to
        .as_deref()
        .or_else(|| {
            (!settings.default_reply_to.is_empty()).then_some(settings.default_reply_to.as_str())
        })
        .map(EmailAddress::parse);

    SendSmtpEmail {
        sender,
        to: EmailAddress::parse_list(&email.to),
        cc: EmailAddress::parse_list(&email.cc),
        bcc: EmailAddress::parse_list(&email.bcc),
        reply_to,
        subject: email.subject.clone(),
        text_content: email.text.clone(),
        html_content: email.html.clone(),
    }
}

/// Emits the structured preview of a message suppressed by the log-only
/// fallback.
fn log_suppressed_email(email: &OutgoingEmail, settings: &Settings) {
    let sender = email.from.as_deref().unwrap_or(&settings.default_from);

    info!(
        from = %sender,
        to = ?email.to,
        subject = %email.subject,
        "Email delivery disabled - logging message instead of sending"
    );

    if !email.cc.is_empty() {
        info!(cc = ?email.cc, "Suppressed message copies");
    }
    if !email.bcc.is_empty() {
        info!(bcc = ?email.bcc, "Suppressed message blind copies");
    }
    if let Some(text) = &email.text {
        info!(preview = %preview_text(text), "Suppressed message text");
    }
    if let Some(html) = &email.html {
        info!(length = html.len(), "Suppressed message HTML content");
    }
}

/// Truncates a plain-text body for the fallback preview.
fn preview_text(text: &str) -> String {
    let mut preview: String = text.chars().take(TEXT_PREVIEW_LIMIT).collect();
    if text.chars().count() > TEXT_PREVIEW_LIMIT {
        preview.push_str("...");
    }
    preview
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
    use crate::settings::PartialSettings;

    /// Store that never holds a record; resolution lands on defaults.
    struct NullStore;

    impl SettingsStore for NullStore {
        async fn load(&self) -> crate::Result<Option<PartialSettings>> {
            Ok(None)
        }

        async fn save(&self, _settings: &Settings) -> crate::Result<()> {
            Ok(())
        }
    }

    fn mailer() -> Mailer<NullStore> {
        Mailer::new(SettingsResolver::new(NullStore))
    }

    fn enabled_settings() -> Settings {
        Settings {
            enabled: true,
            api_key: "xkeysib-12345678".to_string(),
            default_from: "noreply@example.com".to_string(),
            default_from_name: "Example".to_string(),
            default_reply_to: String::new(),
        }
    }

    fn api_error(status: u16, code: Option<&str>) -> mailbridge_brevo::Error {
        mailbridge_brevo::Error::Api {
            status,
            code: code.map(str::to_string),
            message: "test".to_string(),
        }
    }

    mod dispatch_tests {
        use super::*;

        #[tokio::test]
        async fn disabled_settings_succeed_without_sending() {
            let settings = Settings::default();
            let email = OutgoingEmail::new("Hello").to("user@example.com");
            assert!(mailer().dispatch(&settings, email).await.is_ok());
        }

        #[tokio::test]
        async fn disabled_settings_succeed_for_any_content() {
            let settings = Settings::default();
            // No recipients at all; the fallback still accepts it.
            let email = OutgoingEmail::new("Hello");
            assert!(mailer().dispatch(&settings, email).await.is_ok());
        }

        #[tokio::test]
        async fn enabled_without_key_is_a_configuration_error() {
            let mut settings = enabled_settings();
            settings.api_key = String::new();

            let email = OutgoingEmail::new("Hello").to("user@example.com");
            let result = mailer().dispatch(&settings, email).await;
            assert_eq!(result, Err(SendError::Configuration));
        }

        #[tokio::test]
        async fn enabled_without_recipients_is_an_invalid_recipient_error() {
            let email = OutgoingEmail::new("Hello");
            let result = mailer().dispatch(&enabled_settings(), email).await;
            assert_eq!(result, Err(SendError::InvalidRecipient));
        }

        #[tokio::test]
        async fn send_resolves_to_defaults_and_logs_only() {
            // NullStore yields the hard defaults, so delivery is disabled
            // and no provider call is attempted.
            let email = OutgoingEmail::new("Hello").to("user@example.com");
            assert!(mailer().send(email).await.is_ok());
        }

        #[tokio::test]
        async fn send_test_rejects_malformed_recipient() {
            let result = mailer().send_test("not-an-address").await;
            assert_eq!(result, Err(SendError::InvalidRecipient));
        }

        #[tokio::test]
        async fn send_test_accepts_well_formed_recipient_when_disabled() {
            assert!(mailer().send_test("user@example.com").await.is_ok());
        }

        #[tokio::test]
        async fn shutdown_clears_the_cached_client() {
            let mailer = mailer();
            *mailer.client.lock().await = Some(CachedClient::new("xkeysib-12345678", None));

            mailer.shutdown().await;
            assert!(mailer.client.lock().await.is_none());
        }
    }

    mod classification_tests {
        use super::*;

        #[test]
        fn status_401_is_authentication() {
            let error = api_error(401, Some("unauthorized"));
            assert_eq!(classify_provider_error(&error), SendError::Authentication);
        }

        #[test]
        fn status_429_is_rate_limited() {
            let error = api_error(429, None);
            assert_eq!(classify_provider_error(&error), SendError::RateLimited);
        }

        #[test]
        fn invalid_parameter_code_is_invalid_recipient() {
            let error = api_error(400, Some("invalid_parameter"));
            assert_eq!(classify_provider_error(&error), SendError::InvalidRecipient);
        }

        #[test]
        fn other_failures_are_send_failed() {
            let error = api_error(500, Some("internal_error"));
            assert_eq!(classify_provider_error(&error), SendError::SendFailed);

            let error = api_error(400, None);
            assert_eq!(classify_provider_error(&error), SendError::SendFailed);
        }
    }

    mod payload_tests {
        use super::*;

        #[test]
        fn default_sender_gets_configured_display_name() {
            let email = OutgoingEmail::new("Hello").to("user@example.com");
            let payload = build_payload(&email, &enabled_settings());

            let sender = payload.sender.unwrap();
            assert_eq!(sender.email, "noreply@example.com");
            assert_eq!(sender.name.as_deref(), Some("Example"));
        }

        #[test]
        fn explicit_sender_name_is_kept() {
            let email = OutgoingEmail::new("Hello")
                .sender("Support <support@example.com>")
                .to("user@example.com");
            let payload = build_payload(&email, &enabled_settings());

            let sender = payload.sender.unwrap();
            assert_eq!(sender.email, "support@example.com");
            assert_eq!(sender.name.as_deref(), Some("Support"));
        }

        #[test]
        fn bare_explicit_sender_gets_configured_display_name() {
            let email = OutgoingEmail::new("Hello")
                .sender("support@example.com")
                .to("user@example.com");
            let payload = build_payload(&email, &enabled_settings());

            let sender = payload.sender.unwrap();
            assert_eq!(sender.email, "support@example.com");
            assert_eq!(sender.name.as_deref(), Some("Example"));
        }

        #[test]
        fn missing_sender_is_omitted() {
            let mut settings = enabled_settings();
            settings.default_from = String::new();

            let email = OutgoingEmail::new("Hello").to("user@example.com");
            let payload = build_payload(&email, &settings);
            assert!(payload.sender.is_none());
        }

        #[test]
        fn explicit_reply_to_wins_over_default() {
            let mut settings = enabled_settings();
            settings.default_reply_to = "default@example.com".to_string();

            let email = OutgoingEmail::new("Hello")
                .to("user@example.com")
                .reply_to("explicit@example.com");
            let payload = build_payload(&email, &settings);
            assert_eq!(payload.reply_to.unwrap().email, "explicit@example.com");
        }

        #[test]
        fn default_reply_to_fills_in_when_absent() {
            let mut settings = enabled_settings();
            settings.default_reply_to = "default@example.com".to_string();

            let email = OutgoingEmail::new("Hello").to("user@example.com");
            let payload = build_payload(&email, &settings);
            assert_eq!(payload.reply_to.unwrap().email, "default@example.com");
        }

        #[test]
        fn reply_to_is_omitted_when_nothing_is_configured() {
            let email = OutgoingEmail::new("Hello").to("user@example.com");
            let payload = build_payload(&email, &enabled_settings());
            assert!(payload.reply_to.is_none());
        }

        #[test]
        fn recipient_lists_preserve_order() {
            let email = OutgoingEmail::new("Hello")
                .to("a@example.com")
                .to("B <b@example.com>")
                .cc("c@example.com")
                .bcc("d@example.com");
            let payload = build_payload(&email, &enabled_settings());

            assert_eq!(payload.to.len(), 2);
            assert_eq!(payload.to[0].email, "a@example.com");
            assert_eq!(payload.to[1].email, "b@example.com");
            assert_eq!(payload.to[1].name.as_deref(), Some("B"));
            assert_eq!(payload.cc[0].email, "c@example.com");
            assert_eq!(payload.bcc[0].email, "d@example.com");
        }

        #[test]
        fn content_fields_are_copied_as_given() {
            let email = OutgoingEmail::new("Hello")
                .to("user@example.com")
                .text("plain")
                .html("<p>html</p>");
            let payload = build_payload(&email, &enabled_settings());

            assert_eq!(payload.subject, "Hello");
            assert_eq!(payload.text_content.as_deref(), Some("plain"));
            assert_eq!(payload.html_content.as_deref(), Some("<p>html</p>"));
        }
    }

    mod preview_tests {
        use super::*;

        #[test]
        fn short_text_passes_through() {
            assert_eq!(preview_text("hello"), "hello");
        }

        #[test]
        fn exact_limit_is_not_truncated() {
            let text = "a".repeat(TEXT_PREVIEW_LIMIT);
            assert_eq!(preview_text(&text), text);
        }

        #[test]
        fn long_text_is_truncated_with_marker() {
            let text = "a".repeat(TEXT_PREVIEW_LIMIT + 1);
            let preview = preview_text(&text);
            assert_eq!(preview.chars().count(), TEXT_PREVIEW_LIMIT + 3);
            assert!(preview.ends_with("..."));
        }
    }
}
