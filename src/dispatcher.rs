//! Template binding and send orchestration
//!
//! A [`Dispatcher`] owns the SMTP [`Settings`], the active template binding and
//! the notification subscribers. Each call to [`Dispatcher::send_mail`] renders
//! the bound template, resolves recipients, makes one delivery attempt and then
//! reports the outcome:
//!
//! ```text
//! Idle -> resolving engine -> rendering -> transmitting -> Sent | Failed -> Completed
//! ```
//!
//! Transport failures never surface as `Err`: they are reported through the
//! `Failed` and `Completed` notifications and the exception logger. Only a
//! configuration problem found before rendering is returned to the caller, and
//! in that case no notification fires.

use crate::config::Settings;
use crate::error::{MailerError, Result, TransportError};
use crate::notify::{AfterCompleteHook, ExceptionLogger, Notifications, SendOutcome};
use crate::template::{TemplateEngine, TemplatePipeline};
use crate::traits::config::ConfigProvider;
use crate::traits::mailer::{Attachment, Email, MailAddress, Mailer};
use crate::traits::template::{RenderEngine, TemplateProvider, TextProvider};
use secrecy::SecretString;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Prefix passed to the exception logger for every cause of a failed send
pub const SEND_ERROR_PREFIX: &str = "Error sending email in send_mail.";

/// The active association between a mail type and its render engine
#[derive(Clone)]
pub struct RenderBinding {
    pub mail_type: String,
    pub engine: Arc<dyn RenderEngine>,
}

impl fmt::Debug for RenderBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderBinding")
            .field("mail_type", &self.mail_type)
            .finish_non_exhaustive()
    }
}

/// Optional arguments of a single send
#[derive(Clone, Default)]
#[must_use]
pub struct SendOptions {
    engine: Option<Arc<dyn RenderEngine>>,
    cc: Option<String>,
    attachments: Vec<Attachment>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render with `engine` for this send only, ignoring the active binding
    pub fn engine(self, engine: impl RenderEngine + 'static) -> Self {
        self.shared_engine(Arc::new(engine))
    }

    pub fn shared_engine(mut self, engine: Arc<dyn RenderEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Carbon-copy one address; empty addresses are ignored
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc = Some(address.into());
        self
    }

    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments.extend(attachments);
        self
    }
}

impl fmt::Debug for SendOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendOptions")
            .field("engine", &self.engine.is_some())
            .field("cc", &self.cc)
            .field("attachments", &self.attachments)
            .finish()
    }
}

/// Sends templated emails and reports each outcome
///
/// # Example
///
/// ```rust,ignore
/// use template_mailer::template::{InMemoryTemplateStore, TemplateMessage, TemplatePipeline};
/// use template_mailer::{Dispatcher, SendOptions, Settings};
/// use std::sync::Arc;
///
/// let store = InMemoryTemplateStore::new()
///     .with_template("welcome", TemplateMessage::new("Welcome {Name}", "Hi {Name}!", false));
///
/// let mut dispatcher = Dispatcher::builder(Settings::new("smtp.example.com"))
///     .templates(Arc::new(store))
///     .build()
///     .on_completed(|outcome| println!("done: {:?}", outcome.error));
///
/// dispatcher
///     .apply_template("welcome", TemplatePipeline::new().map("Name", "Ada"))
///     .expect("welcome template");
/// dispatcher.send_mail("ada@example.com", SendOptions::new()).await?;
/// ```
pub struct Dispatcher {
    settings: Settings,
    mailer: Arc<dyn Mailer>,
    templates: Option<Arc<dyn TemplateProvider>>,
    config: Option<Arc<dyn ConfigProvider>>,
    binding: Option<RenderBinding>,
    to_address_override: Option<String>,
    notifications: Notifications,
    after_complete: Option<AfterCompleteHook>,
    log_exception: Option<ExceptionLogger>,
}

impl Dispatcher {
    /// Create a dispatcher with the default transport and no template or
    /// config provider
    pub fn new(settings: Settings) -> Self {
        Self::builder(settings).build()
    }

    /// Create a dispatcher from individual server fields
    pub fn with_credentials(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        port: u16,
        use_tls: bool,
        display_name: impl Into<String>,
    ) -> Self {
        let settings = Settings {
            username: Some(username.into()),
            password: Some(SecretString::from(password.into())),
            port,
            use_tls,
            display_name: display_name.into(),
            ..Settings::new(host)
        };
        Self::new(settings)
    }

    pub fn builder(settings: Settings) -> DispatcherBuilder {
        DispatcherBuilder {
            settings,
            mailer: None,
            templates: None,
            config: None,
        }
    }

    /// Run `hook` after every send attempt that reaches rendering
    pub fn after_complete<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.after_complete = Some(Arc::new(hook));
        self
    }

    /// Report each cause of a failed send to `logger`
    pub fn log_exception_with<F>(mut self, logger: F) -> Self
    where
        F: Fn(&str, &(dyn StdError + 'static)) + Send + Sync + 'static,
    {
        self.log_exception = Some(Arc::new(logger));
        self
    }

    /// Override the display name of the `Sender` mailbox
    pub fn send_as(mut self, sender_name: impl Into<String>) -> Self {
        self.settings.sender_name = sender_name.into();
        self
    }

    pub fn on_sent<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Email) + Send + Sync + 'static,
    {
        self.notifications.subscribe_sent(handler);
        self
    }

    pub fn on_failed<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Email) + Send + Sync + 'static,
    {
        self.notifications.subscribe_failed(handler);
        self
    }

    pub fn on_completed<F>(mut self, handler: F) -> Self
    where
        F: Fn(&SendOutcome<'_>) + Send + Sync + 'static,
    {
        self.notifications.subscribe_completed(handler);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// The active template binding, if any
    pub fn binding(&self) -> Option<&RenderBinding> {
        self.binding.as_ref()
    }

    /// The address every recipient is replaced with, if an override was
    /// recorded when a template was applied
    pub fn override_address(&self) -> Option<&str> {
        self.to_address_override.as_deref()
    }

    /// Load the template for `mail_type` and bind it with `pipeline`
    ///
    /// Returns `None` when the template cannot be loaded (or no template
    /// provider is configured); check for it before calling `send_mail`.
    /// A successful call replaces any previous binding.
    pub fn apply_template(
        &mut self,
        mail_type: &str,
        pipeline: TemplatePipeline,
    ) -> Option<&mut Self> {
        self.record_override();

        let Some(templates) = self.templates.as_ref() else {
            tracing::warn!(mail_type, "No template provider configured");
            return None;
        };

        let message = templates.load(mail_type);
        if !message.loaded() {
            tracing::warn!(mail_type, "Template not found or invalid");
            return None;
        }

        let engine = TemplateEngine::new(message, pipeline);
        Some(self.bind_engine(mail_type, engine))
    }

    /// Like [`apply_template`](Self::apply_template), additionally registering
    /// `on_sent` / `on_failed` subscribers when the template loads
    pub fn apply_template_with<S, F>(
        &mut self,
        mail_type: &str,
        pipeline: TemplatePipeline,
        on_sent: Option<S>,
        on_failed: Option<F>,
    ) -> Option<&mut Self>
    where
        S: Fn(&Email) + Send + Sync + 'static,
        F: Fn(&Email) + Send + Sync + 'static,
    {
        let this = self.apply_template(mail_type, pipeline)?;
        if let Some(handler) = on_sent {
            this.notifications.subscribe_sent(handler);
        }
        if let Some(handler) = on_failed {
            this.notifications.subscribe_failed(handler);
        }
        Some(this)
    }

    /// Bind a caller-built engine as the active binding
    pub fn bind_engine(
        &mut self,
        mail_type: impl Into<String>,
        engine: impl RenderEngine + 'static,
    ) -> &mut Self {
        let mail_type = mail_type.into();
        tracing::debug!(mail_type = %mail_type, "Bound render engine");
        self.binding = Some(RenderBinding {
            mail_type,
            engine: Arc::new(engine),
        });
        self
    }

    fn record_override(&mut self) {
        let Some(config) = self.config.as_ref() else {
            return;
        };
        if let Some(address) = config.get().active_override() {
            tracing::debug!(override_address = %address, "Recipient override enabled");
            self.to_address_override = Some(address.to_string());
        }
    }

    /// Send to a single recipient
    pub async fn send_mail(&self, to: impl Into<String>, options: SendOptions) -> Result<()> {
        self.send_mail_to_many([to.into()], options).await
    }

    /// Render the bound template and make one delivery attempt to `recipients`
    ///
    /// Returns `Err` only for configuration problems detected before rendering
    /// (no render engine, invalid settings); nothing is sent and no
    /// notification fires in that case. Otherwise the attempt always
    /// completes with `Ok(())`, and delivery failure is reported through the
    /// `Failed` / `Completed` notifications and the exception logger.
    pub async fn send_mail_to_many<I, S>(&self, recipients: I, options: SendOptions) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let SendOptions {
            engine,
            cc,
            attachments,
        } = options;

        self.settings.validate()?;

        let engine = engine
            .as_ref()
            .or_else(|| self.binding.as_ref().map(|binding| &binding.engine))
            .ok_or_else(|| MailerError::configuration("render engine must be specified"))?;

        let email = self.render(&**engine, recipients, cc, attachments);
        tracing::debug!(
            recipients = email.to.len(),
            attachments = email.attachments.len(),
            is_html = email.is_html,
            "Rendered email"
        );

        let result = self.mailer.send(&self.settings, &email).await;
        let success = result.is_ok();

        let error = match result {
            Ok(()) => {
                tracing::info!(
                    host = %self.settings.host,
                    recipients = email.to.len(),
                    "Email sent"
                );
                self.notifications.emit_sent(&email);
                String::new()
            }
            Err(err) => {
                self.notifications.emit_failed(&email);
                let error = self.report_failure(&err);
                tracing::warn!(host = %self.settings.host, error = %error, "Email failed");
                error
            }
        };

        if let Some(hook) = &self.after_complete {
            hook();
        }

        self.notifications.emit_completed(&SendOutcome {
            success,
            error,
            message: &email,
        });

        drop(email);
        Ok(())
    }

    fn render<I, S>(
        &self,
        engine: &dyn RenderEngine,
        recipients: I,
        cc: Option<String>,
        attachments: Vec<Attachment>,
    ) -> Email
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = engine.text_provider();
        let body = engine.format(&|| provider.text().to_string());
        let subject = engine.format(&|| provider.subject().to_string());

        let sender_address = self.settings.sender_address();

        Email {
            sender: MailAddress::new(sender_address, self.settings.sender_name.as_str()),
            from: MailAddress::new(sender_address, self.settings.display_name.as_str()),
            to: resolve_recipients(recipients, self.to_address_override.as_deref()),
            cc: cc.filter(|address| !address.trim().is_empty()),
            subject: subject.trim().to_string(),
            body: body.trim().to_string(),
            is_html: provider.is_html().unwrap_or(false),
            attachments,
        }
    }

    /// Log every cause of `err`, outermost first, and join their messages
    fn report_failure(&self, err: &TransportError) -> String {
        err.chain()
            .map(|cause| {
                if let Some(logger) = &self.log_exception {
                    logger(SEND_ERROR_PREFIX, cause);
                }
                cause.to_string()
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Replace each recipient with the override address, one entry per original
/// recipient
fn resolve_recipients<I, S>(recipients: I, override_address: Option<&str>) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    recipients
        .into_iter()
        .map(|recipient| match override_address {
            Some(address) if !address.is_empty() => address.to_string(),
            _ => recipient.into(),
        })
        .collect()
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("settings", &self.settings)
            .field("binding", &self.binding)
            .field("to_address_override", &self.to_address_override)
            .field("notifications", &self.notifications)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Dispatcher`] with injected collaborators
#[must_use = "builder does nothing until you call build()"]
pub struct DispatcherBuilder {
    settings: Settings,
    mailer: Option<Arc<dyn Mailer>>,
    templates: Option<Arc<dyn TemplateProvider>>,
    config: Option<Arc<dyn ConfigProvider>>,
}

impl DispatcherBuilder {
    /// Transport used for every send (default: SMTP)
    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn templates(mut self, templates: Arc<dyn TemplateProvider>) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Source of the recipient-override policy
    pub fn config(mut self, config: Arc<dyn ConfigProvider>) -> Self {
        self.config = Some(config);
        self
    }

    /// Use one store as both template provider and config provider
    pub fn store<T>(self, store: Arc<T>) -> Self
    where
        T: TemplateProvider + ConfigProvider + 'static,
    {
        self.templates(store.clone()).config(store)
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            settings: self.settings,
            mailer: self.mailer.unwrap_or_else(default_mailer),
            templates: self.templates,
            config: self.config,
            binding: None,
            to_address_override: None,
            notifications: Notifications::new(),
            after_complete: None,
            log_exception: None,
        }
    }
}

#[cfg(feature = "smtp")]
fn default_mailer() -> Arc<dyn Mailer> {
    Arc::new(crate::email::SmtpMailer::new())
}

#[cfg(not(feature = "smtp"))]
fn default_mailer() -> Arc<dyn Mailer> {
    Arc::new(crate::email::ConsoleMailer::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateMessage;

    #[test]
    fn test_resolve_recipients_without_override() {
        let resolved = resolve_recipients(["a@x", "b@x", "a@x"], None);
        assert_eq!(resolved, vec!["a@x", "b@x", "a@x"]);
    }

    #[test]
    fn test_resolve_recipients_duplicates_override() {
        let resolved = resolve_recipients(["a@x", "b@x", "c@x"], Some("qa@test.com"));
        assert_eq!(resolved, vec!["qa@test.com"; 3]);
    }

    #[test]
    fn test_resolve_recipients_empty_override_is_ignored() {
        let resolved = resolve_recipients(["a@x"], Some(""));
        assert_eq!(resolved, vec!["a@x"]);
    }

    #[test]
    fn test_with_credentials_builds_settings() {
        let dispatcher =
            Dispatcher::with_credentials("smtp.test", "user@test", "pw", 587, true, "Team");
        let settings = dispatcher.settings();

        assert_eq!(settings.host, "smtp.test");
        assert_eq!(settings.port, 587);
        assert!(settings.use_tls);
        assert_eq!(settings.display_name, "Team");
        assert_eq!(settings.credentials(), Some(("user@test", "pw")));
    }

    #[test]
    fn test_send_as_overrides_sender_name() {
        let dispatcher = Dispatcher::new(Settings::new("smtp.test")).send_as("Billing");
        assert_eq!(dispatcher.settings().sender_name, "Billing");
    }

    #[test]
    fn test_render_trims_and_reads_html_flag() {
        let mut dispatcher = Dispatcher::new(
            Settings::builder("smtp.test")
                .from_address("noreply@test.com")
                .sender_name("Sender")
                .display_name("Display")
                .build(),
        );
        dispatcher.bind_engine(
            "welcome",
            TemplateEngine::new(
                TemplateMessage::new("  Hi {Name}\n", "\n<p>{Name}</p>  ", true),
                TemplatePipeline::new().map("Name", "Ada"),
            ),
        );

        let binding = dispatcher.binding().unwrap();
        let email = dispatcher.render(
            binding.engine.as_ref(),
            ["a@x.com"],
            Some(" ".to_string()),
            Vec::new(),
        );

        assert_eq!(email.subject, "Hi Ada");
        assert_eq!(email.body, "<p>Ada</p>");
        assert!(email.is_html);
        assert_eq!(email.cc, None);
        assert_eq!(email.sender.to_string(), "Sender <noreply@test.com>");
        assert_eq!(email.from.to_string(), "Display <noreply@test.com>");
    }

    #[test]
    fn test_apply_template_without_provider_returns_none() {
        let mut dispatcher = Dispatcher::new(Settings::new("smtp.test"));
        assert!(dispatcher.apply_template("welcome", TemplatePipeline::new()).is_none());
        assert!(dispatcher.binding().is_none());
    }
}
