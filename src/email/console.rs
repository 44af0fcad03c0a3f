//! Console mailer for development
//!
//! Prints emails to stdout instead of sending them, useful for local development.
//!
//! # Security Warning
//!
//! This mailer outputs email content to stdout/stderr which may be captured by
//! logging systems in containerized environments. **Do not use in production**
//! as email content may contain sensitive information (tokens, PII, etc.).

use crate::config::Settings;
use crate::error::TransportError;
use crate::traits::mailer::{Email, Mailer};
use async_trait::async_trait;

/// A mailer that prints emails to stdout instead of sending them
///
/// By default, the body is redacted. Use `with_full_output(true)` to see full
/// content in development.
///
/// # Example
///
/// ```rust,ignore
/// use template_mailer::{ConsoleMailer, Dispatcher, Settings};
/// use std::sync::Arc;
///
/// let dispatcher = Dispatcher::builder(Settings::new("localhost"))
///     .mailer(Arc::new(ConsoleMailer::new().with_full_output(true)))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConsoleMailer {
    prefix: String,
    show_full_content: bool,
}

impl ConsoleMailer {
    pub fn new() -> Self {
        Self {
            prefix: "[EMAIL]".to_string(),
            show_full_content: false,
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            show_full_content: false,
        }
    }

    /// Enable or disable full email content output
    ///
    /// Default: `false` (body content is redacted)
    pub fn with_full_output(mut self, enabled: bool) -> Self {
        if enabled {
            tracing::warn!(
                "ConsoleMailer: full output enabled - email content will be visible in logs. \
                 Do not use in production!"
            );
        }
        self.show_full_content = enabled;
        self
    }

    /// Render the lines that `send` prints
    fn render(&self, settings: &Settings, email: &Email) -> Vec<String> {
        let p = &self.prefix;
        let mut lines = vec![
            format!("{} ════════════════════════════════════════", p),
            format!("{} Server:  {}:{}", p, settings.host, settings.port),
            format!("{} From:    {}", p, email.from),
            format!("{} To:      {} recipient(s)", p, email.to.len()),
        ];
        if email.cc.is_some() {
            lines.push(format!("{} CC:      [set]", p));
        }
        lines.push(format!("{} Subject: {}", p, email.subject));
        lines.push(format!("{} ────────────────────────────────────────", p));

        let kind = if email.is_html { "HTML" } else { "TEXT" };
        if self.show_full_content {
            lines.push(format!("{} [{}]", p, kind));
            lines.extend(email.body.lines().map(|line| format!("{} {}", p, line)));
        } else {
            lines.push(format!("{} [{}] {} bytes [REDACTED]", p, kind, email.body.len()));
        }

        for attachment in &email.attachments {
            lines.push(format!(
                "{} [ATTACHMENT] {} ({}, {} bytes)",
                p,
                attachment.filename,
                attachment.content_type,
                attachment.content.len()
            ));
        }

        lines.push(format!("{} ════════════════════════════════════════", p));
        lines
    }
}

impl Default for ConsoleMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, settings: &Settings, email: &Email) -> Result<(), TransportError> {
        if email.to.is_empty() {
            return Err(TransportError::new("Email has no recipients"));
        }

        for line in self.render(settings, email) {
            println!("{}", line);
        }

        Ok(())
    }

    fn is_healthy(&self) -> bool {
        true // Console is always available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::mailer::{Attachment, MailAddress};

    fn email() -> Email {
        Email {
            sender: MailAddress::new("from@test.com", ""),
            from: MailAddress::new("from@test.com", "Test"),
            to: vec!["to@test.com".to_string()],
            cc: None,
            subject: "Test Subject".to_string(),
            body: "Secret token 1234".to_string(),
            is_html: false,
            attachments: vec![Attachment::new("a.txt", "text/plain", b"abc".to_vec())],
        }
    }

    #[tokio::test]
    async fn test_console_mailer_sends_without_error() {
        let mailer = ConsoleMailer::new();
        let result = mailer.send(&Settings::new("localhost"), &email()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_console_mailer_rejects_no_recipients() {
        let mailer = ConsoleMailer::new();
        let mut email = email();
        email.to.clear();

        let result = mailer.send(&Settings::new("localhost"), &email).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_body_redacted_by_default() {
        let lines = ConsoleMailer::new().render(&Settings::new("localhost"), &email());
        let output = lines.join("\n");
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("1234"));
        assert!(output.contains("a.txt"));
    }

    #[test]
    fn test_full_output_shows_body() {
        let lines = ConsoleMailer::with_prefix("[DEV]")
            .with_full_output(true)
            .render(&Settings::new("localhost"), &email());
        let output = lines.join("\n");
        assert!(output.contains("[DEV] Secret token 1234"));
    }

    #[test]
    fn test_console_mailer_is_healthy() {
        assert!(ConsoleMailer::new().is_healthy());
    }
}
