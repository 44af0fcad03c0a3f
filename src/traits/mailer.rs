//! Mailer trait for sending rendered emails
//!
//! This trait abstracts the transport, allowing the dispatcher to send over
//! SMTP, print to the console during development, or record messages in tests.

use crate::config::Settings;
use crate::error::TransportError;
use async_trait::async_trait;
use std::fmt;

/// A mailbox: an address with an optional display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAddress {
    pub address: String,
    pub display_name: Option<String>,
}

impl MailAddress {
    /// Create a mailbox; an empty display name is treated as none
    pub fn new(address: impl Into<String>, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        Self {
            address: address.into(),
            display_name: (!display_name.trim().is_empty()).then_some(display_name),
        }
    }
}

impl fmt::Display for MailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "{} <{}>", name, self.address),
            None => f.write_str(&self.address),
        }
    }
}

/// A file attached to an email
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    /// MIME type, e.g. `application/pdf`
    pub content_type: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content: content.into(),
        }
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.content.len())
            .finish()
    }
}

/// A rendered email, ready for transmission
///
/// Built by the dispatcher for a single send attempt and dropped when that
/// attempt finishes. Subscribers only ever see it by reference.
#[derive(Debug, Clone)]
pub struct Email {
    pub sender: MailAddress,
    pub from: MailAddress,
    /// Final recipient list, after any override substitution
    pub to: Vec<String>,
    pub cc: Option<String>,
    /// Rendered subject, trimmed
    pub subject: String,
    /// Rendered body, trimmed
    pub body: String,
    pub is_html: bool,
    pub attachments: Vec<Attachment>,
}

/// Mailer trait for sending emails
///
/// Implement this trait to create custom transports.
///
/// # Example
///
/// ```rust,ignore
/// use template_mailer::{Email, Mailer, Settings, TransportError};
/// use async_trait::async_trait;
///
/// struct MyMailer;
///
/// #[async_trait]
/// impl Mailer for MyMailer {
///     async fn send(&self, settings: &Settings, email: &Email) -> Result<(), TransportError> {
///         // Deliver via your preferred service
///         Ok(())
///     }
///
///     fn is_healthy(&self) -> bool {
///         true
///     }
/// }
/// ```
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Make exactly one delivery attempt
    ///
    /// `settings` carries the server, credentials and TLS flag to use.
    async fn send(&self, settings: &Settings, email: &Email) -> Result<(), TransportError>;

    /// Check if the mailer backend is healthy/connected
    fn is_healthy(&self) -> bool;
}
