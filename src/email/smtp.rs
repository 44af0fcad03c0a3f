//! SMTP mailer using lettre
//!
//! Opens a transport per send from the dispatcher's [`Settings`].

use crate::config::Settings;
use crate::error::TransportError;
use crate::traits::mailer::{Attachment, Email, MailAddress, Mailer};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment as LettreAttachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// SMTP mailer using lettre
///
/// Settings are read on every send, so a dispatcher whose sender name
/// changes between sends needs no new mailer.
///
/// # Example
///
/// ```rust,ignore
/// use template_mailer::{Dispatcher, Settings, SmtpMailer};
/// use std::sync::Arc;
///
/// let settings = Settings::builder("smtp.gmail.com")
///     .port(587)
///     .credentials("user@gmail.com", "app-password")
///     .use_tls(true)
///     .build();
///
/// let dispatcher = Dispatcher::builder(settings)
///     .mailer(Arc::new(SmtpMailer::new()))
///     .build();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpMailer;

impl SmtpMailer {
    pub fn new() -> Self {
        Self
    }

    fn transport(settings: &Settings) -> Result<AsyncSmtpTransport<Tokio1Executor>, TransportError> {
        let mut builder = if settings.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host).map_err(|e| {
                TransportError::from_error("Failed to create SMTP transport", &e)
            })?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };

        builder = builder.port(settings.port);

        if let Some((username, password)) = settings.credentials() {
            builder = builder.credentials(Credentials::new(username.to_owned(), password.to_owned()));
        }

        Ok(builder.build())
    }

    fn build_message(email: &Email) -> Result<Message, TransportError> {
        let mut builder = Message::builder()
            .sender(mailbox(&email.sender, "sender")?)
            .from(mailbox(&email.from, "from")?)
            .subject(email.subject.as_str());

        for to in &email.to {
            builder = builder.to(parse_mailbox(to, "to")?);
        }

        if let Some(ref cc) = email.cc {
            builder = builder.cc(parse_mailbox(cc, "cc")?);
        }

        let content_type = if email.is_html {
            ContentType::TEXT_HTML
        } else {
            ContentType::TEXT_PLAIN
        };

        let message = if email.attachments.is_empty() {
            builder.header(content_type).body(email.body.clone())
        } else {
            let mut multipart = MultiPart::mixed().singlepart(
                SinglePart::builder()
                    .header(content_type)
                    .body(email.body.clone()),
            );
            for attachment in &email.attachments {
                multipart = multipart.singlepart(attachment_part(attachment)?);
            }
            builder.multipart(multipart)
        };

        message.map_err(|e| TransportError::from_error("Failed to build email", &e))
    }
}

fn mailbox(address: &MailAddress, field: &str) -> Result<Mailbox, TransportError> {
    let parsed: Address = address.address.parse().map_err(|e| {
        TransportError::from_error(
            format!("Invalid '{}' address '{}'", field, address.address),
            &e,
        )
    })?;
    Ok(Mailbox::new(address.display_name.clone(), parsed))
}

fn parse_mailbox(raw: &str, field: &str) -> Result<Mailbox, TransportError> {
    raw.parse().map_err(|e| {
        TransportError::from_error(format!("Invalid '{}' address '{}'", field, raw), &e)
    })
}

fn attachment_part(attachment: &Attachment) -> Result<SinglePart, TransportError> {
    let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
        TransportError::from_error(
            format!(
                "Invalid content type '{}' for attachment '{}'",
                attachment.content_type, attachment.filename
            ),
            &e,
        )
    })?;
    Ok(LettreAttachment::new(attachment.filename.clone())
        .body(attachment.content.clone(), content_type))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, settings: &Settings, email: &Email) -> Result<(), TransportError> {
        let message = Self::build_message(email)?;
        let transport = Self::transport(settings)?;

        transport
            .send(message)
            .await
            .map_err(|e| TransportError::from_error("Failed to send email", &e))?;

        Ok(())
    }

    fn is_healthy(&self) -> bool {
        // No connection is held between sends
        true
    }
}
