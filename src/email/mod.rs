//! Email transports
//!
//! This module provides the [`Mailer`](crate::Mailer) backends:
//! - `ConsoleMailer` - Prints emails to stdout (for development)
//! - `SmtpMailer` - Sends emails via SMTP using lettre
//!
//! # Example
//!
//! ```rust,ignore
//! use template_mailer::email::{ConsoleMailer, SmtpMailer};
//! use template_mailer::{Mailer, Settings};
//! use std::sync::Arc;
//!
//! let mailer: Arc<dyn Mailer> = if std::env::var("SMTP_HOST").is_ok() {
//!     Arc::new(SmtpMailer::new())
//! } else {
//!     Arc::new(ConsoleMailer::new())
//! };
//! ```

mod console;
#[cfg(feature = "smtp")]
mod smtp;

pub use console::ConsoleMailer;
#[cfg(feature = "smtp")]
pub use smtp::SmtpMailer;

// Re-export the message types from traits for convenience
pub use crate::traits::mailer::{Attachment, Email, MailAddress};
