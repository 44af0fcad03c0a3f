//! template-mailer - templated email dispatch over SMTP
//!
//! Binds a named message template to a render engine, substitutes
//! placeholders, sends the result over SMTP and reports every attempt through
//! `Sent` / `Failed` / `Completed` notifications.
//!
//! # Features
//!
//! - **Templates**: `{Placeholder}` pipelines over in-memory or JSON template stores
//! - **Transports**: SMTP via lettre (`smtp` feature, on by default) or console output
//! - **Notifications**: ordered subscribers plus completion and exception-logging hooks
//! - **Recipient override**: route every message to one address in test environments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use template_mailer::template::{InMemoryTemplateStore, TemplateMessage, TemplatePipeline};
//! use template_mailer::{Dispatcher, SendOptions, Settings};
//!
//! #[tokio::main]
//! async fn main() -> template_mailer::Result<()> {
//!     template_mailer::init_tracing();
//!
//!     let store = InMemoryTemplateStore::new()
//!         .with_template("welcome", TemplateMessage::new("Welcome {Name}", "Hi {Name}!", false));
//!
//!     let mut dispatcher = Dispatcher::builder(Settings::from_env()?)
//!         .templates(Arc::new(store))
//!         .build()
//!         .on_completed(|outcome| {
//!             if !outcome.success {
//!                 eprintln!("welcome email failed: {}", outcome.error);
//!             }
//!         });
//!
//!     if dispatcher
//!         .apply_template("welcome", TemplatePipeline::new().map("Name", "Ada"))
//!         .is_some()
//!     {
//!         dispatcher.send_mail("ada@example.com", SendOptions::new()).await?;
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod dispatcher;
pub mod email;
mod error;
pub mod notify;
pub mod template;
pub mod traits;
pub mod utils;

// Re-exports for public API
pub use config::{EnvConfigProvider, Settings, SettingsBuilder, StaticConfig};
pub use dispatcher::{Dispatcher, DispatcherBuilder, RenderBinding, SendOptions, SEND_ERROR_PREFIX};
pub use email::ConsoleMailer;
#[cfg(feature = "smtp")]
pub use email::SmtpMailer;
pub use error::{MailerError, Result, TransportError};
pub use notify::{Notifications, SendOutcome};
pub use traits::config::{ConfigProvider, MailConfiguration};
pub use traits::mailer::{Attachment, Email, MailAddress, Mailer};
pub use traits::template::{RenderEngine, TemplateProvider, TextProvider};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "template_mailer=debug")
/// - `MAILER_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("MAILER_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
