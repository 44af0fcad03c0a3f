//! Sending a templated email with notifications
//!
//! Run with: cargo run --example send_template
//!
//! Uses SMTP when `SMTP_HOST` is set, the console mailer otherwise.

use std::sync::Arc;
use template_mailer::template::{JsonTemplateStore, TemplatePipeline};
use template_mailer::{ConsoleMailer, Dispatcher, Mailer, SendOptions, Settings, SmtpMailer};

const MAIL_CONFIG: &str = r#"{
    "common": { "override_to_address": false, "to_address": "" },
    "templates": [
        {
            "name": "welcome",
            "subject": "Welcome to {App}, {Name}!",
            "body": "<h1>Hi {Name}</h1><p>Thanks for signing up to {App}.</p>",
            "is_html": true
        }
    ]
}"#;

#[tokio::main]
async fn main() -> template_mailer::Result<()> {
    template_mailer::init_tracing();

    let (settings, mailer): (Settings, Arc<dyn Mailer>) = if std::env::var("SMTP_HOST").is_ok() {
        println!("Using SMTP mailer (SMTP_HOST detected)");
        (Settings::from_env()?, Arc::new(SmtpMailer::new()))
    } else {
        println!("Using console mailer (set SMTP_HOST for SMTP)");
        (
            Settings::builder("localhost").from_address("noreply@myapp.com").build(),
            Arc::new(ConsoleMailer::new().with_full_output(true)),
        )
    };

    let store: JsonTemplateStore = MAIL_CONFIG.parse()?;

    let mut dispatcher = Dispatcher::builder(settings)
        .mailer(mailer)
        .store(Arc::new(store))
        .build()
        .send_as("MyApp")
        .on_sent(|email| println!("Sent '{}' to {} recipient(s)", email.subject, email.to.len()))
        .on_failed(|email| eprintln!("Failed to send '{}'", email.subject))
        .on_completed(|outcome| {
            if !outcome.success {
                eprintln!("Error: {}", outcome.error);
            }
        })
        .log_exception_with(|prefix, cause| tracing::error!(error = %cause, "{}", prefix));

    let pipeline = TemplatePipeline::new()
        .map("Name", "Ada")
        .map("App", "MyApp");

    if dispatcher.apply_template("welcome", pipeline).is_none() {
        eprintln!("welcome template not found");
        return Ok(());
    }

    dispatcher
        .send_mail("ada@example.com", SendOptions::new().cc("team@myapp.com"))
        .await?;

    Ok(())
}
