//! Template loading and rendering
//!
//! Templates are looked up by *mail type* (e.g. `"welcome"`) through a
//! [`TemplateProvider`](crate::traits::template::TemplateProvider) and bound to
//! a [`TemplateEngine`] that substitutes `{Placeholder}` values:
//!
//! ```rust
//! use template_mailer::template::{InMemoryTemplateStore, TemplateEngine, TemplateMessage, TemplatePipeline};
//! use template_mailer::{RenderEngine, TemplateProvider};
//!
//! let store = InMemoryTemplateStore::new()
//!     .with_template("welcome", TemplateMessage::new("Hi {Name}", "Welcome, {Name}!", false));
//!
//! let engine = TemplateEngine::new(store.load("welcome"), TemplatePipeline::new().map("Name", "Ada"));
//! assert_eq!(engine.format(&|| "Hello {Name}".to_string()), "Hello Ada");
//! ```

mod engine;
mod in_memory;
mod json;

pub use engine::{RenderStep, TemplateEngine, TemplatePipeline};
pub use in_memory::InMemoryTemplateStore;
pub use json::JsonTemplateStore;

use crate::traits::template::TextProvider;

/// A loaded (or missing) message template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMessage {
    subject: String,
    text: String,
    is_html: bool,
    loaded: bool,
}

impl TemplateMessage {
    pub fn new(subject: impl Into<String>, text: impl Into<String>, is_html: bool) -> Self {
        Self {
            subject: subject.into(),
            text: text.into(),
            is_html,
            loaded: true,
        }
    }

    /// A template that could not be found
    pub fn missing() -> Self {
        Self {
            subject: String::new(),
            text: String::new(),
            is_html: false,
            loaded: false,
        }
    }
}

impl TextProvider for TemplateMessage {
    fn text(&self) -> &str {
        &self.text
    }

    fn subject(&self) -> &str {
        &self.subject
    }

    fn loaded(&self) -> bool {
        self.loaded
    }

    fn is_html(&self) -> Option<bool> {
        Some(self.is_html)
    }
}
