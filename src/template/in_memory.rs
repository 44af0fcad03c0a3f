//! In-memory template store

use super::TemplateMessage;
use crate::traits::template::TemplateProvider;
use std::collections::HashMap;

/// Template provider backed by a map of mail type to template
///
/// Useful for templates compiled into the binary and for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateStore {
    templates: HashMap<String, TemplateMessage>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, replacing any previous one for `mail_type`
    pub fn insert(&mut self, mail_type: impl Into<String>, message: TemplateMessage) {
        self.templates.insert(mail_type.into(), message);
    }

    pub fn with_template(mut self, mail_type: impl Into<String>, message: TemplateMessage) -> Self {
        self.insert(mail_type, message);
        self
    }

    pub fn contains(&self, mail_type: &str) -> bool {
        self.templates.contains_key(mail_type)
    }
}

impl TemplateProvider for InMemoryTemplateStore {
    fn load(&self, mail_type: &str) -> TemplateMessage {
        self.templates
            .get(mail_type)
            .cloned()
            .unwrap_or_else(TemplateMessage::missing)
    }
}
