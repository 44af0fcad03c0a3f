//! JSON mail configuration: templates plus the common recipient-override policy
//!
//! ```json
//! {
//!   "common": { "override_to_address": false, "to_address": "" },
//!   "templates": [
//!     { "name": "welcome", "subject": "Welcome {Name}", "body": "<p>Hi {Name}</p>", "is_html": true }
//!   ]
//! }
//! ```

use super::TemplateMessage;
use crate::error::{MailerError, Result};
use crate::traits::config::{ConfigProvider, MailConfiguration};
use crate::traits::template::TemplateProvider;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct MailDocument {
    #[serde(default)]
    common: MailConfiguration,
    #[serde(default)]
    templates: Vec<TemplateDefinition>,
}

#[derive(Debug, Deserialize)]
struct TemplateDefinition {
    name: String,
    subject: String,
    body: String,
    #[serde(default)]
    is_html: bool,
}

/// Template and config provider loaded from a JSON document
#[derive(Debug, Clone, Default)]
pub struct JsonTemplateStore {
    common: MailConfiguration,
    templates: HashMap<String, TemplateMessage>,
}

impl JsonTemplateStore {
    /// Read and parse a JSON mail configuration file
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let store: Self = raw.parse()?;
        tracing::debug!(
            path = %path.display(),
            templates = store.templates.len(),
            "Loaded mail configuration"
        );
        Ok(store)
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl FromStr for JsonTemplateStore {
    type Err = MailerError;

    fn from_str(raw: &str) -> Result<Self> {
        let document: MailDocument = serde_json::from_str(raw)?;

        let mut templates = HashMap::with_capacity(document.templates.len());
        for definition in document.templates {
            let name = definition.name.trim().to_string();
            if name.is_empty() {
                return Err(MailerError::invalid_template("template name must not be empty"));
            }
            if templates.contains_key(&name) {
                return Err(MailerError::invalid_template(format!(
                    "duplicate template name '{}'",
                    name
                )));
            }
            templates.insert(
                name,
                TemplateMessage::new(definition.subject, definition.body, definition.is_html),
            );
        }

        Ok(Self {
            common: document.common,
            templates,
        })
    }
}

impl TemplateProvider for JsonTemplateStore {
    fn load(&self, mail_type: &str) -> TemplateMessage {
        self.templates
            .get(mail_type)
            .cloned()
            .unwrap_or_else(TemplateMessage::missing)
    }
}

impl ConfigProvider for JsonTemplateStore {
    fn get(&self) -> MailConfiguration {
        self.common.clone()
    }
}
