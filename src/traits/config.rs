//! Recipient-override policy provider

use serde::{Deserialize, Serialize};

/// Common mail configuration consulted when a template is applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MailConfiguration {
    /// Replace every recipient with `override_address`
    #[serde(default, rename = "override_to_address")]
    pub override_enabled: bool,
    #[serde(default, rename = "to_address")]
    pub override_address: String,
}

impl MailConfiguration {
    /// The address recipients are replaced with, if the override applies
    ///
    /// An enabled override with an empty address is treated as disabled.
    pub fn active_override(&self) -> Option<&str> {
        if self.override_enabled && !self.override_address.trim().is_empty() {
            Some(self.override_address.trim())
        } else {
            None
        }
    }
}

/// Source of the [`MailConfiguration`]
pub trait ConfigProvider: Send + Sync {
    fn get(&self) -> MailConfiguration;
}
