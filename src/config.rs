use secrecy::{ExposeSecret, SecretString};

use crate::error::{MailerError, Result};
use crate::traits::config::{ConfigProvider, MailConfiguration};
use crate::utils::{get_env_with_prefix, parse_flag};

/// SMTP settings used by a [`Dispatcher`](crate::Dispatcher) for every send
#[derive(Debug)]
pub struct Settings {
    /// SMTP server hostname
    pub host: String,
    /// SMTP server port (default: 25)
    pub port: u16,
    /// Username for authentication; also the default sender address
    pub username: Option<String>,
    /// Password for authentication
    pub password: Option<SecretString>,
    /// Upgrade the connection with STARTTLS
    pub use_tls: bool,
    /// Display name of the `Sender` mailbox
    pub sender_name: String,
    /// Display name of the `From` mailbox
    pub display_name: String,
    /// Skip explicit credentials and relay with whatever the server grants
    /// an anonymous session
    pub use_default_credentials: bool,
    /// Address used for `Sender` and `From`; falls back to `username`
    pub from_address: Option<String>,
}

impl Settings {
    /// Create settings for the given server with the defaults
    /// (port 25, no credentials, no TLS)
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            username: None,
            password: None,
            use_tls: false,
            sender_name: String::new(),
            display_name: String::new(),
            use_default_credentials: false,
            from_address: None,
        }
    }

    pub fn builder(host: impl Into<String>) -> SettingsBuilder {
        SettingsBuilder {
            settings: Self::new(host),
        }
    }

    /// Load settings from environment variables
    ///
    /// Every key is looked up with the `MAILER_` prefix first:
    /// - `SMTP_HOST` (required)
    /// - `SMTP_PORT` (optional, default: 25)
    /// - `SMTP_USERNAME` / `SMTP_PASSWORD` (optional)
    /// - `SMTP_USE_TLS` (optional, default: false)
    /// - `SMTP_FROM` (optional, defaults to the username)
    /// - `DISPLAY_NAME` / `SENDER_NAME` (optional)
    pub fn from_env() -> Result<Self> {
        let host = get_env_with_prefix("SMTP_HOST")
            .ok_or_else(|| MailerError::configuration("SMTP_HOST environment variable not set"))?;

        let port = match get_env_with_prefix("SMTP_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                MailerError::configuration(format!("Invalid SMTP_PORT value: {}", raw))
            })?,
            None => default_port(),
        };

        let settings = Self {
            host,
            port,
            username: get_env_with_prefix("SMTP_USERNAME"),
            password: get_env_with_prefix("SMTP_PASSWORD").map(SecretString::from),
            use_tls: get_env_with_prefix("SMTP_USE_TLS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            sender_name: get_env_with_prefix("SENDER_NAME").unwrap_or_default(),
            display_name: get_env_with_prefix("DISPLAY_NAME").unwrap_or_default(),
            use_default_credentials: false,
            from_address: get_env_with_prefix("SMTP_FROM"),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the invariants that must hold before a send attempt
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(MailerError::configuration("SMTP host must not be empty"));
        }
        if self.port == 0 {
            return Err(MailerError::configuration("SMTP port must be between 1 and 65535"));
        }
        Ok(())
    }

    /// Credentials to present to the server, if any
    ///
    /// An empty or missing username disables authentication, as does
    /// `use_default_credentials`.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.use_default_credentials {
            return None;
        }
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        let password = self
            .password
            .as_ref()
            .map(|p| p.expose_secret())
            .unwrap_or_default();
        Some((username, password))
    }

    /// Address used for the `Sender` and `From` headers
    pub fn sender_address(&self) -> &str {
        self.from_address
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or_default()
    }
}

fn default_port() -> u16 {
    25
}

/// Chainable builder for [`Settings`]
#[must_use = "builder does nothing until you call build()"]
#[derive(Debug)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.settings.port = port;
        self
    }

    /// Set authentication credentials
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.settings.username = Some(username.into());
        self.settings.password = Some(SecretString::from(password.into()));
        self
    }

    pub fn use_tls(mut self, enabled: bool) -> Self {
        self.settings.use_tls = enabled;
        self
    }

    pub fn sender_name(mut self, name: impl Into<String>) -> Self {
        self.settings.sender_name = name.into();
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.settings.display_name = name.into();
        self
    }

    pub fn use_default_credentials(mut self, enabled: bool) -> Self {
        self.settings.use_default_credentials = enabled;
        self
    }

    /// Set the address used for `Sender` and `From`
    pub fn from_address(mut self, address: impl Into<String>) -> Self {
        self.settings.from_address = Some(address.into());
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

/// Recipient-override policy read from environment variables
///
/// - `MAILER_OVERRIDE_TO_ADDRESS`: `true`/`1` enables the override
/// - `MAILER_TO_ADDRESS`: the address every recipient is replaced with
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfigProvider;

impl ConfigProvider for EnvConfigProvider {
    fn get(&self) -> MailConfiguration {
        let override_enabled = std::env::var("MAILER_OVERRIDE_TO_ADDRESS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let override_address = std::env::var("MAILER_TO_ADDRESS").unwrap_or_default();

        MailConfiguration {
            override_enabled,
            override_address,
        }
    }
}

/// A fixed recipient-override policy
#[derive(Debug, Clone, Default)]
pub struct StaticConfig(pub MailConfiguration);

impl StaticConfig {
    /// Policy that replaces every recipient with `address`
    pub fn override_to(address: impl Into<String>) -> Self {
        Self(MailConfiguration {
            override_enabled: true,
            override_address: address.into(),
        })
    }
}

impl ConfigProvider for StaticConfig {
    fn get(&self) -> MailConfiguration {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::new("smtp.test");

        assert_eq!(settings.host, "smtp.test");
        assert_eq!(settings.port, 25);
        assert!(settings.username.is_none());
        assert!(settings.password.is_none());
        assert!(!settings.use_tls);
        assert!(settings.credentials().is_none());
        assert_eq!(settings.sender_address(), "");
    }

    #[test]
    fn test_settings_builder() {
        let settings = Settings::builder("smtp.test.com")
            .port(587)
            .credentials("user@test.com", "pass")
            .use_tls(true)
            .sender_name("Support")
            .display_name("Support Team")
            .build();

        assert_eq!(settings.port, 587);
        assert!(settings.use_tls);
        assert_eq!(settings.sender_name, "Support");
        assert_eq!(settings.display_name, "Support Team");
        assert_eq!(settings.credentials(), Some(("user@test.com", "pass")));
        assert_eq!(settings.sender_address(), "user@test.com");
    }

    #[test]
    fn test_from_address_overrides_username() {
        let settings = Settings::builder("smtp.test.com")
            .credentials("apikey", "secret")
            .from_address("noreply@test.com")
            .build();

        assert_eq!(settings.sender_address(), "noreply@test.com");
    }

    #[test]
    fn test_empty_username_disables_credentials() {
        let settings = Settings::builder("smtp.test.com").credentials("", "secret").build();
        assert!(settings.credentials().is_none());
    }

    #[test]
    fn test_default_credentials_suppress_explicit_ones() {
        let settings = Settings::builder("smtp.test.com")
            .credentials("user", "secret")
            .use_default_credentials(true)
            .build();
        assert!(settings.credentials().is_none());
    }

    #[test]
    fn test_validate() {
        assert!(Settings::new("smtp.test").validate().is_ok());
        assert!(Settings::new("  ").validate().is_err());
        assert!(Settings::builder("smtp.test").port(0).build().validate().is_err());
    }

    #[test]
    fn test_password_is_redacted_in_debug() {
        let settings = Settings::builder("smtp.test").credentials("user", "hunter2").build();
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }

    #[test]
    fn test_static_config_override() {
        let config = StaticConfig::override_to("qa@test.com").get();
        assert!(config.override_enabled);
        assert_eq!(config.override_address, "qa@test.com");
        assert!(!StaticConfig::default().get().override_enabled);
    }
}
