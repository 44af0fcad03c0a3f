use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The main error type for template-mailer
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    /// Missing or invalid dispatcher configuration, raised before any
    /// notification fires.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MailerError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_template(msg: impl Into<String>) -> Self {
        Self::InvalidTemplate(msg.into())
    }
}

/// Result type alias for template-mailer operations
pub type Result<T> = std::result::Result<T, MailerError>;

/// Error raised by a [`Mailer`](crate::Mailer) when a message could not be
/// delivered.
///
/// The dispatcher walks the `source()` chain of this error, outermost first,
/// to build the aggregated error text handed to `Completed` subscribers. The
/// display output is only this level's message so each link of the chain
/// contributes exactly one segment.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying cause
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Iterate over this error and all of its causes, outermost first
    pub fn chain(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
        std::iter::successors(Some(self as &(dyn StdError + 'static)), |&err| err.source())
    }

    /// Wrap a foreign error whose `Display` repeats its own causes.
    ///
    /// Every level of `source`'s chain becomes one `TransportError` holding
    /// only that level's text: the display of the next cause is stripped from
    /// the end of each message, and levels left empty are skipped.
    pub fn from_error(message: impl Into<String>, source: &(dyn StdError + 'static)) -> Self {
        let mut levels = Vec::new();
        let mut current = Some(source);
        while let Some(err) = current {
            let text = err.to_string();
            let own = match err.source().map(|next| next.to_string()) {
                Some(next) if !next.is_empty() => text
                    .strip_suffix(next.as_str())
                    .map(|head| head.trim_end_matches([':', ' ']))
                    .unwrap_or(text.as_str())
                    .to_string(),
                _ => text.clone(),
            };
            if !own.is_empty() {
                levels.push(own);
            }
            current = err.source();
        }

        let cause = levels
            .into_iter()
            .rev()
            .fold(None, |inner: Option<TransportError>, level| {
                Some(match inner {
                    Some(inner) => TransportError::with_source(level, inner),
                    None => TransportError::new(level),
                })
            });

        Self {
            message: message.into(),
            source: cause.map(|cause| Box::new(cause) as BoxError),
        }
    }
}
