//! Placeholder substitution pipeline and the default render engine

use super::TemplateMessage;
use crate::traits::template::{RenderEngine, TextProvider};
use std::fmt;
use std::sync::Arc;

/// A single transformation applied to template text
pub trait RenderStep: Send + Sync {
    fn apply(&self, text: String) -> String;
}

impl<F> RenderStep for F
where
    F: Fn(String) -> String + Send + Sync,
{
    fn apply(&self, text: String) -> String {
        self(text)
    }
}

/// Replaces every `{key}` with `value`
struct Placeholder {
    token: String,
    value: String,
}

impl RenderStep for Placeholder {
    fn apply(&self, text: String) -> String {
        if text.contains(&self.token) {
            text.replace(&self.token, &self.value)
        } else {
            text
        }
    }
}

/// Ordered sequence of render steps
///
/// Steps run in the order they were added, each one receiving the output of
/// the previous step.
#[derive(Clone, Default)]
pub struct TemplatePipeline {
    steps: Vec<Arc<dyn RenderStep>>,
}

impl TemplatePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitute `{key}` with `value`
    pub fn map(mut self, key: impl AsRef<str>, value: impl fmt::Display) -> Self {
        self.steps.push(Arc::new(Placeholder {
            token: format!("{{{}}}", key.as_ref()),
            value: value.to_string(),
        }));
        self
    }

    /// Append a custom step
    pub fn step<S>(mut self, step: S) -> Self
    where
        S: RenderStep + 'static,
    {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run `text` through every step
    pub fn render(&self, text: String) -> String {
        self.steps.iter().fold(text, |acc, step| step.apply(acc))
    }
}

impl fmt::Debug for TemplatePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplatePipeline")
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// Render engine bound to one template and one pipeline
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    message: TemplateMessage,
    pipeline: TemplatePipeline,
}

impl TemplateEngine {
    pub fn new(message: TemplateMessage, pipeline: TemplatePipeline) -> Self {
        Self { message, pipeline }
    }

    pub fn message(&self) -> &TemplateMessage {
        &self.message
    }

    pub fn pipeline(&self) -> &TemplatePipeline {
        &self.pipeline
    }
}

impl RenderEngine for TemplateEngine {
    fn text_provider(&self) -> &dyn TextProvider {
        &self.message
    }

    fn format(&self, template: &dyn Fn() -> String) -> String {
        self.pipeline.render(template())
    }
}
