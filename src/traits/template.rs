//! Template loading and rendering traits

/// Raw template text plus its metadata
pub trait TextProvider: Send + Sync {
    /// Body template
    fn text(&self) -> &str;

    /// Subject template
    fn subject(&self) -> &str;

    /// Whether the template was found and parsed
    fn loaded(&self) -> bool;

    /// Body format, when the provider records one
    ///
    /// `None` means the provider has no such metadata and the body is sent as
    /// plain text.
    fn is_html(&self) -> Option<bool> {
        None
    }
}

/// Renders template text by running it through a substitution pipeline
pub trait RenderEngine: Send + Sync {
    /// The template this engine is bound to
    fn text_provider(&self) -> &dyn TextProvider;

    /// Format the text produced by `template`
    ///
    /// The supplier is only invoked when the engine is ready to render.
    fn format(&self, template: &dyn Fn() -> String) -> String;
}

/// Loads templates by mail type
pub trait TemplateProvider: Send + Sync {
    /// Load the template registered under `mail_type`
    ///
    /// Missing or invalid templates come back with `loaded() == false`
    /// rather than as an error.
    fn load(&self, mail_type: &str) -> crate::template::TemplateMessage;
}
