//! Interface to external renderers for atomic embeds (math, diagrams).

use thiserror::Error;

/// A renderer refused or failed to render its source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Renders an embed's source text into markup.
///
/// On success the artifact has been appended to `out`. On failure `out` may
/// hold a partial or fallback rendering and the error carries the message to
/// show the user.
pub trait EmbedRenderer {
    fn render(&self, source: &str, out: &mut String) -> Result<(), RenderError>;
}

impl<R: EmbedRenderer + ?Sized> EmbedRenderer for &R {
    fn render(&self, source: &str, out: &mut String) -> Result<(), RenderError> {
        (**self).render(source, out)
    }
}

/// Render and report only the failure message, `None` meaning success.
pub fn render_message<R: EmbedRenderer + ?Sized>(renderer: &R, source: &str, out: &mut String) -> Option<String> {
    match renderer.render(source, out) {
        Ok(()) => None,
        Err(err) => {
            tracing::debug!(target: "spindle::render", %err, "embed render failed");
            Some(err.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl EmbedRenderer for Upper {
        fn render(&self, source: &str, out: &mut String) -> Result<(), RenderError> {
            if source.is_empty() {
                return Err(RenderError::new("nothing to render"));
            }
            out.push_str(&source.to_uppercase());
            Ok(())
        }
    }

    #[test]
    fn test_render_message() {
        let mut out = String::new();
        assert_eq!(render_message(&Upper, "x+y", &mut out), None);
        assert_eq!(out, "X+Y");
        assert_eq!(
            render_message(&Upper, "", &mut out).as_deref(),
            Some("nothing to render")
        );
        let dynamic: &dyn EmbedRenderer = &Upper;
        assert_eq!(render_message(dynamic, "a", &mut out), None);
        assert_eq!(out, "X+YA");
    }
}
