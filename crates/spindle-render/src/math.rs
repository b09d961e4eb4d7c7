//! Inline and display LaTeX embeds rendered to MathML with pulldown-latex.

use pulldown_latex::{
    Parser, Storage, config::DisplayMode, config::RenderConfig, mathml::push_mathml,
};
use spindle_core::{EmbedRenderer, RenderError};

/// Math embed renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MathRenderer {
    /// Block (display) layout instead of inline.
    pub display: bool,
}

impl MathRenderer {
    pub fn inline() -> Self {
        Self { display: false }
    }

    pub fn display() -> Self {
        Self { display: true }
    }

    fn mode_class(&self) -> &'static str {
        if self.display {
            "math-display"
        } else {
            "math-inline"
        }
    }

    /// Source shown in place of the formula, with the error as a tooltip.
    fn fallback(&self, latex: &str, message: &str, out: &mut String) {
        out.push_str(&format!(
            r#"<span class="math math-error {}" title="{}"><code>{}</code></span>"#,
            self.mode_class(),
            html_escape::encode_double_quoted_attribute(message),
            html_escape::encode_text(latex),
        ));
    }
}

impl EmbedRenderer for MathRenderer {
    fn render(&self, latex: &str, out: &mut String) -> Result<(), RenderError> {
        let storage = Storage::new();
        let config = RenderConfig {
            display_mode: if self.display {
                DisplayMode::Block
            } else {
                DisplayMode::Inline
            },
            ..Default::default()
        };

        let events: Vec<_> = Parser::new(latex, &storage).collect();
        let message = events
            .iter()
            .filter_map(|e| e.as_ref().err().map(ToString::to_string))
            .collect::<Vec<_>>()
            .join("; ");
        if !message.is_empty() {
            tracing::debug!(target: "spindle::render", %message, "latex did not parse");
            self.fallback(latex, &message, out);
            return Err(RenderError::new(message));
        }

        let mut mathml = String::new();
        if let Err(err) = push_mathml(&mut mathml, events.into_iter(), config) {
            let message = err.to_string();
            self.fallback(latex, &message, out);
            return Err(RenderError::new(message));
        }
        out.push_str(&mathml);
        Ok(())
    }
}
