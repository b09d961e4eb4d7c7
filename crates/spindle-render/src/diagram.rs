//! Diagram embeds served by a PlantUML server.
//!
//! The diagram source is hex encoded into the request path with PlantUML's
//! `~h` prefix, so no compression step is needed.

use std::fmt::Write;

use spindle_core::{EmbedConfig, EmbedRenderer, RenderError};

/// PlantUML URL for `source` under `base_url`.
pub fn diagram_url(base_url: &str, source: &str) -> String {
    let mut url = String::with_capacity(base_url.len() + 2 + source.len() * 2);
    url.push_str(base_url);
    url.push_str("~h");
    for byte in source.bytes() {
        // Writing to a String cannot fail.
        let _ = write!(url, "{byte:02x}");
    }
    url
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagramRenderer {
    pub base_url: String,
}

impl DiagramRenderer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &EmbedConfig) -> Self {
        Self::new(config.diagram_base_url.clone())
    }
}

impl Default for DiagramRenderer {
    fn default() -> Self {
        Self::from_config(&EmbedConfig::default())
    }
}

impl EmbedRenderer for DiagramRenderer {
    fn render(&self, source: &str, out: &mut String) -> Result<(), RenderError> {
        if source.trim().is_empty() {
            return Err(RenderError::new("diagram source is empty"));
        }
        let url = diagram_url(&self.base_url, source);
        tracing::trace!(target: "spindle::render", len = source.len(), "diagram url built");
        out.push_str(&format!(
            r#"<img class="diagram" src="{}" alt="diagram">"#,
            html_escape::encode_double_quoted_attribute(&url)
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_url() {
        insta::assert_snapshot!(
            diagram_url("https://example.test/svg/", "A->B"),
            @"https://example.test/svg/~h412d3e42"
        );
    }

    #[test]
    fn test_render_img() {
        let mut out = String::new();
        DiagramRenderer::new("/uml/").render("a", &mut out).unwrap();
        assert_eq!(out, r#"<img class="diagram" src="/uml/~h61" alt="diagram">"#);
        assert!(DiagramRenderer::default().render("  ", &mut out).is_err());
    }
}
