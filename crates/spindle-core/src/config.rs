//! Editor configuration.
//!
//! Every field has a default, so a partial JSON document (or none at all)
//! yields a usable configuration.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Style classes a pasted span may carry into the document.
pub const DEFAULT_PASTE_STYLES: &[&str] = &[
    "edt-b",
    "edt-u",
    "edt-i",
    "edt-sup",
    "edt-sub",
    "edt-code",
    "edt-strike",
    "edt-hl",
];

pub const DEFAULT_DIAGRAM_BASE_URL: &str = "https://www.plantuml.com/plantuml/svg/";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub paste: PasteConfig,
    pub render: EmbedConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasteConfig {
    /// Classes kept on pasted spans; anything else is flattened to plain text.
    pub allowed_styles: Vec<SmolStr>,
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            allowed_styles: DEFAULT_PASTE_STYLES.iter().map(|s| SmolStr::new(s)).collect(),
        }
    }
}

impl PasteConfig {
    pub fn allows(&self, class: &str) -> bool {
        self.allowed_styles.iter().any(|s| s == class)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Diagram server prefix; the encoded source is appended to it.
    pub diagram_base_url: String,
    /// Render math as display (block) rather than inline.
    pub display_math: bool,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            diagram_base_url: DEFAULT_DIAGRAM_BASE_URL.to_string(),
            display_math: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!(config.paste.allows("edt-b"));
        assert!(config.paste.allows("edt-hl"));
        assert!(!config.paste.allows("bold"));
        assert!(config.render.display_math);
        assert_eq!(config.render.diagram_base_url, DEFAULT_DIAGRAM_BASE_URL);
    }
}
