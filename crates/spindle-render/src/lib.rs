//! Concrete renderers for spindle atomic embeds.

pub mod diagram;
pub mod math;

pub use diagram::{DiagramRenderer, diagram_url};
pub use math::MathRenderer;
