//! Per-frame compositing of a story: background, scrim, template content, story text, route and
//! logo, drawn back to front into a [`crate::render::CpuPainter`].

/// Background modes and aspect-fill placement.
pub mod background;
/// The frame pipeline.
pub mod compositor;
/// Template element drawing.
pub mod elements;
/// Route stroke placement and styling.
pub mod route;
/// Title, date, metrics and logo.
pub mod story;
/// Wrapped text drawing.
pub mod text;

pub use compositor::{Compositor, Decorations, Scene};
