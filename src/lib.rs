//! Storyplate composites parametric story templates (background photo, GPS route, styled text,
//! club logo) onto a fixed-resolution raster, and provides the editing core used to build those
//! templates interactively.
//!
//! The public API is session-oriented:
//!
//! - Hold the exporter's [`StoryState`] in a [`StoryStore`] and render it through an
//!   [`ExportSession`] (PNG bytes or a data URL)
//! - Edit a [`Template`] through an [`EditorSession`], which owns the working copy and turns
//!   pointer and wheel events into [`EditorCommand`]s
//! - Draw either one with a [`Compositor`], which reads images from an injected [`ImageCache`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Image assets and the session image cache.
pub mod assets;
/// Per-frame drawing of story and template content.
pub mod compose;
/// Compositor and cache configuration.
pub mod config;
/// Interactive editing core.
pub mod editor;
/// Pixel filters.
pub mod effects;
/// Shared value types and errors.
pub mod foundation;
/// Route decoding and projection.
pub mod geo;
/// Templates and story state.
pub mod model;
/// CPU rasterization.
pub mod render;
/// Exporter session.
pub mod session;
/// Text wrapping and shaping.
pub mod text;

pub use crate::assets::cache::{ImageCache, ImageCacheOpts, Lookup};
pub use crate::assets::color::Color;
pub use crate::assets::loader::{AssetLoader, FsLoader, MemoryLoader};
pub use crate::compose::{Compositor, Decorations, Scene};
pub use crate::config::{CompositorOpts, StoryplateConfig};
pub use crate::editor::{EditorCommand, EditorSession, HitMode, HitTester, Viewport};
pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Insets, PageFormat, Point, Rect, Size, Vec2,
};
pub use crate::foundation::error::{StoryplateError, StoryplateResult};
pub use crate::geo::projector::{LatLng, RouteProjection};
pub use crate::model::element::{Element, ElementKind};
pub use crate::model::store::StoryStore;
pub use crate::model::story::{BackgroundMode, StoryState};
pub use crate::model::template::{Page, Template};
pub use crate::render::FrameRGBA;
pub use crate::session::{ExportSession, ExportSessionOpts};
pub use crate::text::engine::FontBook;
