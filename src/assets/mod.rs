//! Image assets: colors, decoding, SVG rasterization, loaders and the session image cache.

/// Session-scoped, URL-keyed image cache.
pub mod cache;
/// CSS-style colors.
pub mod color;
/// Raster and SVG decoding.
pub mod decode;
/// Byte sources for the cache.
pub mod loader;
/// usvg/resvg rasterization.
pub mod svg_raster;
