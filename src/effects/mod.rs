//! Per-pixel image filters.

/// Grayscale with contrast and brightness.
pub mod monochrome;
