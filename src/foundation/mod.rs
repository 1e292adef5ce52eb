//! Core value types, errors and pixel math shared by every layer of the crate.

/// Canvas sizes, page formats, insets and geometry re-exports.
pub mod core;
/// Error taxonomy.
pub mod error;
/// Pixel and color math helpers.
pub mod math;
