//! Template documents and the exporter's story state.

/// Elements and their styling.
pub mod element;
/// Fills, gradients and patterns.
pub mod fill;
/// Observable story store.
pub mod store;
/// Story state snapshot.
pub mod story;
/// Templates, pages and layers.
pub mod template;
