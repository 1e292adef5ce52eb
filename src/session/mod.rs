//! Exporter session: story store, asset cache and compositor behind one dirty flag.

/// Export session and its options.
pub mod export;

pub use export::{ExportSession, ExportSessionOpts, ExportStats};
