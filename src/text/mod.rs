//! Text measurement, wrapping and shaping.

/// Parley shaping and font handling.
pub mod engine;
/// Greedy word wrapping.
pub mod wrap;
