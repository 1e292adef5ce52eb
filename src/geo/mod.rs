//! Route geometry: polyline decoding and projection into canvas space.

/// Encoded polyline codec.
pub mod polyline;
/// Geographic → canvas projection.
pub mod projector;
