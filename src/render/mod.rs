//! CPU rasterization: a `vello_cpu` painter, paint sources, and the output frame type.

/// Painter over a `vello_cpu` render context.
pub mod cpu;
/// Premultiplied RGBA8 output frames and PNG encoding.
pub mod frame;
/// Solid, gradient and image paints.
pub mod paint;

pub use cpu::{CpuPainter, StrokeOpts};
pub use frame::FrameRGBA;
pub use paint::{GradientGeometry, ImageExtend, Paint};
