use crate::foundation::error::{StoryplateError, StoryplateResult};

// Guard against pathological allocations from hostile SVG sizes.
const MAX_DIM: u32 = 16_384;

/// Rasterize an SVG tree into a `width`×`height` premultiplied RGBA8 buffer, stretching the
/// document's viewport to fill it.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> StoryplateResult<Vec<u8>> {
    if width > MAX_DIM || height > MAX_DIM {
        return Err(StoryplateError::render(format!(
            "svg raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    let size = tree.size();
    if !size.width().is_finite() || size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(StoryplateError::asset("svg has invalid width/height"));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| StoryplateError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}
