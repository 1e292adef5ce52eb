use crate::assets::decode::DecodedImage;
use crate::foundation::error::{StoryplateError, StoryplateResult};

const CONTRAST: f64 = 1.5;
const BRIGHTNESS: f64 = 1.1;

/// Monochrome value of one straight-alpha pixel; alpha is kept.
pub fn monochrome_pixel(px: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = px;
    let gray = (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)).round();
    let v = ((gray - 128.0) * CONTRAST + 128.0 * BRIGHTNESS)
        .clamp(0.0, 255.0)
        .round() as u8;
    [v, v, v, a]
}

/// Filtered copy of straight-alpha RGBA8 bytes.
pub fn apply_monochrome_rgba8(src: &[u8]) -> StoryplateResult<Vec<u8>> {
    if !src.len().is_multiple_of(4) {
        return Err(StoryplateError::render(
            "monochrome expects a whole number of rgba8 pixels",
        ));
    }
    let mut out = Vec::with_capacity(src.len());
    for px in src.chunks_exact(4) {
        out.extend_from_slice(&monochrome_pixel([px[0], px[1], px[2], px[3]]));
    }
    Ok(out)
}

/// Filtered copy of an image region. The source is left untouched.
pub fn apply_monochrome(region: &DecodedImage) -> StoryplateResult<DecodedImage> {
    let rgba = apply_monochrome_rgba8(&region.rgba8)?;
    DecodedImage::from_rgba8(region.width, region.height, rgba)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/monochrome.rs"]
mod tests;
