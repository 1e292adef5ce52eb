use std::sync::Arc;

use anyhow::Context;

use crate::assets::svg_raster::rasterize_svg_to_premul_rgba8;
use crate::foundation::error::{StoryplateError, StoryplateResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// Decoded raster image in straight (non-premultiplied) RGBA8 form.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major straight-alpha RGBA8 bytes.
    pub rgba8: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap raw straight RGBA8 bytes, checking the length.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> StoryplateResult<Self> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if rgba8.len() != expected || width == 0 || height == 0 {
            return Err(StoryplateError::asset(format!(
                "rgba8 buffer of {} bytes does not match {width}x{height}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        })
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    pub(crate) fn to_rgba_image(&self) -> StoryplateResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.rgba8.as_ref().clone())
            .ok_or_else(|| StoryplateError::asset("rgba8 buffer does not match dimensions"))
    }
}

/// A decoded asset as held by the image cache.
#[derive(Clone, Debug)]
pub enum CachedImage {
    /// Bitmap formats decoded by the `image` crate.
    Raster(DecodedImage),
    /// SVG documents, rasterized on demand at the size they are drawn.
    Svg(Arc<usvg::Tree>),
}

impl CachedImage {
    /// Intrinsic size in pixels.
    pub fn size(&self) -> (f64, f64) {
        match self {
            Self::Raster(img) => (f64::from(img.width), f64::from(img.height)),
            Self::Svg(tree) => (
                f64::from(tree.size().width()),
                f64::from(tree.size().height()),
            ),
        }
    }

    /// Produce straight RGBA8 pixels for `src` (a crop in intrinsic pixels) scaled to
    /// `width`×`height`.
    pub fn render_region(
        &self,
        src: kurbo::Rect,
        width: u32,
        height: u32,
    ) -> StoryplateResult<DecodedImage> {
        if width == 0 || height == 0 {
            return Err(StoryplateError::render("image region must be non-empty"));
        }
        match self {
            Self::Raster(img) => {
                let full = img.to_rgba_image()?;
                let x = src.x0.floor().clamp(0.0, f64::from(img.width - 1)) as u32;
                let y = src.y0.floor().clamp(0.0, f64::from(img.height - 1)) as u32;
                let w = (src.width().round() as u32).clamp(1, img.width - x);
                let h = (src.height().round() as u32).clamp(1, img.height - y);
                let cropped = image::imageops::crop_imm(&full, x, y, w, h).to_image();
                let scaled = if (w, h) == (width, height) {
                    cropped
                } else {
                    image::imageops::resize(
                        &cropped,
                        width,
                        height,
                        image::imageops::FilterType::Triangle,
                    )
                };
                DecodedImage::from_rgba8(width, height, scaled.into_raw())
            }
            Self::Svg(tree) => {
                let (iw, ih) = self.size();
                let sx = f64::from(width) / src.width().max(1e-6);
                let sy = f64::from(height) / src.height().max(1e-6);
                let full_w = (iw * sx).ceil().max(1.0) as u32;
                let full_h = (ih * sy).ceil().max(1.0) as u32;
                let mut rgba = rasterize_svg_to_premul_rgba8(tree, full_w, full_h)?;
                unpremultiply_rgba8_in_place(&mut rgba);
                let full = DecodedImage::from_rgba8(full_w, full_h, rgba)?;
                if (full_w, full_h) == (width, height) {
                    return Ok(full);
                }
                let scaled_src =
                    kurbo::Rect::new(src.x0 * sx, src.y0 * sy, src.x1 * sx, src.y1 * sy);
                Self::Raster(full).render_region(scaled_src, width, height)
            }
        }
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) to straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> StoryplateResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    DecodedImage::from_rgba8(width, height, rgba.into_raw())
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> StoryplateResult<Arc<usvg::Tree>> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(Arc::new(tree))
}

/// Decode either an SVG document or a bitmap, sniffing the content.
pub fn decode_asset(url: &str, bytes: &[u8]) -> StoryplateResult<CachedImage> {
    if looks_like_svg(url, bytes) {
        return parse_svg(bytes).map(CachedImage::Svg);
    }
    decode_image(bytes).map(CachedImage::Raster)
}

fn looks_like_svg(url: &str, bytes: &[u8]) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if path.to_ascii_lowercase().ends_with(".svg") || url.starts_with("data:image/svg+xml") {
        return true;
    }
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
