use crate::assets::cache::Lookup;
use crate::assets::color::Color;
use crate::assets::decode::CachedImage;
use crate::compose::compositor::DrawCtx;
use crate::effects::monochrome::apply_monochrome;
use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::StoryplateResult;
use crate::model::fill::{Fill, Gradient, Pattern, PatternRepeat};
use crate::model::story::BackgroundMode;
use crate::model::template::Page;
use crate::render::{GradientGeometry, ImageExtend, Paint};

/// Stops of the `gradient` background mode, top to bottom.
pub const GRADIENT_MODE_STOPS: [(f64, Color); 2] = [
    (0.0, Color::rgb8(0x66, 0x7e, 0xea)),
    (1.0, Color::rgb8(0x76, 0x4b, 0xa2)),
];

/// Stripe colors of the `flag` background mode, left to right.
pub const FLAG_STRIPES: [[u8; 3]; 3] = [[0x00, 0x55, 0xA4], [0xFF, 0xFF, 0xFF], [0xEF, 0x41, 0x35]];

/// Rectangle an image of `src_w`×`src_h` is drawn into so it covers `dest` without distortion,
/// centered on the overflowing axis.
pub fn aspect_fill(src_w: f64, src_h: f64, dest: Rect) -> Rect {
    let img_aspect = src_w / src_h;
    let dest_aspect = dest.width() / dest.height();
    if img_aspect > dest_aspect {
        let h = dest.height();
        let w = h * img_aspect;
        let x = dest.x0 + (dest.width() - w) / 2.0;
        Rect::new(x, dest.y0, x + w, dest.y0 + h)
    } else {
        let w = dest.width();
        let h = w / img_aspect;
        let y = dest.y0 + (dest.height() - h) / 2.0;
        Rect::new(dest.x0, y, dest.x0 + w, y + h)
    }
}

/// Part of the source image (in source pixels) that stays visible after [`aspect_fill`].
pub fn visible_source(src_w: f64, src_h: f64, dest: Rect) -> Rect {
    let drawn = aspect_fill(src_w, src_h, dest);
    let k = drawn.width() / src_w;
    Rect::new(
        (dest.x0 - drawn.x0) / k,
        (dest.y0 - drawn.y0) / k,
        (dest.x1 - drawn.x0) / k,
        (dest.y1 - drawn.y0) / k,
    )
}

pub(crate) fn draw_background(ctx: &mut DrawCtx<'_>, page: Option<&Page>) -> StoryplateResult<()> {
    let full = ctx.canvas.rect();
    match ctx.story.background_mode {
        BackgroundMode::Image => {
            let url = ctx
                .story
                .image
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(ctx.opts.default_background.as_str())
                .to_owned();
            let mono = ctx.story.is_mono;
            match ctx.cache.request(&url) {
                Lookup::Ready(img) => {
                    draw_cover(ctx, &img, full, Affine::IDENTITY, mono)?;
                }
                Lookup::Pending => tracing::debug!(url = %url, "background not loaded yet"),
            }
        }
        BackgroundMode::Solid => {
            let c = if ctx.story.is_light_text() {
                Color::BLACK
            } else {
                Color::WHITE
            };
            ctx.painter
                .fill_rect(full, Affine::IDENTITY, &Paint::Solid(c))?;
        }
        BackgroundMode::Gradient => {
            let paint = Paint::Gradient {
                gradient: Gradient::linear(GRADIENT_MODE_STOPS),
                geometry: GradientGeometry::vertical(full),
                area: full,
            };
            ctx.painter.fill_rect(full, Affine::IDENTITY, &paint)?;
        }
        BackgroundMode::Flag => {
            let stripe = full.width() / 3.0;
            for (i, [r, g, b]) in FLAG_STRIPES.into_iter().enumerate() {
                let x0 = full.x0 + stripe * i as f64;
                ctx.painter.fill_rect(
                    Rect::new(x0, full.y0, x0 + stripe, full.y1),
                    Affine::IDENTITY,
                    &Paint::Solid(Color::rgb8(r, g, b)),
                )?;
            }
        }
        BackgroundMode::Template => match page.and_then(|p| p.background.as_ref()) {
            Some(fill) => {
                let geometry = GradientGeometry::diagonal(full);
                if let Some(paint) = resolve_fill(ctx, fill, full, geometry) {
                    ctx.painter.fill_rect(full, Affine::IDENTITY, &paint)?;
                }
            }
            None => {
                ctx.painter
                    .fill_rect(full, Affine::IDENTITY, &Paint::Solid(Color::BLACK))?;
            }
        },
    }
    Ok(())
}

/// Aspect-fill `img` into `dest`. With `mono`, only the visible crop is filtered.
pub(crate) fn draw_cover(
    ctx: &mut DrawCtx<'_>,
    img: &CachedImage,
    dest: Rect,
    transform: Affine,
    mono: bool,
) -> StoryplateResult<()> {
    let (iw, ih) = img.size();
    if iw <= 0.0 || ih <= 0.0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
        return Ok(());
    }
    let scale = transform.determinant().abs().sqrt().max(f64::EPSILON);
    let w = (dest.width() * scale).round().max(1.0) as u32;
    let h = (dest.height() * scale).round().max(1.0) as u32;
    let region = match img.render_region(visible_source(iw, ih, dest), w, h) {
        Ok(region) => region,
        Err(e) => {
            tracing::warn!(error = %e, "image region unavailable");
            return Ok(());
        }
    };
    let region = if mono {
        apply_monochrome(&region)?
    } else {
        region
    };
    ctx.painter.draw_image(&region, dest, transform)
}

/// Render paint for a template fill over `area`. Patterns whose image is not cached yet give
/// `None` (and are queued).
pub(crate) fn resolve_fill(
    ctx: &mut DrawCtx<'_>,
    fill: &Fill,
    area: Rect,
    default_linear: GradientGeometry,
) -> Option<Paint> {
    match fill {
        Fill::Solid(c) => Some(Paint::Solid(*c)),
        Fill::Gradient(g) => Some(Paint::Gradient {
            gradient: g.clone(),
            geometry: GradientGeometry::for_gradient(g, area, default_linear),
            area,
        }),
        Fill::Pattern(p) => pattern_paint(ctx, p, area),
    }
}

fn pattern_paint(ctx: &mut DrawCtx<'_>, pattern: &Pattern, area: Rect) -> Option<Paint> {
    let candidates = ctx.opts.asset_candidates(&pattern.image_id);
    let (_, img) = ctx
        .cache
        .first_ready(candidates.iter().map(String::as_str))?;
    let (iw, ih) = img.size();
    let scale = if pattern.scale.is_finite() && pattern.scale > 0.0 {
        pattern.scale
    } else {
        1.0
    };
    let tile_w = (iw * scale).round().max(1.0);
    let tile_h = (ih * scale).round().max(1.0);
    let tile = match img.render_region(Rect::new(0.0, 0.0, iw, ih), tile_w as u32, tile_h as u32) {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(error = %e, image = %pattern.image_id, "pattern tile unavailable");
            return None;
        }
    };
    let (x_extend, y_extend) = match pattern.repeat {
        PatternRepeat::Repeat => (ImageExtend::Repeat, ImageExtend::Repeat),
        PatternRepeat::RepeatX => (ImageExtend::Repeat, ImageExtend::Transparent),
        PatternRepeat::RepeatY => (ImageExtend::Transparent, ImageExtend::Repeat),
        PatternRepeat::NoRepeat => (ImageExtend::Transparent, ImageExtend::Transparent),
    };
    Some(Paint::Image {
        image: tile,
        dest: Rect::from_origin_size(area.origin(), (tile_w, tile_h)),
        x_extend,
        y_extend,
        rotation: pattern.rotation,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/background.rs"]
mod tests;
