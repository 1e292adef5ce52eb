use std::sync::Arc;

use crate::assets::color::Color;
use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{StoryplateError, StoryplateResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::model::fill::{Gradient, GradientKind};

/// Largest edge of a rasterized gradient; bigger areas are stretched by the paint transform.
const MAX_GRADIENT_DIM: u32 = 2048;

/// Where a gradient's color ramp runs, in user space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientGeometry {
    /// `t = 0` at `start`, `t = 1` at `end`, constant across the perpendicular.
    Linear {
        /// Ramp start.
        start: Point,
        /// Ramp end.
        end: Point,
    },
    /// `t` grows with the distance from `center`, reaching 1 at `radius`.
    Radial {
        /// Ramp origin.
        center: Point,
        /// Distance at which `t = 1`.
        radius: f64,
    },
    /// `t` grows clockwise from straight up around `center`.
    Conic {
        /// Rotation center.
        center: Point,
    },
}

impl GradientGeometry {
    /// Top-to-bottom across `area`.
    pub fn vertical(area: Rect) -> Self {
        let x = area.center().x;
        Self::Linear {
            start: Point::new(x, area.y0),
            end: Point::new(x, area.y1),
        }
    }

    /// Top-left to bottom-right corner of `area`.
    pub fn diagonal(area: Rect) -> Self {
        Self::Linear {
            start: Point::new(area.x0, area.y0),
            end: Point::new(area.x1, area.y1),
        }
    }

    /// CSS-style angle (`0` points up, `90` right) spanning `area` corner to corner.
    pub fn angled(area: Rect, degrees: f64) -> Self {
        let a = degrees.to_radians();
        let (dx, dy) = (a.sin(), -a.cos());
        let half = (area.width() * dx.abs() + area.height() * dy.abs()) / 2.0;
        let c = area.center();
        Self::Linear {
            start: Point::new(c.x - dx * half, c.y - dy * half),
            end: Point::new(c.x + dx * half, c.y + dy * half),
        }
    }

    /// Geometry for a model gradient over `area`. Linear gradients use `angle` when present and
    /// `default_linear` otherwise; radial ones reach the farthest corner.
    pub fn for_gradient(g: &Gradient, area: Rect, default_linear: Self) -> Self {
        match g.kind {
            GradientKind::Linear => match g.angle {
                Some(deg) => Self::angled(area, deg),
                None => default_linear,
            },
            GradientKind::Radial => Self::Radial {
                center: area.center(),
                radius: (area.width().hypot(area.height()) / 2.0).max(f64::EPSILON),
            },
            GradientKind::Conic => Self::Conic {
                center: area.center(),
            },
        }
    }

    /// Ramp parameter at `p` (not clamped).
    pub fn t_at(&self, p: Point) -> f64 {
        match *self {
            Self::Linear { start, end } => {
                let d = end - start;
                let len2 = d.hypot2();
                if len2 <= f64::EPSILON {
                    0.0
                } else {
                    (p - start).dot(d) / len2
                }
            }
            Self::Radial { center, radius } => (p - center).hypot() / radius,
            Self::Conic { center } => {
                let v = p - center;
                let turn = v.x.atan2(-v.y) / std::f64::consts::TAU;
                if turn < 0.0 { turn + 1.0 } else { turn }
            }
        }
    }
}

/// What to fill or stroke with.
#[derive(Clone, Debug)]
pub enum Paint {
    /// Flat color.
    Solid(Color),
    /// Gradient rasterized over `area` (user space).
    Gradient {
        /// Color ramp.
        gradient: Gradient,
        /// Ramp geometry.
        geometry: GradientGeometry,
        /// Region the ramp image covers; outside it the edge colors extend.
        area: Rect,
    },
    /// Bitmap with one copy placed at `dest`, extended per axis.
    Image {
        /// Pixels.
        image: DecodedImage,
        /// Placement of one copy in user space (before rotation).
        dest: Rect,
        /// Behaviour left and right of `dest`.
        x_extend: ImageExtend,
        /// Behaviour above and below `dest`.
        y_extend: ImageExtend,
        /// Clockwise rotation in degrees around `dest`'s origin.
        rotation: f64,
    },
}

impl Paint {
    /// `image` stretched over `dest`.
    pub fn stretched(image: DecodedImage, dest: Rect) -> Self {
        Self::Image {
            image,
            dest,
            x_extend: ImageExtend::Pad,
            y_extend: ImageExtend::Pad,
            rotation: 0.0,
        }
    }
}

/// How an image paint behaves outside its placed copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageExtend {
    /// Repeat the edge pixels.
    #[default]
    Pad,
    /// Tile.
    Repeat,
    /// Nothing is painted.
    Transparent,
}

/// Straight-alpha pixels of `gradient` sampled over `area` at up to `w`×`h`.
pub(crate) fn rasterize_gradient(
    gradient: &Gradient,
    geometry: &GradientGeometry,
    area: Rect,
    w: u32,
    h: u32,
) -> StoryplateResult<DecodedImage> {
    let (w, h) = (w.clamp(1, MAX_GRADIENT_DIM), h.clamp(1, MAX_GRADIENT_DIM));
    if area.width() <= 0.0 || area.height() <= 0.0 {
        return Err(StoryplateError::render("gradient area must be non-empty"));
    }
    let sx = area.width() / f64::from(w);
    let sy = area.height() / f64::from(h);
    let mut bytes = vec![0u8; (w as usize) * (h as usize) * 4];
    for y in 0..h {
        let py = area.y0 + (f64::from(y) + 0.5) * sy;
        for x in 0..w {
            let px = area.x0 + (f64::from(x) + 0.5) * sx;
            let c = gradient.sample(geometry.t_at(Point::new(px, py)));
            let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
            bytes[idx..idx + 4].copy_from_slice(&c.to_straight_rgba8());
        }
    }
    DecodedImage::from_rgba8(w, h, bytes)
}

/// Premultiplied `vello_cpu` image from straight RGBA8 pixels.
///
/// A [`ImageExtend::Transparent`] axis gets a one-pixel clear border that the pad extend then
/// repeats; the returned offsets are the border widths in image pixels.
pub(crate) fn image_paint(
    img: &DecodedImage,
    x_extend: ImageExtend,
    y_extend: ImageExtend,
) -> StoryplateResult<(vello_cpu::Image, (u32, u32))> {
    let bx = u32::from(x_extend == ImageExtend::Transparent);
    let by = u32::from(y_extend == ImageExtend::Transparent);
    let (w, h) = (img.width + 2 * bx, img.height + 2 * by);
    let mut tmp = if (bx, by) == (0, 0) {
        img.rgba8.as_ref().clone()
    } else {
        let mut out = vec![0u8; (w as usize) * (h as usize) * 4];
        let row = (img.width as usize) * 4;
        for y in 0..img.height as usize {
            let dst = ((y + by as usize) * (w as usize) + bx as usize) * 4;
            out[dst..dst + row].copy_from_slice(&img.rgba8[y * row..(y + 1) * row]);
        }
        out
    };
    premultiply_rgba8_in_place(&mut tmp);
    let pixmap = pixmap_from_premul_bytes(&tmp, w, h)?;
    let extend = |e: ImageExtend| match e {
        ImageExtend::Repeat => vello_cpu::peniko::Extend::Repeat,
        ImageExtend::Pad | ImageExtend::Transparent => vello_cpu::peniko::Extend::Pad,
    };
    let mut sampler = vello_cpu::peniko::ImageSampler::default();
    sampler.x_extend = extend(x_extend);
    sampler.y_extend = extend(y_extend);
    Ok((
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler,
        },
        (bx, by),
    ))
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> StoryplateResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StoryplateError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StoryplateError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(StoryplateError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/paint.rs"]
mod tests;
