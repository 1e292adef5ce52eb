use std::collections::HashMap;

use crate::assets::color::Color;
use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect};
use crate::foundation::error::{StoryplateError, StoryplateResult};
use crate::model::element::{LineCap, LineJoin};
use crate::model::fill::GradientKind;
use crate::render::frame::FrameRGBA;
use crate::render::paint::{GradientGeometry, ImageExtend, Paint, image_paint, rasterize_gradient};
use crate::text::engine::{FontFace, TextBrush};

/// Stroke parameters in user units.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeOpts {
    /// Line width.
    pub width: f64,
    /// End caps.
    pub cap: LineCap,
    /// Corner joins.
    pub join: LineJoin,
    /// Dash lengths (on, off, ...); empty draws a solid line.
    pub dash: Vec<f64>,
}

impl StrokeOpts {
    /// Solid stroke with round caps and joins.
    pub fn round(width: f64) -> Self {
        Self {
            width,
            cap: LineCap::Round,
            join: LineJoin::Round,
            dash: Vec::new(),
        }
    }

    /// Set end caps.
    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    /// Set corner joins.
    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    /// Set the dash pattern.
    pub fn with_dash(mut self, dash: Vec<f64>) -> Self {
        self.dash = dash;
        self
    }

    fn to_cpu(&self) -> vello_cpu::kurbo::Stroke {
        use vello_cpu::kurbo::{Cap, Join};

        let cap = match self.cap {
            LineCap::Butt => Cap::Butt,
            LineCap::Round => Cap::Round,
            LineCap::Square => Cap::Square,
        };
        let join = match self.join {
            LineJoin::Miter => Join::Miter,
            LineJoin::Round => Join::Round,
            LineJoin::Bevel => Join::Bevel,
        };
        let stroke = vello_cpu::kurbo::Stroke::new(self.width)
            .with_caps(cap)
            .with_join(join);
        let dashes = self
            .dash
            .iter()
            .copied()
            .filter(|d| d.is_finite() && *d >= 0.0)
            .collect::<Vec<_>>();
        if dashes.iter().any(|d| *d > 0.0) {
            stroke.with_dashes(0.0, dashes)
        } else {
            stroke
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    bits: Vec<u64>,
    w: u32,
    h: u32,
}

impl GradientKey {
    fn new(
        paint_gradient: &crate::model::fill::Gradient,
        geometry: &GradientGeometry,
        area: Rect,
        w: u32,
        h: u32,
    ) -> Self {
        let mut bits = vec![match paint_gradient.kind {
            GradientKind::Linear => 0,
            GradientKind::Radial => 1,
            GradientKind::Conic => 2,
        }];
        for stop in &paint_gradient.stops {
            bits.push(stop.offset.to_bits());
            bits.push(u64::from(u32::from_le_bytes(stop.color.to_straight_rgba8())));
        }
        let pts: [f64; 4] = match *geometry {
            GradientGeometry::Linear { start, end } => [start.x, start.y, end.x, end.y],
            GradientGeometry::Radial { center, radius } => [center.x, center.y, radius, -1.0],
            GradientGeometry::Conic { center } => [center.x, center.y, -2.0, -2.0],
        };
        bits.extend(pts.iter().map(|v| v.to_bits()));
        bits.extend([area.x0, area.y0, area.x1, area.y1].iter().map(|v| v.to_bits()));
        Self { bits, w, h }
    }
}

/// CPU rasterizer for one canvas at a time, built on `vello_cpu`.
///
/// All drawing calls take a user-space `transform`; paints are positioned in that same space.
/// The render context and rasterized gradients are reused across frames of the same size.
pub struct CpuPainter {
    ctx: vello_cpu::RenderContext,
    canvas: Canvas,
    layers: usize,
    gradient_cache: HashMap<GradientKey, vello_cpu::Image>,
}

impl std::fmt::Debug for CpuPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuPainter")
            .field("canvas", &self.canvas)
            .field("layers", &self.layers)
            .field("gradient_cache", &self.gradient_cache.len())
            .finish_non_exhaustive()
    }
}

impl CpuPainter {
    /// A painter with a transparent `canvas`.
    pub fn new(canvas: Canvas) -> StoryplateResult<Self> {
        let (w, h) = canvas.to_u16()?;
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            canvas,
            layers: 0,
            gradient_cache: HashMap::new(),
        })
    }

    /// Start a new frame, reusing the context when the size is unchanged.
    pub fn begin(&mut self, canvas: Canvas) -> StoryplateResult<()> {
        let (w, h) = canvas.to_u16()?;
        if self.ctx.width() == w && self.ctx.height() == h {
            self.ctx.reset();
        } else {
            self.ctx = vello_cpu::RenderContext::new(w, h);
            self.gradient_cache.clear();
        }
        self.canvas = canvas;
        self.layers = 0;
        Ok(())
    }

    /// Size of the frame being painted.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Fill `rect` with `paint`.
    pub fn fill_rect(
        &mut self,
        rect: Rect,
        transform: Affine,
        paint: &Paint,
    ) -> StoryplateResult<()> {
        self.apply_paint(paint, transform)?;
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.fill_rect(&rect_to_cpu(rect));
        Ok(())
    }

    /// Fill `path` (non-zero winding) with `paint`.
    pub fn fill_path(
        &mut self,
        path: &BezPath,
        transform: Affine,
        paint: &Paint,
    ) -> StoryplateResult<()> {
        self.apply_paint(paint, transform)?;
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.fill_path(&bezpath_to_cpu(path));
        Ok(())
    }

    /// Stroke `path` with `paint`.
    pub fn stroke_path(
        &mut self,
        path: &BezPath,
        transform: Affine,
        stroke: &StrokeOpts,
        paint: &Paint,
    ) -> StoryplateResult<()> {
        if !stroke.width.is_finite() || stroke.width <= 0.0 {
            return Ok(());
        }
        self.apply_paint(paint, transform)?;
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_stroke(stroke.to_cpu());
        self.ctx.stroke_path(&bezpath_to_cpu(path));
        Ok(())
    }

    /// Stretch `image` into `dest`.
    pub fn draw_image(
        &mut self,
        image: &DecodedImage,
        dest: Rect,
        transform: Affine,
    ) -> StoryplateResult<()> {
        if dest.width() <= 0.0 || dest.height() <= 0.0 {
            return Ok(());
        }
        self.fill_rect(dest, transform, &Paint::stretched(image.clone(), dest))
    }

    /// Draw every glyph run of `layout` with its brush color. The layout's origin maps to
    /// `transform`'s origin.
    pub fn draw_text_layout(
        &mut self,
        layout: &parley::Layout<TextBrush>,
        face: &FontFace,
        transform: Affine,
    ) {
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(face.data())
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    /// Group subsequent drawing under `opacity`. Returns `false` (and pushes nothing) when the
    /// opacity is already 1.
    pub fn push_opacity(&mut self, opacity: f64) -> bool {
        let o = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        if o >= 1.0 {
            return false;
        }
        self.ctx.push_opacity_layer(o as f32);
        self.layers += 1;
        true
    }

    /// Close the innermost opacity group.
    pub fn pop_layer(&mut self) {
        if self.layers > 0 {
            self.ctx.pop_layer();
            self.layers -= 1;
        }
    }

    /// Rasterize everything drawn since [`CpuPainter::begin`].
    pub fn finish(&mut self) -> StoryplateResult<FrameRGBA> {
        while self.layers > 0 {
            self.pop_layer();
        }
        let (w, h) = self.canvas.to_u16()?;
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn apply_paint(&mut self, paint: &Paint, transform: Affine) -> StoryplateResult<()> {
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
        match paint {
            Paint::Solid(c) => {
                self.ctx
                    .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                self.ctx.set_paint(color_to_cpu(*c));
            }
            Paint::Image {
                image,
                dest,
                x_extend,
                y_extend,
                rotation,
            } => {
                let (img, (bx, by)) = image_paint(image, *x_extend, *y_extend)?;
                let sx = dest.width() / f64::from(image.width.max(1));
                let sy = dest.height() / f64::from(image.height.max(1));
                let pt = Affine::translate(dest.origin().to_vec2())
                    * Affine::rotate(rotation.to_radians())
                    * Affine::scale_non_uniform(sx, sy)
                    * Affine::translate((-f64::from(bx), -f64::from(by)));
                self.ctx.set_paint_transform(affine_to_cpu(pt));
                self.ctx.set_paint(img);
            }
            Paint::Gradient {
                gradient,
                geometry,
                area,
            } => {
                if area.width() <= 0.0 || area.height() <= 0.0 {
                    self.ctx
                        .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    self.ctx.set_paint(color_to_cpu(gradient.sample(0.0)));
                    return Ok(());
                }
                let s = transform.determinant().abs().sqrt().max(f64::EPSILON);
                let w = (area.width() * s).ceil().max(1.0) as u32;
                let h = (area.height() * s).ceil().max(1.0) as u32;
                let key = GradientKey::new(gradient, geometry, *area, w, h);
                let img = match self.gradient_cache.get(&key) {
                    Some(img) => img.clone(),
                    None => {
                        let raster = rasterize_gradient(gradient, geometry, *area, w, h)?;
                        let (img, _) = image_paint(&raster, ImageExtend::Pad, ImageExtend::Pad)?;
                        self.gradient_cache.insert(key, img.clone());
                        img
                    }
                };
                let (iw, ih) = paint_image_size(&img)?;
                let pt = Affine::translate(area.origin().to_vec2())
                    * Affine::scale_non_uniform(area.width() / iw, area.height() / ih);
                self.ctx.set_paint_transform(affine_to_cpu(pt));
                self.ctx.set_paint(img);
            }
        }
        Ok(())
    }
}

fn paint_image_size(image: &vello_cpu::Image) -> StoryplateResult<(f64, f64)> {
    match &image.image {
        vello_cpu::ImageSource::Pixmap(p) => Ok((f64::from(p.width()), f64::from(p.height()))),
        _ => Err(StoryplateError::render("unexpected image source for gradient paint")),
    }
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = c.to_straight_rgba8();
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
