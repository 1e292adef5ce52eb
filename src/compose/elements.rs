use kurbo::Shape as _;

use crate::assets::color::Color;
use crate::compose::background::{draw_cover, resolve_fill};
use crate::compose::compositor::{DrawCtx, Decorations};
use crate::compose::route::draw_route_in;
use crate::compose::text::{LineAnchor, TextSpec, draw_lines, wrap};
use crate::effects::monochrome::apply_monochrome;
use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect};
use crate::foundation::error::StoryplateResult;
use crate::model::element::{
    CornerRadius, Element, ElementKind, ImageElement, ShapeElement, ShapeKind, StrokeStyle,
    TextElement,
};
use crate::model::template::Page;
use crate::render::{GradientGeometry, Paint, StrokeOpts};
use crate::text::wrap::TextAlign;

/// Fill of an image element that has nothing to show yet.
pub const PLACEHOLDER_FILL: Color = Color::rgb8(0x33, 0x33, 0x33);
/// Placeholder label color.
pub const PLACEHOLDER_TEXT: Color = Color::rgb8(0x66, 0x66, 0x66);
/// Placeholder label size.
pub const PLACEHOLDER_LABEL_SIZE: f64 = 14.0;
/// Selection outline color.
pub const SELECTION_COLOR: Color = Color::rgb8(0x25, 0x63, 0xEB);
/// Selection outline width.
pub const SELECTION_WIDTH: f64 = 2.0;

const PATH_TOLERANCE: f64 = 0.1;

/// Maps page units onto the canvas.
pub fn page_transform(canvas: Canvas, page: &Page) -> Affine {
    if page.size.width <= 0.0 || page.size.height <= 0.0 {
        return Affine::IDENTITY;
    }
    Affine::scale_non_uniform(
        f64::from(canvas.width) / page.size.width,
        f64::from(canvas.height) / page.size.height,
    )
}

/// Outline path of a shape in its local box.
pub fn shape_path(shape: &ShapeElement) -> BezPath {
    let rect = shape.size.rect();
    match shape.shape {
        ShapeKind::Rectangle => match shape.corner_radius {
            Some(radius) => {
                let max = rect.width().min(rect.height()) / 2.0;
                let [tl, tr, br, bl] = match radius {
                    CornerRadius::Uniform(r) => [r; 4],
                    CornerRadius::PerCorner(r) => r,
                }
                .map(|r| r.clamp(0.0, max.max(0.0)));
                kurbo::RoundedRect::from_rect(rect, (tl, tr, br, bl)).to_path(PATH_TOLERANCE)
            }
            None => rect.to_path(PATH_TOLERANCE),
        },
        ShapeKind::Ellipse => kurbo::Ellipse::from_rect(rect).to_path(PATH_TOLERANCE),
        ShapeKind::Polygon => {
            let mut path = polyline(shape.points.iter().map(|c| c.to_point()));
            if !path.elements().is_empty() {
                path.close_path();
            }
            path
        }
        ShapeKind::Line => match (shape.points.first(), shape.points.last()) {
            (Some(a), Some(b)) if shape.points.len() >= 2 => {
                polyline([a.to_point(), b.to_point()].into_iter())
            }
            _ => polyline([Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y1)].into_iter()),
        },
        ShapeKind::Custom => polyline(shape.points.iter().map(|c| c.to_point())),
    }
}

fn polyline(points: impl Iterator<Item = Point>) -> BezPath {
    let mut path = BezPath::new();
    for (i, p) in points.enumerate() {
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path
}

/// Bounding box of the shape's points, or its box when it has none.
pub fn points_bounds(shape: &ShapeElement) -> Rect {
    shape
        .points
        .iter()
        .map(|c| Rect::from_points(c.to_point(), c.to_point()))
        .reduce(|a, b| a.union(b))
        .unwrap_or_else(|| shape.size.rect())
}

pub(crate) fn draw_page(ctx: &mut DrawCtx<'_>, page: &Page) -> StoryplateResult<()> {
    let base = page_transform(ctx.canvas, page);
    for layer in page.paint_layers() {
        for el in layer.elements.iter().filter(|e| e.base.visible) {
            draw_element(ctx, el, base)?;
        }
    }
    Ok(())
}

/// Single draw entry point; every kind is handled here.
pub(crate) fn draw_element(
    ctx: &mut DrawCtx<'_>,
    el: &Element,
    parent: Affine,
) -> StoryplateResult<()> {
    let tf = parent * el.base.transform();
    let layered = ctx.painter.push_opacity(el.base.opacity);
    let out = match &el.kind {
        ElementKind::Text(t) => {
            draw_text(ctx, t, tf);
            Ok(())
        }
        ElementKind::Image(i) => draw_image(ctx, i, tf),
        ElementKind::Shape(s) => draw_shape(ctx, s, tf),
        ElementKind::Map(m) => draw_route_in(ctx, m.size.rect(), tf),
        ElementKind::Group(g) => g
            .children
            .iter()
            .filter(|c| c.base.visible)
            .try_for_each(|c| draw_element(ctx, c, tf)),
    };
    if layered {
        ctx.painter.pop_layer();
    }
    out
}

fn draw_text(ctx: &mut DrawCtx<'_>, el: &TextElement, tf: Affine) {
    let style = &el.style;
    let content = style.text_transform.apply(&el.content);
    let block = TextSpec::new(&content, style.font_size, style.fill)
        .bold(style.font_weight.is_bold())
        .letter_spacing(style.letter_spacing)
        .line_height(style.line_height_factor());
    let w = el.size.width;
    let x = match style.text_align {
        TextAlign::Left => 0.0,
        TextAlign::Center => w / 2.0,
        TextAlign::Right => w,
    };
    let max_width = if w > 0.0 { w } else { f64::INFINITY };
    let wrapped = wrap(ctx, &block, x, 0.0, max_width, style.text_align);
    draw_lines(ctx, &block, &wrapped, tf, LineAnchor::Top);
}

fn draw_image(ctx: &mut DrawCtx<'_>, el: &ImageElement, tf: Affine) -> StoryplateResult<()> {
    let dest = el.size.rect();
    if el.asset_id.trim().is_empty() {
        return draw_placeholder(ctx, dest, tf, "No Image");
    }
    let candidates = ctx.opts.asset_candidates(&el.asset_id);
    let Some((url, img)) = ctx.cache.first_ready(candidates.iter().map(String::as_str)) else {
        return draw_placeholder(ctx, dest, tf, "Loading...");
    };
    let mono = el.is_monochrome();
    if el.preserve_aspect_ratio {
        return draw_cover(ctx, &img, dest, tf, mono);
    }
    let (iw, ih) = img.size();
    let s = tf.determinant().abs().sqrt().max(f64::EPSILON);
    let w = (dest.width() * s).round().max(1.0) as u32;
    let h = (dest.height() * s).round().max(1.0) as u32;
    let region = match img.render_region(Rect::new(0.0, 0.0, iw, ih), w, h) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "image element raster failed");
            return draw_placeholder(ctx, dest, tf, "No Image");
        }
    };
    let region = if mono {
        apply_monochrome(&region)?
    } else {
        region
    };
    ctx.painter.draw_image(&region, dest, tf)
}

fn draw_placeholder(
    ctx: &mut DrawCtx<'_>,
    dest: Rect,
    tf: Affine,
    label: &str,
) -> StoryplateResult<()> {
    ctx.painter
        .fill_rect(dest, tf, &Paint::Solid(PLACEHOLDER_FILL))?;
    let block = TextSpec::new(label, PLACEHOLDER_LABEL_SIZE, PLACEHOLDER_TEXT);
    let c = dest.center();
    let wrapped = wrap(
        ctx,
        &block,
        c.x,
        c.y - PLACEHOLDER_LABEL_SIZE / 2.0,
        f64::INFINITY,
        TextAlign::Center,
    );
    draw_lines(ctx, &block, &wrapped, tf, LineAnchor::Top);
    Ok(())
}

fn draw_shape(ctx: &mut DrawCtx<'_>, el: &ShapeElement, tf: Affine) -> StoryplateResult<()> {
    let path = shape_path(el);
    if path.elements().is_empty() {
        return Ok(());
    }
    let area = el.size.rect();
    let closed = matches!(
        el.shape,
        ShapeKind::Rectangle | ShapeKind::Ellipse | ShapeKind::Polygon
    );
    if closed
        && let Some(fill) = &el.fill
        && let Some(paint) = resolve_fill(ctx, fill, area, GradientGeometry::diagonal(area))
    {
        ctx.painter.fill_path(&path, tf, &paint)?;
    }
    if let Some(stroke) = &el.stroke {
        let paint = stroke_paint(stroke, points_bounds(el));
        ctx.painter
            .stroke_path(&path, tf, &stroke_opts(stroke), &paint)?;
    }
    Ok(())
}

/// Paint of a stroke; gradients run across `bounds` (the points' bounding box).
pub fn stroke_paint(stroke: &StrokeStyle, bounds: Rect) -> Paint {
    match &stroke.gradient {
        Some(g) if bounds.width() > 0.0 || bounds.height() > 0.0 => {
            let area = if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
                bounds.inflate(stroke.width.max(1.0) / 2.0, stroke.width.max(1.0) / 2.0)
            } else {
                bounds
            };
            Paint::Gradient {
                gradient: g.clone(),
                geometry: GradientGeometry::for_gradient(g, area, GradientGeometry::diagonal(area)),
                area,
            }
        }
        _ => Paint::Solid(stroke.color),
    }
}

fn stroke_opts(stroke: &StrokeStyle) -> StrokeOpts {
    StrokeOpts::round(stroke.width)
        .with_cap(stroke.cap.unwrap_or_default())
        .with_join(stroke.join.unwrap_or_default())
        .with_dash(stroke.dash.clone().unwrap_or_default())
}

pub(crate) fn draw_decorations(
    ctx: &mut DrawCtx<'_>,
    page: &Page,
    deco: &Decorations,
) -> StoryplateResult<()> {
    let base = page_transform(ctx.canvas, page);
    if deco.safe_zone {
        let s = page.size.width / crate::foundation::core::DESIGN_WIDTH;
        let guide = ctx.opts.safe_area.scaled(s).inset_rect(page.size.rect());
        ctx.painter.stroke_path(
            &guide.to_path(PATH_TOLERANCE),
            base,
            &StrokeOpts::round(SELECTION_WIDTH).with_dash(vec![12.0, 8.0]),
            &Paint::Solid(SELECTION_COLOR.with_alpha(0.6)),
        )?;
    }
    let outline =
        StrokeOpts::round(SELECTION_WIDTH).with_join(crate::model::element::LineJoin::Miter);
    for id in &deco.selected {
        let Some(bbox) = selection_box(page, id) else {
            continue;
        };
        let r = bbox.inflate(2.0, 2.0);
        ctx.painter.stroke_path(
            &r.to_path(PATH_TOLERANCE),
            base,
            &outline,
            &Paint::Solid(SELECTION_COLOR),
        )?;
    }
    Ok(())
}

/// Page-space box of element `id`, including group offsets.
pub fn selection_box(page: &Page, id: &str) -> Option<Rect> {
    fn find(elements: &[Element], id: &str, offset: kurbo::Vec2) -> Option<Rect> {
        elements.iter().find_map(|el| {
            if el.id() == id {
                return el.aabb().map(|r| r + offset);
            }
            match &el.kind {
                ElementKind::Group(g) => {
                    find(&g.children, id, offset + el.base.position.to_vec2())
                }
                _ => None,
            }
        })
    }
    page.layers
        .iter()
        .find_map(|l| find(&l.elements, id, kurbo::Vec2::ZERO))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/elements.rs"]
mod tests;
