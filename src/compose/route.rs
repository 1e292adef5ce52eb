use crate::assets::color::Color;
use crate::compose::compositor::DrawCtx;
use crate::foundation::core::{Affine, Canvas, Insets, Rect};
use crate::foundation::error::StoryplateResult;
use crate::geo::projector::{RouteProjection, to_path};
use crate::model::fill::Gradient;
use crate::model::story::HEDONISM_CLUB;
use crate::render::{GradientGeometry, Paint, StrokeOpts};

/// Route stroke width in design units.
pub const ROUTE_WIDTH: f64 = 8.0;

/// Flat route color for the `hedonism` club.
pub const HEDONISM_ROUTE_COLOR: Color = Color::rgb8(0xFF, 0x6C, 0xC9);

/// Vertical route gradient used by every other club.
pub const ROUTE_GRADIENT_STOPS: [(f64, Color); 3] = [
    (0.0, Color::rgb8(0x2A, 0x35, 0x87)),
    (0.495192, Color::WHITE),
    (1.0, Color::rgb8(0xCF, 0x22, 0x28)),
];

/// How a route is stroked, picked by club.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RouteStyle {
    /// One color.
    Solid(Color),
    /// [`ROUTE_GRADIENT_STOPS`] from the top to the bottom of the route's box.
    VerticalGradient,
}

impl RouteStyle {
    /// Style for `club`.
    pub fn for_club(club: &str) -> Self {
        if club == HEDONISM_CLUB {
            Self::Solid(HEDONISM_ROUTE_COLOR)
        } else {
            Self::VerticalGradient
        }
    }

    /// Paint for a route drawn inside `area`.
    pub fn paint(self, area: Rect) -> Paint {
        match self {
            Self::Solid(c) => Paint::Solid(c),
            Self::VerticalGradient => Paint::Gradient {
                gradient: Gradient::linear(ROUTE_GRADIENT_STOPS),
                geometry: GradientGeometry::vertical(area),
                area,
            },
        }
    }
}

/// Default route box: below the title area and above the metrics, inside the side margins.
pub fn route_slot(canvas: Canvas, safe: Insets) -> Rect {
    let s = canvas.layout_scale();
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    Rect::new(
        safe.left * s,
        (safe.top + 150.0) * s,
        w - safe.right * s,
        h - (safe.bottom + 280.0) * s,
    )
}

pub(crate) fn draw_route_slot(ctx: &mut DrawCtx<'_>) -> StoryplateResult<()> {
    let slot = route_slot(ctx.canvas, ctx.opts.safe_area);
    draw_route_in(ctx, slot, Affine::IDENTITY)
}

/// Project the shared route into `dest` and stroke it. Degenerate routes are skipped.
pub(crate) fn draw_route_in(
    ctx: &mut DrawCtx<'_>,
    dest: Rect,
    transform: Affine,
) -> StoryplateResult<()> {
    let projection = match RouteProjection::fit(ctx.route, dest, ctx.opts.route_shrink) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(error = %e, "route skipped");
            return Ok(());
        }
    };
    let path = to_path(&projection.project_all(ctx.route));
    let paint = RouteStyle::for_club(ctx.story.club_id()).paint(dest);
    let stroke = StrokeOpts::round(ROUTE_WIDTH * ctx.scale());
    ctx.painter.stroke_path(&path, transform, &stroke, &paint)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/route.rs"]
mod tests;
