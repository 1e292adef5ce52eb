use crate::assets::cache::Lookup;
use crate::compose::compositor::DrawCtx;
use crate::compose::text::{TextSpec, draw_single, draw_wrapped};
use crate::foundation::core::{Affine, Canvas, Insets, Rect};
use crate::foundation::error::StoryplateResult;
use crate::model::story::Metric;
use crate::text::wrap::TextAlign;

/// Logo edge length in design units.
pub const LOGO_SIZE: f64 = 180.0;
/// Title font size in design units.
pub const TITLE_SIZE: f64 = 52.0;
/// Date font size in design units.
pub const DATE_SIZE: f64 = 32.0;
/// Metric label font size in design units.
pub const LABEL_SIZE: f64 = 32.0;
/// Metric value font size in design units.
pub const VALUE_SIZE: f64 = 52.0;

/// Logo placement: top right, raised above the safe area.
pub fn logo_rect(canvas: Canvas, safe: Insets) -> Rect {
    let s = canvas.layout_scale();
    let size = LOGO_SIZE * s;
    let x = f64::from(canvas.width) - size - safe.right * s;
    let y = safe.top * s - 84.0 * s;
    Rect::new(x, y, x + size, y + size)
}

/// Title anchor `(x, first baseline, max width)`: from the left safe margin to 20 units before
/// the logo.
pub fn title_anchor(canvas: Canvas, safe: Insets) -> (f64, f64, f64) {
    let s = canvas.layout_scale();
    let left = safe.left * s;
    let max_width = logo_rect(canvas, safe).x0 - left - 20.0 * s;
    (left, safe.top * s, max_width)
}

/// Geometry of the bottom metrics grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricsGrid {
    /// Label font size in pixels.
    pub label_size: f64,
    /// Value font size in pixels.
    pub value_size: f64,
    /// Left safe margin.
    pub left: f64,
    /// Width of one of the three columns.
    pub cell_width: f64,
    /// Value baseline of the upper row (distance, elevation, time).
    pub upper_row_y: f64,
    /// Value baseline of the lower row (speed).
    pub lower_row_y: f64,
    /// Distance from a value baseline up to its label baseline, minus the value size.
    pub label_gap: f64,
}

impl MetricsGrid {
    /// Grid for `canvas`.
    pub fn new(canvas: Canvas, safe: Insets) -> Self {
        let s = canvas.layout_scale();
        let label_size = (LABEL_SIZE * s).floor();
        let value_size = (VALUE_SIZE * s).floor();
        let cell_height = value_size + label_size + 20.0 * s;
        let left = safe.left * s;
        let available = f64::from(canvas.width) - (safe.left + safe.right) * s;
        let lower_row_y = f64::from(canvas.height) - safe.bottom * s;
        Self {
            label_size,
            value_size,
            left,
            cell_width: available / 3.0,
            upper_row_y: lower_row_y - cell_height - 44.0 * s,
            lower_row_y,
            label_gap: 10.0 * s,
        }
    }

    /// Text anchor and alignment for column 0, 1 or 2.
    pub fn column(&self, col: usize) -> (f64, TextAlign) {
        match col {
            0 => (self.left, TextAlign::Left),
            1 => (self.left + self.cell_width * 1.5, TextAlign::Center),
            _ => (self.left + self.cell_width * 3.0, TextAlign::Right),
        }
    }

    /// Label baseline for a value baseline.
    pub fn label_y(&self, value_y: f64) -> f64 {
        value_y - self.value_size - self.label_gap
    }
}

pub(crate) fn draw_title_block(ctx: &mut DrawCtx<'_>) -> StoryplateResult<()> {
    let story = ctx.story;
    let s = ctx.scale();
    let (x, y, max_width) = title_anchor(ctx.canvas, ctx.opts.safe_area);
    let title = TextSpec::new(&story.title, (TITLE_SIZE * s).floor(), story.font_color).bold(true);
    let end_y = draw_wrapped(ctx, &title, x, y, max_width, TextAlign::Left);

    let date = story.date.to_uppercase();
    let date_spec = TextSpec::new(&date, (DATE_SIZE * s).floor(), story.font_color);
    draw_wrapped(ctx, &date_spec, x, end_y + 8.0 * s, max_width, TextAlign::Left);
    Ok(())
}

pub(crate) fn draw_metrics(ctx: &mut DrawCtx<'_>) -> StoryplateResult<()> {
    let story = ctx.story;
    let slots = story.metric_slots();
    if slots.is_empty() {
        return Ok(());
    }
    let grid = MetricsGrid::new(ctx.canvas, ctx.opts.safe_area);
    let cells = [
        (slots.distance, 0, grid.upper_row_y),
        (slots.elevation, 1, grid.upper_row_y),
        (slots.time, 2, grid.upper_row_y),
        (slots.speed, 1, grid.lower_row_y),
    ];
    for (metric, col, row_y) in cells {
        if let Some(metric) = metric {
            draw_metric(ctx, &grid, metric, col, row_y);
        }
    }
    Ok(())
}

fn draw_metric(ctx: &mut DrawCtx<'_>, grid: &MetricsGrid, metric: &Metric, col: usize, row_y: f64) {
    let color = ctx.story.font_color;
    let (x, align) = grid.column(col);
    let label = metric.data_name.to_uppercase();
    draw_single(
        ctx,
        &TextSpec::new(&label, grid.label_size, color),
        x,
        grid.label_y(row_y),
        align,
    );
    draw_single(
        ctx,
        &TextSpec::new(metric.display_value(), grid.value_size, color).bold(true),
        x,
        row_y,
        align,
    );
}

pub(crate) fn draw_logo(ctx: &mut DrawCtx<'_>) -> StoryplateResult<()> {
    let (opts, story) = (ctx.opts, ctx.story);
    let Some(url) = opts.logo_for(story.club_id()) else {
        return Ok(());
    };
    let rect = logo_rect(ctx.canvas, opts.safe_area);
    let img = match ctx.cache.request(url) {
        Lookup::Ready(img) => img,
        Lookup::Pending => {
            tracing::debug!(url, "logo not loaded yet");
            return Ok(());
        }
    };
    let (iw, ih) = img.size();
    let px = rect.width().round().max(1.0) as u32;
    match img.render_region(Rect::new(0.0, 0.0, iw, ih), px, px) {
        Ok(region) => ctx.painter.draw_image(&region, rect, Affine::IDENTITY),
        Err(e) => {
            tracing::warn!(url, error = %e, "logo raster failed");
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/story.rs"]
mod tests;
