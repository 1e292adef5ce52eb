use crate::assets::color::Color;
use crate::compose::compositor::DrawCtx;
use crate::foundation::core::Affine;
use crate::text::wrap::{LINE_HEIGHT_FACTOR, TextAlign, TextMeasure, WrappedText, wrap_text};

/// Advance per character, as a fraction of the font size, when no font is loaded.
const APPROX_ADVANCE: f64 = 0.55;

/// One block of styled text.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TextSpec<'s> {
    pub(crate) text: &'s str,
    pub(crate) size: f64,
    pub(crate) bold: bool,
    pub(crate) letter_spacing: f64,
    pub(crate) line_height: f64,
    pub(crate) color: Color,
}

impl<'s> TextSpec<'s> {
    pub(crate) fn new(text: &'s str, size: f64, color: Color) -> Self {
        Self {
            text,
            size,
            bold: false,
            letter_spacing: 0.0,
            line_height: LINE_HEIGHT_FACTOR,
            color,
        }
    }

    pub(crate) fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub(crate) fn letter_spacing(mut self, px: f64) -> Self {
        self.letter_spacing = px;
        self
    }

    pub(crate) fn line_height(mut self, factor: f64) -> Self {
        if factor.is_finite() && factor > 0.0 {
            self.line_height = factor;
        }
        self
    }
}

struct ApproxMeasure {
    size: f64,
    line_height: f64,
    letter_spacing: f64,
}

impl TextMeasure for ApproxMeasure {
    fn font_size(&self) -> f64 {
        self.size
    }

    fn measure(&mut self, text: &str) -> f64 {
        text.chars().count() as f64 * (self.size * APPROX_ADVANCE + self.letter_spacing)
    }

    fn line_height(&self) -> f64 {
        self.size * self.line_height
    }
}

/// Wrap `block` with its first baseline at `(x, y)`, lines anchored on `x` per `align`.
pub(crate) fn wrap(
    ctx: &mut DrawCtx<'_>,
    block: &TextSpec<'_>,
    x: f64,
    y: f64,
    max_width: f64,
    align: TextAlign,
) -> WrappedText {
    let fonts = ctx.fonts;
    let wrapped = match fonts.face(block.bold) {
        Some(face) => match ctx.text.measurer(face, block.size) {
            Ok(m) => {
                let mut m = m
                    .with_letter_spacing(block.letter_spacing)
                    .with_line_height(block.line_height);
                wrap_text(block.text, x, y, max_width, &mut m)
            }
            Err(e) => {
                tracing::warn!(error = %e, "text measurement unavailable");
                approx_wrap(block, x, y, max_width)
            }
        },
        None => approx_wrap(block, x, y, max_width),
    };
    wrapped.aligned(x, align)
}

fn approx_wrap(block: &TextSpec<'_>, x: f64, y: f64, max_width: f64) -> WrappedText {
    let mut m = ApproxMeasure {
        size: block.size,
        line_height: block.line_height,
        letter_spacing: block.letter_spacing,
    };
    wrap_text(block.text, x, y, max_width, &mut m)
}

/// What a wrapped line's y coordinate marks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LineAnchor {
    /// The alphabetic baseline.
    Baseline,
    /// The top of the line box.
    Top,
}

/// Draw already wrapped lines in `transform`'s space.
pub(crate) fn draw_lines(
    ctx: &mut DrawCtx<'_>,
    block: &TextSpec<'_>,
    wrapped: &WrappedText,
    transform: Affine,
    anchor: LineAnchor,
) {
    let fonts = ctx.fonts;
    let Some(face) = fonts.face(block.bold) else {
        return;
    };
    for line in wrapped.lines.iter().filter(|l| !l.text.is_empty()) {
        let layout = match ctx.text.layout_line(
            &line.text,
            face,
            block.size as f32,
            block.letter_spacing as f32,
            block.color.into(),
        ) {
            Ok(layout) => layout,
            Err(e) => {
                tracing::warn!(error = %e, "text line layout failed");
                continue;
            }
        };
        let first_baseline = match anchor {
            LineAnchor::Top => 0.0,
            LineAnchor::Baseline => layout
                .lines()
                .next()
                .map(|l| f64::from(l.metrics().baseline))
                .unwrap_or(0.0),
        };
        ctx.painter.draw_text_layout(
            &layout,
            face,
            transform * Affine::translate((line.x, line.baseline - first_baseline)),
        );
    }
}

/// Wrap and draw; returns the y below the block.
pub(crate) fn draw_wrapped(
    ctx: &mut DrawCtx<'_>,
    block: &TextSpec<'_>,
    x: f64,
    y: f64,
    max_width: f64,
    align: TextAlign,
) -> f64 {
    let wrapped = wrap(ctx, block, x, y, max_width, align);
    draw_lines(ctx, block, &wrapped, Affine::IDENTITY, LineAnchor::Baseline);
    wrapped.end_y
}

/// Draw one unwrapped line with its baseline at `y`.
pub(crate) fn draw_single(
    ctx: &mut DrawCtx<'_>,
    block: &TextSpec<'_>,
    x: f64,
    y: f64,
    align: TextAlign,
) {
    let wrapped = wrap(ctx, block, x, y, f64::INFINITY, align);
    draw_lines(ctx, block, &wrapped, Affine::IDENTITY, LineAnchor::Baseline);
}

#[cfg(test)]
#[path = "../../tests/unit/compose/text.rs"]
mod tests;
