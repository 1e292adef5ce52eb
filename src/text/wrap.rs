/// Line advance as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Width measurement for a single font at a single size.
pub trait TextMeasure {
    /// Font size in pixels.
    fn font_size(&self) -> f64;

    /// Advance width of `text` on one line, in pixels.
    fn measure(&mut self, text: &str) -> f64;

    /// Distance between consecutive baselines.
    fn line_height(&self) -> f64 {
        self.font_size() * LINE_HEIGHT_FACTOR
    }
}

/// Measurer giving every character the same advance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvance {
    /// Font size in pixels.
    pub font_size: f64,
    /// Advance per character in pixels.
    pub advance: f64,
}

impl FixedAdvance {
    /// Measurer with `advance` pixels per character at `font_size`.
    pub fn new(font_size: f64, advance: f64) -> Self {
        Self { font_size, advance }
    }
}

impl TextMeasure for FixedAdvance {
    fn font_size(&self) -> f64 {
        self.font_size
    }

    fn measure(&mut self, text: &str) -> f64 {
        text.chars().count() as f64 * self.advance
    }
}

/// Horizontal anchoring of a line relative to its x coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// `x` is the left edge.
    #[default]
    #[serde(alias = "start", alias = "justify")]
    Left,
    /// `x` is the center.
    Center,
    /// `x` is the right edge.
    #[serde(alias = "end")]
    Right,
}

/// One emitted line.
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedLine {
    /// Line content, without leading or trailing break spaces.
    pub text: String,
    /// Left edge of the line after alignment.
    pub x: f64,
    /// Baseline y.
    pub baseline: f64,
    /// Measured width.
    pub width: f64,
}

/// Result of [`wrap_text`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WrappedText {
    /// Lines top to bottom.
    pub lines: Vec<WrappedLine>,
    /// y one line height below the last baseline; equals the start y for empty text.
    pub end_y: f64,
}

impl WrappedText {
    /// Re-anchor every line around `x` using `align`.
    pub fn aligned(mut self, x: f64, align: TextAlign) -> Self {
        for line in &mut self.lines {
            line.x = match align {
                TextAlign::Left => x,
                TextAlign::Center => x - line.width / 2.0,
                TextAlign::Right => x - line.width,
            };
        }
        self
    }

    /// Widest line.
    pub fn max_width(&self) -> f64 {
        self.lines.iter().map(|l| l.width).fold(0.0, f64::max)
    }
}

/// Greedy word wrap starting with the first baseline at `(x, y)`.
///
/// Words are separated by spaces and joined back with single spaces. A word that does not fit on
/// an empty line is broken between characters; a single character wider than `max_width` is
/// emitted on its own line. `\n` starts a new paragraph, and an empty paragraph advances one line.
/// Text that is not empty but has nothing to draw still takes one line.
pub fn wrap_text(
    text: &str,
    x: f64,
    y: f64,
    max_width: f64,
    measure: &mut dyn TextMeasure,
) -> WrappedText {
    let mut raw: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let before = raw.len();
        wrap_paragraph(paragraph, max_width, measure, &mut raw);
        if raw.len() == before && text.contains('\n') {
            raw.push(String::new());
        }
    }
    while raw.last().is_some_and(String::is_empty) {
        raw.pop();
    }
    if raw.is_empty() && !text.is_empty() {
        raw.push(String::new());
    }

    let lh = measure.line_height();
    let mut lines = Vec::with_capacity(raw.len());
    let mut baseline = y;
    for s in raw {
        let width = measure.measure(&s);
        lines.push(WrappedLine {
            text: s,
            x,
            baseline,
            width,
        });
        baseline += lh;
    }
    WrappedText {
        end_y: baseline,
        lines,
    }
}

fn wrap_paragraph(
    paragraph: &str,
    max_width: f64,
    measure: &mut dyn TextMeasure,
    out: &mut Vec<String>,
) {
    let mut line = String::new();
    for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
        let candidate = if line.is_empty() {
            word.to_owned()
        } else {
            format!("{line} {word}")
        };
        if measure.measure(&candidate) <= max_width {
            line = candidate;
            continue;
        }
        if !line.is_empty() {
            out.push(std::mem::take(&mut line));
        }
        if measure.measure(word) <= max_width {
            line = word.to_owned();
            continue;
        }
        for ch in word.chars() {
            let mut next = line.clone();
            next.push(ch);
            if measure.measure(&next) > max_width && !line.is_empty() {
                out.push(std::mem::replace(&mut line, ch.to_string()));
            } else {
                line = next;
            }
        }
    }
    if !line.is_empty() {
        out.push(line);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
