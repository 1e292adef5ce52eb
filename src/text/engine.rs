use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::assets::color::Color;
use crate::foundation::error::{StoryplateError, StoryplateResult};
use crate::text::wrap::{LINE_HEIGHT_FACTOR, TextMeasure};

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrush {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Color> for TextBrush {
    fn from(c: Color) -> Self {
        let [r, g, b, a] = c.to_straight_rgba8();
        Self { r, g, b, a }
    }
}

/// Font bytes plus the glyph-rendering handle built from them.
#[derive(Clone)]
pub struct FontFace {
    key: String,
    bytes: Arc<Vec<u8>>,
    data: vello_cpu::peniko::FontData,
}

impl FontFace {
    /// Wrap raw TTF/OTF bytes. `key` identifies the face in logs and in the layout engine.
    pub fn from_bytes(key: impl Into<String>, bytes: Vec<u8>) -> StoryplateResult<Self> {
        let key = key.into();
        if bytes.is_empty() {
            return Err(StoryplateError::asset(format!("font \"{key}\" is empty")));
        }
        let bytes = Arc::new(bytes);
        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            0,
        );
        Ok(Self { key, bytes, data })
    }

    /// Read a font file from disk.
    pub fn load(path: &Path) -> StoryplateResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font {}", path.display()))?;
        Self::from_bytes(path.display().to_string(), bytes)
    }

    /// Identifier given at construction.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn data(&self) -> &vello_cpu::peniko::FontData {
        &self.data
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("key", &self.key)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Regular and bold faces used by the compositor.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    /// Face for body text, labels and dates.
    pub regular: Option<FontFace>,
    /// Face for titles and metric values; falls back to `regular`.
    pub bold: Option<FontFace>,
}

impl FontBook {
    /// Load faces from optional paths. Unreadable fonts are logged and left out.
    pub fn load(regular: Option<&Path>, bold: Option<&Path>) -> Self {
        let load = |p: Option<&Path>| {
            let p = p?;
            match FontFace::load(p) {
                Ok(face) => Some(face),
                Err(e) => {
                    tracing::warn!(
                        path = %p.display(),
                        error = %e,
                        "font unavailable; text using it is skipped"
                    );
                    None
                }
            }
        };
        Self {
            regular: load(regular),
            bold: load(bold),
        }
    }

    /// Face for the given weight, if any is loaded.
    pub fn face(&self, bold: bool) -> Option<&FontFace> {
        if bold {
            self.bold.as_ref().or(self.regular.as_ref())
        } else {
            self.regular.as_ref().or(self.bold.as_ref())
        }
    }

    /// `true` when no face is loaded.
    pub fn is_empty(&self) -> bool {
        self.regular.is_none() && self.bold.is_none()
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    families: HashMap<String, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    /// Family name for `face`, registering its bytes on first use.
    fn family_for(&mut self, face: &FontFace) -> StoryplateResult<String> {
        if let Some(name) = self.families.get(face.key()) {
            return Ok(name.clone());
        }
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(face.bytes.as_ref().clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StoryplateError::asset(format!("no font families registered from \"{}\"", face.key()))
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StoryplateError::asset("registered font family has no name"))?
            .to_string();
        self.families.insert(face.key().to_owned(), name.clone());
        Ok(name)
    }

    fn build(
        &mut self,
        family: &str,
        text: &str,
        size_px: f32,
        letter_spacing: f32,
        brush: TextBrush,
    ) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family.to_owned())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::LetterSpacing(letter_spacing));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// Shape one unbroken line of text.
    pub fn layout_line(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        letter_spacing: f32,
        brush: TextBrush,
    ) -> StoryplateResult<parley::Layout<TextBrush>> {
        validate_size(size_px)?;
        let family = self.family_for(face)?;
        Ok(self.build(&family, text, size_px, letter_spacing, brush))
    }

    /// Advance width of `text` on a single line.
    pub fn measure(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        letter_spacing: f32,
    ) -> StoryplateResult<f64> {
        let layout = self.layout_line(text, face, size_px, letter_spacing, TextBrush::default())?;
        Ok(f64::from(layout.width()))
    }

    /// A [`TextMeasure`] bound to one face and size.
    pub fn measurer<'a>(
        &'a mut self,
        face: &'a FontFace,
        size_px: f64,
    ) -> StoryplateResult<ParleyMeasure<'a>> {
        validate_size(size_px as f32)?;
        let family = self.family_for(face)?;
        Ok(ParleyMeasure {
            engine: self,
            family,
            size_px,
            letter_spacing: 0.0,
            line_height: LINE_HEIGHT_FACTOR,
        })
    }
}

fn validate_size(size_px: f32) -> StoryplateResult<()> {
    if !size_px.is_finite() || size_px <= 0.0 {
        return Err(StoryplateError::validation(
            "text size_px must be finite and > 0",
        ));
    }
    Ok(())
}

/// Parley-backed measurement for [`crate::text::wrap::wrap_text`].
pub struct ParleyMeasure<'a> {
    engine: &'a mut TextLayoutEngine,
    family: String,
    size_px: f64,
    letter_spacing: f64,
    line_height: f64,
}

impl ParleyMeasure<'_> {
    /// Extra spacing between characters in pixels.
    pub fn with_letter_spacing(mut self, px: f64) -> Self {
        self.letter_spacing = px;
        self
    }

    /// Baseline distance as a multiple of the font size.
    pub fn with_line_height(mut self, factor: f64) -> Self {
        if factor.is_finite() && factor > 0.0 {
            self.line_height = factor;
        }
        self
    }
}

impl TextMeasure for ParleyMeasure<'_> {
    fn font_size(&self) -> f64 {
        self.size_px
    }

    fn measure(&mut self, text: &str) -> f64 {
        let layout = self.engine.build(
            &self.family,
            text,
            self.size_px as f32,
            self.letter_spacing as f32,
            TextBrush::default(),
        );
        f64::from(layout.width())
    }

    fn line_height(&self) -> f64 {
        self.size_px * self.line_height
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/engine.rs"]
mod tests;
