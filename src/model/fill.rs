use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::foundation::error::{StoryplateError, StoryplateResult};

/// Gradient geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    /// Along an axis.
    #[default]
    Linear,
    /// Outward from a center.
    Radial,
    /// Around a center.
    Conic,
}

/// A gradient stop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position along the gradient in `[0, 1]`.
    pub offset: f64,
    /// Stop color.
    pub color: Color,
}

impl ColorStop {
    /// Stop at `offset`.
    pub fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Multi-stop gradient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    /// Geometry; `type` in JSON.
    #[serde(rename = "type", default)]
    pub kind: GradientKind,
    /// Stops ordered by offset.
    pub stops: Vec<ColorStop>,
    /// Direction in degrees for linear gradients; `None` keeps the caller's default axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
}

impl Gradient {
    /// Linear gradient with the given stops.
    pub fn linear(stops: impl IntoIterator<Item = (f64, Color)>) -> Self {
        Self {
            kind: GradientKind::Linear,
            stops: stops
                .into_iter()
                .map(|(o, c)| ColorStop::new(o, c))
                .collect(),
            angle: None,
        }
    }

    /// Same gradient with an explicit angle.
    pub fn with_angle(mut self, degrees: f64) -> Self {
        self.angle = Some(degrees);
        self
    }

    /// Check stop count and offsets.
    pub fn validate(&self) -> StoryplateResult<()> {
        if self.stops.is_empty() {
            return Err(StoryplateError::validation("gradient needs at least one stop"));
        }
        for s in &self.stops {
            if !(0.0..=1.0).contains(&s.offset) {
                return Err(StoryplateError::validation(format!(
                    "gradient stop offset {} is outside [0, 1]",
                    s.offset
                )));
            }
        }
        Ok(())
    }

    /// Color at `t`, clamped to the first and last stops. Stops are interpolated in straight
    /// RGBA the way canvas gradients are specified.
    pub fn sample(&self, t: f64) -> Color {
        let Some(first) = self.stops.first() else {
            return Color::TRANSPARENT;
        };
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        if t <= first.offset {
            return first.color;
        }
        let mut prev = first;
        for s in &self.stops[1..] {
            if t <= s.offset {
                let span = s.offset - prev.offset;
                if span <= f64::EPSILON {
                    return s.color;
                }
                let u = (t - prev.offset) / span;
                return mix(prev.color, s.color, u);
            }
            prev = s;
        }
        prev.color
    }
}

fn mix(a: Color, b: Color, u: f64) -> Color {
    Color::rgba(
        a.r + (b.r - a.r) * u,
        a.g + (b.g - a.g) * u,
        a.b + (b.b - a.b) * u,
        a.a + (b.a - a.a) * u,
    )
}

/// Pattern tiling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternRepeat {
    /// Tile on both axes.
    #[default]
    Repeat,
    /// Tile horizontally.
    RepeatX,
    /// Tile vertically.
    RepeatY,
    /// Draw once.
    NoRepeat,
}

/// Image pattern fill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    /// Asset id resolved through the configured prefixes.
    pub image_id: String,
    /// Tiling mode.
    #[serde(default)]
    pub repeat: PatternRepeat,
    /// Tile scale.
    #[serde(default = "one")]
    pub scale: f64,
    /// Tile rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
}

fn one() -> f64 {
    1.0
}

/// Paint for areas and strokes.
#[derive(Clone, Debug, PartialEq)]
pub enum Fill {
    /// Flat color.
    Solid(Color),
    /// Color ramp.
    Gradient(Gradient),
    /// Tiled image.
    Pattern(Pattern),
}

impl Fill {
    /// Representative flat color (first stop for gradients, none for patterns).
    pub fn flat_color(&self) -> Option<Color> {
        match self {
            Self::Solid(c) => Some(*c),
            Self::Gradient(g) => g.stops.first().map(|s| s.color),
            Self::Pattern(_) => None,
        }
    }
}

#[derive(Default, Serialize, Deserialize)]
struct FillRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gradient: Option<Gradient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<Pattern>,
}

impl FillRepr {
    fn into_fill(self) -> Option<Fill> {
        if let Some(g) = self.gradient {
            return Some(Fill::Gradient(g));
        }
        if let Some(p) = self.pattern {
            return Some(Fill::Pattern(p));
        }
        self.color.map(Fill::Solid)
    }
}

impl Serialize for Fill {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let repr = match self {
            Self::Solid(c) => FillRepr {
                color: Some(*c),
                ..FillRepr::default()
            },
            Self::Gradient(g) => FillRepr {
                gradient: Some(g.clone()),
                ..FillRepr::default()
            },
            Self::Pattern(p) => FillRepr {
                pattern: Some(p.clone()),
                ..FillRepr::default()
            },
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Fill {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        FillRepr::deserialize(deserializer)?
            .into_fill()
            .ok_or_else(|| serde::de::Error::custom("fill needs one of color, gradient or pattern"))
    }
}

/// Deserialize an optional fill where `null`, `{}` and a missing key all mean "none".
pub(crate) fn deserialize_optional_fill<'de, D>(deserializer: D) -> Result<Option<Fill>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<FillRepr>::deserialize(deserializer)?.and_then(FillRepr::into_fill))
}

#[cfg(test)]
#[path = "../../tests/unit/model/fill.rs"]
mod tests;
