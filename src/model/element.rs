use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::error::{StoryplateError, StoryplateResult};
use crate::model::fill::{Fill, Gradient, deserialize_optional_fill};
use crate::text::wrap::TextAlign;

/// A 2D pair in design units. Accepts `{ "x": .., "y": .. }` or `[x, y]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Coord {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Coord {
    /// Build from components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// As a kurbo point.
    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// As a kurbo vector.
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Point> for Coord {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

impl<'de> Deserialize<'de> for Coord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Obj { x: f64, y: f64 },
            Arr([f64; 2]),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Obj { x, y } => Ok(Self::new(x, y)),
            Repr::Arr([x, y]) => Ok(Self::new(x, y)),
        }
    }
}

/// Width and height in design units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl BoxSize {
    /// Build from width and height.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Rectangle at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

fn yes() -> bool {
    true
}

fn one() -> f64 {
    1.0
}

fn unit_scale() -> Coord {
    Coord::new(1.0, 1.0)
}

/// Attributes shared by every element kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementBase {
    /// Stable identifier, unique within a template.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Hidden elements are neither drawn nor hit.
    #[serde(default = "yes")]
    pub visible: bool,
    /// Locked elements can be selected but not dragged.
    #[serde(default)]
    pub locked: bool,
    /// Top-left corner, relative to the page or enclosing group.
    #[serde(default)]
    pub position: Coord,
    /// Rotation in degrees, clockwise, around `position`.
    #[serde(default)]
    pub rotation: f64,
    /// Scale factors applied after rotation.
    #[serde(default = "unit_scale")]
    pub scale: Coord,
    /// Opacity in `[0, 1]`.
    #[serde(default = "one")]
    pub opacity: f64,
    /// Stored for persistence; paint order is array order.
    #[serde(default)]
    pub z_index: i64,
}

impl ElementBase {
    /// Defaults for a fresh element with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            visible: true,
            locked: false,
            position: Coord::default(),
            rotation: 0.0,
            scale: unit_scale(),
            opacity: 1.0,
            z_index: 0,
        }
    }

    /// `translate(position) · rotate(rotation) · scale(scale)`.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
    }
}

/// CSS-style font weight, stored numerically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// 400.
    pub const NORMAL: Self = Self(400);
    /// 700.
    pub const BOLD: Self = Self(700);

    /// Weights of 600 and up use the bold face.
    pub fn is_bold(self) -> bool {
        self.0 >= 600
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Str(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(n) => Ok(Self(n.clamp(1.0, 1000.0).round() as u16)),
            Repr::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "normal" => Ok(Self::NORMAL),
                "bold" | "bolder" => Ok(Self::BOLD),
                "lighter" => Ok(Self(300)),
                other => other
                    .parse::<u16>()
                    .map(Self)
                    .map_err(|_| serde::de::Error::custom(format!("unknown font weight \"{s}\""))),
            },
        }
    }
}

/// Case mapping applied before wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    /// Leave as authored.
    #[default]
    None,
    /// Upper-case everything.
    Uppercase,
    /// Lower-case everything.
    Lowercase,
    /// Upper-case the first letter of each word.
    Capitalize,
}

impl TextTransform {
    /// Apply to `text`.
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::None => text.to_owned(),
            Self::Uppercase => text.to_uppercase(),
            Self::Lowercase => text.to_lowercase(),
            Self::Capitalize => {
                let mut out = String::with_capacity(text.len());
                let mut at_start = true;
                for ch in text.chars() {
                    if at_start && ch.is_alphabetic() {
                        out.extend(ch.to_uppercase());
                        at_start = false;
                    } else {
                        out.push(ch);
                        at_start = ch.is_whitespace();
                    }
                }
                out
            }
        }
    }
}

/// Text styling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    /// Family name; informational, faces come from the configured font book.
    pub font_family: String,
    /// Weight.
    pub font_weight: FontWeight,
    /// `normal`, `italic` or `oblique`.
    pub font_style: String,
    /// Size in design pixels.
    pub font_size: f64,
    /// Baseline distance: a multiple of `font_size` when at most 4, otherwise pixels.
    pub line_height: f64,
    /// Extra spacing between characters in pixels.
    pub letter_spacing: f64,
    /// Text color.
    pub fill: Color,
    /// Alignment inside the text box.
    pub text_align: TextAlign,
    /// Case mapping.
    pub text_transform: TextTransform,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_owned(),
            font_weight: FontWeight(600),
            font_style: "normal".to_owned(),
            font_size: 48.0,
            line_height: 56.0,
            letter_spacing: 0.0,
            fill: Color::rgb8(0x0F, 0x17, 0x2A),
            text_align: TextAlign::Center,
            text_transform: TextTransform::None,
        }
    }
}

impl TextStyle {
    /// Line height as a multiple of the font size.
    pub fn line_height_factor(&self) -> f64 {
        if self.line_height <= 0.0 || !self.line_height.is_finite() {
            crate::text::wrap::LINE_HEIGHT_FACTOR
        } else if self.line_height <= 4.0 {
            self.line_height
        } else {
            self.line_height / self.font_size.max(1.0)
        }
    }
}

/// Auto-resize mode of a text box; persisted only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoResize {
    /// Grow horizontally.
    Width,
    /// Grow vertically.
    Height,
    /// Fixed box.
    #[default]
    None,
}

/// Text block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    /// Layout box; lines wrap at its width.
    #[serde(rename = "box")]
    pub size: BoxSize,
    /// Content; `\n` separates paragraphs.
    #[serde(default)]
    pub content: String,
    /// Styling.
    #[serde(default)]
    pub style: TextStyle,
    /// Persisted resize mode.
    #[serde(default)]
    pub auto_resize: AutoResize,
}

/// Per-image adjustments. Only `grayscale` is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageFilters {
    /// Blur radius.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    /// Brightness factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    /// Contrast factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    /// `>= 1` draws the image through the monochrome filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grayscale: Option<f64>,
    /// Hue rotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<f64>,
    /// Saturation factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f64>,
}

/// Bitmap placed in a box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    /// Destination box.
    #[serde(rename = "box")]
    pub size: BoxSize,
    /// Asset id; empty means "no image".
    #[serde(default)]
    pub asset_id: String,
    /// Fit inside the box instead of stretching.
    #[serde(default)]
    pub preserve_aspect_ratio: bool,
    /// Adjustments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<ImageFilters>,
}

impl ImageElement {
    /// `true` when the image should be drawn in monochrome.
    pub fn is_monochrome(&self) -> bool {
        self.filters
            .and_then(|f| f.grayscale)
            .is_some_and(|g| g >= 1.0)
    }
}

/// Geometric primitive of a shape element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Box, optionally rounded.
    #[default]
    Rectangle,
    /// Ellipse inscribed in the box.
    Ellipse,
    /// Closed polygon through `points`.
    Polygon,
    /// Straight segment through the first and last `points` (box diagonal when absent).
    Line,
    /// Open polyline through `points`.
    Custom,
}

/// Corner radius: one value or `[tl, tr, br, bl]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CornerRadius {
    /// Same radius everywhere.
    Uniform(f64),
    /// Per-corner radii.
    PerCorner([f64; 4]),
}

/// Line cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    /// Flat at the endpoint.
    Butt,
    /// Semicircle.
    #[default]
    Round,
    /// Square extension.
    Square,
}

/// Line join.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    /// Sharp corner.
    Miter,
    /// Rounded corner.
    #[default]
    Round,
    /// Cut corner.
    Bevel,
}

/// Stroke styling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeStyle {
    /// Flat stroke color.
    pub color: Color,
    /// Width in design pixels.
    pub width: f64,
    /// Dash pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<Vec<f64>>,
    /// Cap; round when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<LineCap>,
    /// Join; round when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<LineJoin>,
    /// Gradient laid over the bounding box of the stroked points; overrides `color`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
}

impl StrokeStyle {
    /// Solid stroke.
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
            cap: None,
            join: None,
            gradient: None,
        }
    }
}

/// Vector shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeElement {
    /// Bounding box.
    #[serde(rename = "box")]
    pub size: BoxSize,
    /// Primitive.
    #[serde(default)]
    pub shape: ShapeKind,
    /// Vertices relative to the element position.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Coord>,
    /// Rectangle corner radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<CornerRadius>,
    /// Outline.
    #[serde(default)]
    pub stroke: Option<StrokeStyle>,
    /// Interior paint.
    #[serde(default, deserialize_with = "deserialize_optional_fill")]
    pub fill: Option<Fill>,
}

/// Box that receives the shared route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapElement {
    /// Destination box for the projected route.
    #[serde(rename = "box")]
    pub size: BoxSize,
    /// Provider styling, persisted untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_style: Option<serde_json::Value>,
}

/// Container whose children are positioned relative to it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupElement {
    /// Children in paint order.
    #[serde(default)]
    pub children: Vec<Element>,
}

/// Kind-specific element payload, tagged by `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ElementKind {
    /// Text block.
    Text(TextElement),
    /// Bitmap.
    Image(ImageElement),
    /// Vector shape.
    Shape(ShapeElement),
    /// Route box.
    #[serde(alias = "route")]
    Map(MapElement),
    /// Container.
    #[serde(alias = "decorative")]
    Group(GroupElement),
}

/// One entry of a layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Shared attributes.
    #[serde(flatten)]
    pub base: ElementBase,
    /// Kind-specific payload.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Build an element.
    pub fn new(base: ElementBase, kind: ElementKind) -> Self {
        Self { base, kind }
    }

    /// Element id.
    pub fn id(&self) -> &str {
        &self.base.id
    }

    /// `kind` tag as serialized.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Text(_) => "text",
            ElementKind::Image(_) => "image",
            ElementKind::Shape(_) => "shape",
            ElementKind::Map(_) => "map",
            ElementKind::Group(_) => "group",
        }
    }

    /// Local content box (before the element transform). Groups use the union of their
    /// children's boxes; an empty group has no box.
    pub fn local_box(&self) -> Option<Rect> {
        match &self.kind {
            ElementKind::Text(t) => Some(t.size.rect()),
            ElementKind::Image(i) => Some(i.size.rect()),
            ElementKind::Shape(s) => Some(s.size.rect()),
            ElementKind::Map(m) => Some(m.size.rect()),
            ElementKind::Group(g) => g
                .children
                .iter()
                .filter(|c| c.base.visible)
                .filter_map(Element::aabb)
                .reduce(|a, b| a.union(b)),
        }
    }

    /// Axis-aligned box in the parent's coordinates, ignoring rotation and scale.
    pub fn aabb(&self) -> Option<Rect> {
        self.local_box()
            .map(|r| r + self.base.position.to_vec2())
    }

    /// Visit this element and every descendant, depth first.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Element)) {
        f(self);
        if let ElementKind::Group(g) = &self.kind {
            for c in &g.children {
                c.walk(f);
            }
        }
    }

    /// Find a descendant (or self) by id.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.base.id == id {
            return Some(self);
        }
        match &mut self.kind {
            ElementKind::Group(g) => g.children.iter_mut().find_map(|c| c.find_mut(id)),
            _ => None,
        }
    }

    /// Check numeric fields and nested fills.
    pub fn validate(&self) -> StoryplateResult<()> {
        let b = &self.base;
        if b.id.is_empty() {
            return Err(StoryplateError::validation("element id must be non-empty"));
        }
        if !(0.0..=1.0).contains(&b.opacity) {
            return Err(StoryplateError::validation(format!(
                "element \"{}\": opacity {} is outside [0, 1]",
                b.id, b.opacity
            )));
        }
        let size = match &self.kind {
            ElementKind::Text(t) => Some(t.size),
            ElementKind::Image(i) => Some(i.size),
            ElementKind::Shape(s) => Some(s.size),
            ElementKind::Map(m) => Some(m.size),
            ElementKind::Group(_) => None,
        };
        if let Some(s) = size
            && (s.width < 0.0 || s.height < 0.0 || !s.width.is_finite() || !s.height.is_finite())
        {
            return Err(StoryplateError::validation(format!(
                "element \"{}\": box must be finite and non-negative",
                b.id
            )));
        }
        match &self.kind {
            ElementKind::Shape(s) => {
                if let Some(Fill::Gradient(g)) = &s.fill {
                    g.validate()?;
                }
                if let Some(g) = s.stroke.as_ref().and_then(|st| st.gradient.as_ref()) {
                    g.validate()?;
                }
            }
            ElementKind::Text(t) if t.style.font_size <= 0.0 => {
                return Err(StoryplateError::validation(format!(
                    "element \"{}\": font size must be > 0",
                    b.id
                )));
            }
            ElementKind::Group(g) => {
                for c in &g.children {
                    c.validate()?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/element.rs"]
mod tests;
