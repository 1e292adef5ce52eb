use crate::foundation::error::{StoryplateError, StoryplateResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Design width every layout constant is expressed against.
pub const DESIGN_WIDTH: f64 = 1080.0;

/// Output raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas rectangle in pixel space.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Factor mapping 1080-wide design units onto this canvas.
    pub fn layout_scale(self) -> f64 {
        f64::from(self.width) / DESIGN_WIDTH
    }

    /// Convert to the `u16` dimensions the raster backend works with.
    pub fn to_u16(self) -> StoryplateResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| StoryplateError::render("canvas width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| StoryplateError::render("canvas height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(StoryplateError::render("canvas must be non-empty"));
        }
        Ok((w, h))
    }
}

/// The two raster sizes downstream sharing targets accept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PageFormat {
    /// 1080×1920 (9:16).
    #[default]
    #[serde(rename = "9:16")]
    Story,
    /// 1080×1350 (4:5).
    #[serde(rename = "4:5")]
    Portrait,
}

impl PageFormat {
    /// Fixed pixel size of the format.
    pub fn canvas(self) -> Canvas {
        match self {
            Self::Story => Canvas {
                width: 1080,
                height: 1920,
            },
            Self::Portrait => Canvas {
                width: 1080,
                height: 1350,
            },
        }
    }

    /// Recognize a format from exact page dimensions.
    pub fn from_size(width: f64, height: f64) -> Option<Self> {
        [Self::Story, Self::Portrait].into_iter().find(|f| {
            let c = f.canvas();
            f64::from(c.width) == width && f64::from(c.height) == height
        })
    }

    /// Parse the `"9:16"` / `"4:5"` ratio labels.
    pub fn from_ratio(label: &str) -> StoryplateResult<Self> {
        match label.trim() {
            "9:16" | "9/16" => Ok(Self::Story),
            "4:5" | "4/5" => Ok(Self::Portrait),
            other => Err(StoryplateError::validation(format!(
                "unsupported aspect ratio \"{other}\" (expected 9:16 or 4:5)"
            ))),
        }
    }
}

/// Edge distances in design units (top/right/bottom/left).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Insets {
    /// Top edge.
    pub top: f64,
    /// Right edge.
    pub right: f64,
    /// Bottom edge.
    pub bottom: f64,
    /// Left edge.
    pub left: f64,
}

impl Insets {
    /// The story safe area: content kept clear of the bands social apps draw over.
    pub const SAFE_AREA: Self = Self {
        top: 250.0,
        right: 80.0,
        bottom: 100.0,
        left: 80.0,
    };

    /// Multiply every edge by `s`.
    pub fn scaled(self, s: f64) -> Self {
        Self {
            top: self.top * s,
            right: self.right * s,
            bottom: self.bottom * s,
            left: self.left * s,
        }
    }

    /// Shrink `rect` by these insets.
    pub fn inset_rect(self, rect: Rect) -> Rect {
        Rect::new(
            rect.x0 + self.left,
            rect.y0 + self.top,
            rect.x1 - self.right,
            rect.y1 - self.bottom,
        )
    }
}

impl Default for Insets {
    fn default() -> Self {
        Self::SAFE_AREA
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        use crate::foundation::math::mul_div255_u8;

        Self {
            r: mul_div255_u8(u16::from(r), u16::from(a)),
            g: mul_div255_u8(u16::from(g), u16::from(a)),
            b: mul_div255_u8(u16::from(b), u16::from(a)),
            a,
        }
    }

    /// Channels as an array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
