use serde::{Deserialize, Serialize};

use crate::foundation::core::{Affine, Point, Size, Vec2};

/// Smallest zoom factor.
pub const ZOOM_MIN: f64 = 0.1;
/// Largest zoom factor.
pub const ZOOM_MAX: f64 = 5.0;
/// Zoom change per wheel notch.
pub const WHEEL_STEP: f64 = 0.1;
/// Margin kept around the page when fitting it into a container.
pub const CANVAS_PADDING: f64 = 64.0;

/// Screen ↔ canvas mapping for the editor.
///
/// `pan` is the screen-space offset of the canvas origin and `padding` a fixed margin added on
/// both axes; a canvas point `c` lands on screen at `pan + padding + c * zoom`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    /// Zoom factor in `[ZOOM_MIN, ZOOM_MAX]`.
    pub zoom: f64,
    /// Screen offset of the canvas origin.
    pub pan: Vec2,
    /// Extra offset on both axes.
    pub padding: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            padding: 0.0,
        }
    }
}

fn clamp_zoom(z: f64) -> Option<f64> {
    z.is_finite().then(|| z.clamp(ZOOM_MIN, ZOOM_MAX))
}

impl Viewport {
    /// Identity viewport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zoom, clamped to the valid range. Non-finite values are ignored.
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.set_zoom(zoom);
        self
    }

    /// Set the pan offset.
    pub fn with_pan(mut self, pan: Vec2) -> Self {
        self.pan = pan;
        self
    }

    /// Set the padding.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Set the zoom without moving the pan, clamped. Returns `true` when it changed.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        match clamp_zoom(zoom) {
            Some(z) if z != self.zoom => {
                self.zoom = z;
                true
            }
            _ => false,
        }
    }

    /// Screen position → canvas position.
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x - self.padding) / self.zoom,
            (screen.y - self.pan.y - self.padding) / self.zoom,
        )
    }

    /// Canvas position → screen position.
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point::new(
            canvas.x * self.zoom + self.pan.x + self.padding,
            canvas.y * self.zoom + self.pan.y + self.padding,
        )
    }

    /// Canvas → screen as an affine transform.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.pan + Vec2::new(self.padding, self.padding))
            * Affine::scale(self.zoom)
    }

    /// Change the zoom keeping the canvas point under `anchor` fixed on screen.
    pub fn zoom_at(&mut self, anchor: Point, zoom: f64) -> bool {
        let Some(z) = clamp_zoom(zoom) else {
            return false;
        };
        if z == self.zoom {
            return false;
        }
        let under = self.screen_to_canvas(anchor);
        self.zoom = z;
        self.pan = Vec2::new(
            anchor.x - self.padding - under.x * z,
            anchor.y - self.padding - under.y * z,
        );
        true
    }

    /// One wheel event at `anchor`: negative `delta_y` zooms in by [`WHEEL_STEP`], positive
    /// zooms out.
    pub fn wheel(&mut self, anchor: Point, delta_y: f64) -> bool {
        let step = if delta_y < 0.0 {
            WHEEL_STEP
        } else if delta_y > 0.0 {
            -WHEEL_STEP
        } else {
            return false;
        };
        self.zoom_at(anchor, self.zoom + step)
    }

    /// Shift the pan by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) -> bool {
        if delta == Vec2::ZERO {
            return false;
        }
        self.pan += delta;
        true
    }

    /// A screen-space drag delta expressed in canvas units.
    pub fn drag_delta(&self, screen_delta: Vec2) -> Vec2 {
        screen_delta / self.zoom
    }

    /// Viewport that shows `page` centered in `container`, never enlarged past 1:1.
    pub fn fit(container: Size, page: Size, padding: f64) -> Self {
        if page.width <= 0.0 || page.height <= 0.0 {
            return Self::default().with_padding(padding);
        }
        let zoom = ((container.width - CANVAS_PADDING) / page.width)
            .min((container.height - CANVAS_PADDING) / page.height)
            .min(1.0);
        let zoom = clamp_zoom(zoom).unwrap_or(ZOOM_MIN);
        let pan = Vec2::new(
            (container.width - page.width * zoom) / 2.0 - padding,
            (container.height - page.height * zoom) / 2.0 - padding,
        );
        Self { zoom, pan, padding }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/viewport.rs"]
mod tests;
