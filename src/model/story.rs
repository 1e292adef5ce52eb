use serde::{Deserialize, Serialize};

use crate::assets::color::Color;

/// Club whose route renders as a flat pink stroke.
pub const HEDONISM_CLUB: &str = "hedonism";
/// Club used when the state names none.
pub const DEFAULT_CLUB: &str = "not-in-paris";

/// How the background is painted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    /// Story photo (or the configured default), aspect-filled.
    #[default]
    #[serde(alias = "photo")]
    Image,
    /// Flat black or white, opposite the font color.
    Solid,
    /// Fixed vertical purple gradient.
    Gradient,
    /// Three vertical stripes.
    #[serde(alias = "french")]
    Flag,
    /// The template page's own background fill.
    Template,
}

/// One activity metric as shown in the grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    /// Label, e.g. `Distance`; matched case-insensitively.
    pub data_name: String,
    /// Preformatted value.
    #[serde(default)]
    pub data: String,
    /// Hidden metrics leave their cell empty.
    #[serde(default = "yes")]
    pub visible: bool,
}

impl Metric {
    /// Visible metric.
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            data_name: name.into(),
            data: data.into(),
            visible: true,
        }
    }

    /// Value to print: an em dash for empty or `"0"` values.
    pub fn display_value(&self) -> &str {
        let v = self.data.trim();
        if v.is_empty() || v == "0" { "\u{2014}" } else { v }
    }
}

fn yes() -> bool {
    true
}

fn default_club() -> String {
    DEFAULT_CLUB.to_owned()
}

fn default_ride_data() -> Vec<Metric> {
    vec![
        Metric::new("Distance", ""),
        Metric::new("Elevation", ""),
        Metric::new("Time", ""),
    ]
}

fn default_speed_data() -> Vec<Metric> {
    vec![Metric::new("Avg Speed", "")]
}

/// Title visibility; accepts `true`/`false` or `{ "visible": .. }`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TitleVisible {
    /// Whether the title block is drawn.
    pub visible: bool,
}

impl Default for TitleVisible {
    fn default() -> Self {
        Self { visible: true }
    }
}

impl<'de> Deserialize<'de> for TitleVisible {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Obj { visible: bool },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Flag(visible) | Repr::Obj { visible } => Self { visible },
        })
    }
}

/// Snapshot of the exporter's state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryState {
    /// Background photo URL.
    pub image: Option<String>,
    /// Club id; selects route stroke and logo.
    pub club: String,
    /// Background painting mode.
    pub background_mode: BackgroundMode,
    /// Text color; also picks the scrim.
    pub font_color: Color,
    /// Draw the background photo in monochrome.
    pub is_mono: bool,
    /// Distance, elevation and time metrics.
    #[serde(rename = "RideData", alias = "rideData")]
    pub ride_data: Vec<Metric>,
    /// Speed metrics.
    pub speed_data: Vec<Metric>,
    /// Activity title.
    pub title: String,
    /// Activity date, upper-cased when drawn.
    pub date: String,
    /// Title block visibility.
    pub title_visible: TitleVisible,
}

impl Default for StoryState {
    fn default() -> Self {
        Self {
            image: None,
            club: default_club(),
            background_mode: BackgroundMode::Image,
            font_color: Color::WHITE,
            is_mono: false,
            ride_data: default_ride_data(),
            speed_data: default_speed_data(),
            title: String::new(),
            date: String::new(),
            title_visible: TitleVisible::default(),
        }
    }
}

/// The four grid slots in their fixed order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricSlots<'a> {
    /// Upper row, left.
    pub distance: Option<&'a Metric>,
    /// Upper row, center.
    pub elevation: Option<&'a Metric>,
    /// Upper row, right.
    pub time: Option<&'a Metric>,
    /// Lower row, center.
    pub speed: Option<&'a Metric>,
}

impl MetricSlots<'_> {
    /// `true` when no slot is filled.
    pub fn is_empty(&self) -> bool {
        self.distance.is_none()
            && self.elevation.is_none()
            && self.time.is_none()
            && self.speed.is_none()
    }
}

impl StoryState {
    /// `true` when the font color is white (drives scrim and solid background).
    pub fn is_light_text(&self) -> bool {
        self.font_color.is_white()
    }

    /// Club id, falling back to the default club for blank values.
    pub fn club_id(&self) -> &str {
        let c = self.club.trim();
        if c.is_empty() { DEFAULT_CLUB } else { c }
    }

    /// First visible metric of each slot, matched by name.
    pub fn metric_slots(&self) -> MetricSlots<'_> {
        fn find<'a>(list: &'a [Metric], needle: &str) -> Option<&'a Metric> {
            list.iter()
                .filter(|m| m.visible)
                .find(|m| m.data_name.to_lowercase().contains(needle))
        }
        MetricSlots {
            distance: find(&self.ride_data, "distance"),
            elevation: find(&self.ride_data, "elevation"),
            time: find(&self.ride_data, "time"),
            speed: find(&self.speed_data, "speed"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/story.rs"]
mod tests;
