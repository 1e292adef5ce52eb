use serde::{Deserialize, Serialize};

use crate::foundation::core::{BezPath, Point, Rect};
use crate::foundation::error::{StoryplateError, StoryplateResult};

/// Fraction of the destination the route may occupy.
pub const DEFAULT_SHRINK: f64 = 0.9;

/// Geographic point in degrees. Serialized as `[lat, lng]`; `{lat, lng}` is also accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LatLng {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl LatLng {
    /// Build from latitude and longitude.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl Serialize for LatLng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        [self.lat, self.lng].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LatLng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Pair([f64; 2]),
            Obj {
                lat: f64,
                #[serde(alias = "lon")]
                lng: f64,
            },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Pair([lat, lng]) => Ok(Self::new(lat, lng)),
            Repr::Obj { lat, lng } => Ok(Self::new(lat, lng)),
        }
    }
}

/// Latitude/longitude extent of a route.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    /// Southernmost latitude.
    pub min_lat: f64,
    /// Northernmost latitude.
    pub max_lat: f64,
    /// Westernmost longitude.
    pub min_lng: f64,
    /// Easternmost longitude.
    pub max_lng: f64,
}

impl GeoBounds {
    /// Bounds of `points`; `None` when empty.
    pub fn of(points: &[LatLng]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lng: first.lng,
            max_lng: first.lng,
        };
        Some(points.iter().fold(init, |b, p| Self {
            min_lat: b.min_lat.min(p.lat),
            max_lat: b.max_lat.max(p.lat),
            min_lng: b.min_lng.min(p.lng),
            max_lng: b.max_lng.max(p.lng),
        }))
    }

    /// Latitude extent.
    pub fn lat_range(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Longitude extent.
    pub fn lng_range(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    /// Midpoint.
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.max_lat + self.min_lat) / 2.0,
            (self.max_lng + self.min_lng) / 2.0,
        )
    }
}

/// Uniform geo → canvas mapping for one route and destination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteProjection {
    /// Route extent.
    pub bounds: GeoBounds,
    /// Route midpoint, mapped to the destination center.
    pub center: LatLng,
    /// Pixels per degree on both axes.
    pub scale: f64,
    /// Destination rectangle.
    pub dest: Rect,
}

impl RouteProjection {
    /// Fit `points` into `dest`, keeping `shrink` of the tighter axis.
    ///
    /// Fewer than two points, or a zero extent on either axis, is an
    /// [`StoryplateError::EmptyRoute`].
    pub fn fit(points: &[LatLng], dest: Rect, shrink: f64) -> StoryplateResult<Self> {
        if points.len() < 2 {
            return Err(StoryplateError::empty_route(format!(
                "{} point(s); need at least 2",
                points.len()
            )));
        }
        let bounds = GeoBounds::of(points)
            .ok_or_else(|| StoryplateError::empty_route("no points"))?;
        let (lat_range, lng_range) = (bounds.lat_range(), bounds.lng_range());
        if !(lat_range > 0.0 && lng_range > 0.0) {
            return Err(StoryplateError::empty_route(format!(
                "zero extent (lat range {lat_range}, lng range {lng_range})"
            )));
        }
        if dest.width() <= 0.0 || dest.height() <= 0.0 {
            return Err(StoryplateError::empty_route("destination rectangle is empty"));
        }
        let scale_x = dest.width() / lng_range;
        let scale_y = dest.height() / lat_range;
        Ok(Self {
            bounds,
            center: bounds.center(),
            scale: scale_x.min(scale_y) * shrink,
            dest,
        })
    }

    /// Canvas position of one point (y grows downwards).
    pub fn apply(&self, p: LatLng) -> Point {
        let c = self.dest.center();
        Point::new(
            c.x + (p.lng - self.center.lng) * self.scale,
            c.y - (p.lat - self.center.lat) * self.scale,
        )
    }

    /// Canvas positions of all points.
    pub fn project_all(&self, points: &[LatLng]) -> Vec<Point> {
        points.iter().map(|&p| self.apply(p)).collect()
    }
}

/// Project `points` into `dest` with the given shrink factor.
pub fn project(points: &[LatLng], dest: Rect, shrink: f64) -> StoryplateResult<Vec<Point>> {
    let proj = RouteProjection::fit(points, dest, shrink)?;
    Ok(proj.project_all(points))
}

/// Open polyline through `points`.
pub fn to_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let mut it = points.iter();
    if let Some(first) = it.next() {
        path.move_to(*first);
        for p in it {
            path.line_to(*p);
        }
    }
    path
}

#[cfg(test)]
#[path = "../../tests/unit/geo/projector.rs"]
mod tests;
