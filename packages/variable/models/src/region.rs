//! Query regions and date ranges.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Largest radius accepted for a circular region, in metres.
pub const MAX_RADIUS_M: f64 = 50_000.0;

/// Half-width, in degrees, of the box used for a bare centre point.
pub const POINT_HALF_SPAN_DEG: f64 = 0.1;

/// Mean Earth radius used for haversine distances, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

const METERS_PER_DEGREE: f64 = 111_320.0;

/// A WGS84 coordinate as sent by clients (`{"lat": .., "lng": ..}`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `(lat, lng)` in metres.
    #[must_use]
    pub fn haversine_distance_m(self, lat: f64, lng: f64) -> f64 {
        let d_lat = (lat - self.lat).to_radians();
        let d_lng = (lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Box spanning `half_lat` degrees north/south and `half_lng` degrees
    /// east/west of `center`, clipped to valid coordinates.
    #[must_use]
    pub fn around(center: GeoPoint, half_lat: f64, half_lng: f64) -> Self {
        Self {
            west: (center.lng - half_lng).max(-180.0),
            south: (center.lat - half_lat).max(-90.0),
            east: (center.lng + half_lng).min(180.0),
            north: (center.lat + half_lat).min(90.0),
        }
    }

    /// Whether `(lat, lng)` lies inside the box (edges included).
    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.south..=self.north).contains(&lat) && (self.west..=self.east).contains(&lng)
    }
}

/// The area a fetch request covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Region {
    /// An explicit rectangle.
    Bounds(BoundingBox),
    /// A bare centre point, expanded to +/- [`POINT_HALF_SPAN_DEG`].
    Point(GeoPoint),
    /// A circle around a centre point.
    Circle {
        /// Circle centre.
        center: GeoPoint,
        /// Radius in metres, at most [`MAX_RADIUS_M`].
        radius_m: f64,
    },
}

impl Region {
    /// Builds the region for a centre point and an optional radius.
    ///
    /// The radius is clamped to [`MAX_RADIUS_M`]; a missing or
    /// non-positive radius yields [`Region::Point`].
    #[must_use]
    pub fn around(center: GeoPoint, radius_m: Option<f64>) -> Self {
        match radius_m {
            Some(radius) if radius.is_finite() && radius > 0.0 => Self::Circle {
                center,
                radius_m: radius.min(MAX_RADIUS_M),
            },
            _ => Self::Point(center),
        }
    }

    /// Rectangle enclosing the region.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        match *self {
            Self::Bounds(bbox) => bbox,
            Self::Point(center) => {
                BoundingBox::around(center, POINT_HALF_SPAN_DEG, POINT_HALF_SPAN_DEG)
            }
            Self::Circle { center, radius_m } => {
                let half_lat = radius_m / METERS_PER_DEGREE;
                let half_lng =
                    radius_m / (METERS_PER_DEGREE * center.lat.to_radians().cos().max(1e-6));
                BoundingBox::around(center, half_lat, half_lng)
            }
        }
    }

    /// Whether `(lat, lng)` falls inside the region.
    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        match *self {
            Self::Bounds(_) | Self::Point(_) => self.bounding_box().contains(lat, lng),
            Self::Circle { center, radius_m } => {
                center.haversine_distance_m(lat, lng) <= radius_m
                    && self.bounding_box().contains(lat, lng)
            }
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bounds(b) => write!(
                f,
                "bounds(n={},s={},e={},w={})",
                b.north, b.south, b.east, b.west
            ),
            Self::Point(c) => write!(f, "point(lat={},lng={})", c.lat, c.lng),
            Self::Circle { center, radius_m } => write!(
                f,
                "circle(lat={},lng={},r={radius_m})",
                center.lat, center.lng
            ),
        }
    }
}

/// An inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new range. Callers validate `start <= end`.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days` days ending on `today`.
    #[must_use]
    pub fn trailing_days(today: NaiveDate, days: u32) -> Self {
        let start = today
            .checked_sub_days(chrono::Days::new(u64::from(days)))
            .unwrap_or(today);
        Self { start, end: today }
    }

    /// Number of days between `start` and `end`.
    #[must_use]
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}
