use serde::{Deserialize, Serialize};
use std::fmt;

pub use kurbo::{Point, Rect, Vec2};

/// Geographic coordinate in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Create a coordinate from latitude and longitude.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Planar point with `x = lng`, `y = lat`.
    pub fn to_point(self) -> Point {
        Point::new(self.lng, self.lat)
    }

    /// Inverse of [`LatLng::to_point`].
    pub fn from_point(p: Point) -> Self {
        Self { lat: p.y, lng: p.x }
    }

    /// Return `true` when both components are finite.
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
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
            Arr([f64; 2]),
            Obj { lat: f64, lng: f64 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr([lat, lng]) => Ok(Self { lat, lng }),
            Repr::Obj { lat, lng } => Ok(Self { lat, lng }),
        }
    }
}

/// Axis-aligned geographic rectangle, inclusive on every edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// Minimum latitude.
    pub south: f64,
    /// Minimum longitude.
    pub west: f64,
    /// Maximum latitude.
    pub north: f64,
    /// Maximum longitude.
    pub east: f64,
}

impl GeoBounds {
    /// Smallest rectangle containing every point, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let rect = it.fold(Rect::from_points(first.to_point(), first.to_point()), |r, p| {
            r.union_pt(p.to_point())
        });
        Some(Self::from_rect(rect))
    }

    /// Convert from a planar rectangle (`x = lng`, `y = lat`).
    pub fn from_rect(r: Rect) -> Self {
        let r = r.abs();
        Self {
            south: r.y0,
            west: r.x0,
            north: r.y1,
            east: r.x1,
        }
    }

    /// Planar rectangle (`x = lng`, `y = lat`).
    pub fn to_rect(self) -> Rect {
        Rect::new(self.west, self.south, self.east, self.north)
    }

    /// Return `true` when `p` lies inside or on the rectangle.
    pub fn contains(self, p: LatLng) -> bool {
        self.south <= p.lat && p.lat <= self.north && self.west <= p.lng && p.lng <= self.east
    }

    /// Midpoint of the rectangle.
    pub fn center(self) -> LatLng {
        LatLng::from_point(self.to_rect().center())
    }

    /// Latitude and longitude extents.
    pub fn span(self) -> (f64, f64) {
        (self.north - self.south, self.east - self.west)
    }
}

/// Identifier of a search vertex.
///
/// Backends emit ids either as JSON strings or integers; both normalize to the decimal string.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct VertexId(pub String);

impl VertexId {
    /// Create an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VertexId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<u64> for VertexId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for VertexId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(String),
            Unsigned(u64),
            Signed(i64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Str(s) => Ok(Self(s)),
            Repr::Unsigned(n) => Ok(Self(n.to_string())),
            Repr::Signed(n) => Ok(Self(n.to_string())),
        }
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
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

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
