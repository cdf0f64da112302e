use crate::foundation::core::{LatLng, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Visual style applied when an entity is created on the surface.
///
/// `size` is the marker diameter for vertices and the stroke width for lines; edge payloads may
/// spell it `width`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// CSS-style color, usually `#RRGGBB`.
    pub color: String,
    /// Marker size or line width in pixels.
    #[serde(default = "default_size", alias = "width")]
    pub size: f64,
    /// Opacity in `[0, 1]`.
    #[serde(default = "one")]
    pub opacity: f64,
}

impl Style {
    /// Create a style from its parts.
    pub fn new(color: impl Into<String>, size: f64, opacity: f64) -> Self {
        Self {
            color: color.into(),
            size,
            opacity,
        }
    }
}

fn default_size() -> f64 {
    8.0
}

fn one() -> f64 {
    1.0
}

/// Search front a snapshot belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Expansion from the origin.
    #[default]
    Forward,
    /// Expansion from the destination.
    Backward,
}

/// One vertex as seen in a single snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexState {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Whether the search has settled this vertex.
    #[serde(default)]
    pub visited: bool,
    /// Whether this vertex is the one being expanded in this frame.
    #[serde(default)]
    pub is_current: bool,
    /// Tentative distance from the origin; `None` while unreached.
    #[serde(default, deserialize_with = "de_distance")]
    pub distance: Option<f64>,
    /// Explicit style; derived from the state flags when absent.
    #[serde(default)]
    pub style: Option<Style>,
}

impl VertexState {
    /// Unvisited, unstyled vertex at `(lat, lng)`.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            visited: false,
            is_current: false,
            distance: None,
            style: None,
        }
    }

    /// Return `self` with the visited flag set.
    pub fn visited(mut self) -> Self {
        self.visited = true;
        self
    }

    /// Return `self` with an explicit style.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Vertex position.
    pub fn coord(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Explicit style, or the state-derived default.
    ///
    /// Current vertices are large and red, visited ones blue, discovered ones green, everything
    /// else grey.
    pub fn effective_style(&self) -> Style {
        if let Some(s) = &self.style {
            return s.clone();
        }
        if self.is_current {
            Style::new("#e74c3c", 12.0, 1.0)
        } else if self.visited {
            Style::new("#3498db", 8.0, 1.0)
        } else if self.distance.is_some() {
            Style::new("#2ecc71", 8.0, 0.8)
        } else {
            Style::new("#95a5a6", 8.0, 0.8)
        }
    }
}

/// One directed edge as seen in a single snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeState {
    /// Source vertex id.
    pub from: VertexId,
    /// Target vertex id.
    pub to: VertexId,
    /// Whether the edge lies on the current shortest-path tree.
    #[serde(default)]
    pub is_path: bool,
    /// Explicit style; derived from `is_path` when absent.
    #[serde(default)]
    pub style: Option<Style>,
}

impl EdgeState {
    /// Unstyled edge between two vertices.
    pub fn new(from: impl Into<VertexId>, to: impl Into<VertexId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            is_path: false,
            style: None,
        }
    }

    /// Return `self` with an explicit style.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Explicit style, or the default for path/non-path edges.
    pub fn effective_style(&self) -> Style {
        if let Some(s) = &self.style {
            return s.clone();
        }
        if self.is_path {
            Style::new("#e74c3c", 4.0, 0.8)
        } else {
            Style::new("#bdc3c7", 2.0, 0.5)
        }
    }
}

/// One frame of the search.
///
/// Snapshots are produced by the pathfinding service and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Vertices by id.
    #[serde(default)]
    pub vertices: BTreeMap<VertexId, VertexState>,
    /// Edges in emission order.
    #[serde(default)]
    pub edges: Vec<EdgeState>,
    /// Vertex being expanded in this frame.
    #[serde(default)]
    pub current_id: Option<VertexId>,
    /// Parent of `current_id` in the search tree.
    #[serde(default)]
    pub previous_node: Option<VertexId>,
    /// Which search front produced this frame.
    #[serde(default)]
    pub direction: Direction,
    /// Best-known path at this frame.
    #[serde(default)]
    pub temp_path: Option<Vec<LatLng>>,
}

impl Snapshot {
    /// Look up a vertex by id.
    pub fn vertex(&self, id: &VertexId) -> Option<&VertexState> {
        self.vertices.get(id)
    }

    /// The vertex named by `current_id`, if present.
    pub fn current_vertex(&self) -> Option<&VertexState> {
        self.current_id.as_ref().and_then(|id| self.vertex(id))
    }

    /// Number of vertices flagged as visited.
    pub fn visited_count(&self) -> usize {
        self.vertices.values().filter(|v| v.visited).count()
    }
}

fn de_distance<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(f64),
        Text(String),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Repr::Num(d)) if d.is_finite() => Ok(Some(d)),
        Some(Repr::Num(_)) => Ok(None),
        Some(Repr::Text(s)) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("inf") || s.eq_ignore_ascii_case("infinity") {
                return Ok(None);
            }
            let d: f64 = s
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid distance \"{s}\"")))?;
            Ok(d.is_finite().then_some(d))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
