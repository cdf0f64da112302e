use crate::foundation::core::{GeoBounds, LatLng, VertexId};
use crate::foundation::error::{VizError, VizResult};
use crate::scene::model::Style;
use std::collections::BTreeMap;
use std::fmt;

/// Stable identity of a drawn entity across frames.
///
/// Keys are what the diff engine compares; two frames that require the same key with the same
/// geometry and style share one surface entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderKey {
    /// Vertex marker, keyed by vertex id.
    Vertex(VertexId),
    /// Line between two vertices, displayed as `"from-to"`. Snapshot edges and the linker's
    /// parent connector share this key space.
    Edge {
        /// Source vertex.
        from: VertexId,
        /// Target vertex.
        to: VertexId,
    },
    /// The single best-known-path overlay.
    TempPath,
}

impl RenderKey {
    /// Key for an edge between two vertices.
    pub fn edge(from: &VertexId, to: &VertexId) -> Self {
        Self::Edge {
            from: from.clone(),
            to: to.clone(),
        }
    }
}

impl fmt::Display for RenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex(id) => write!(f, "{id}"),
            Self::Edge { from, to } => write!(f, "{from}-{to}"),
            Self::TempPath => f.write_str("__temp_path__"),
        }
    }
}

/// Opaque handle returned by a surface for a drawn entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityHandle(pub u64);

/// Drawing capability the playback engine renders through.
///
/// Implemented by the map layer. The engine never draws directly; it only decides which entities
/// must exist and calls these methods. Style is applied at creation time, so a restyle is a
/// `remove` followed by a fresh draw.
pub trait DrawingSurface {
    /// Draw a point marker and return its handle.
    fn draw_marker(
        &mut self,
        key: &RenderKey,
        at: LatLng,
        style: &Style,
    ) -> VizResult<EntityHandle>;

    /// Draw a polyline and return its handle.
    fn draw_line(
        &mut self,
        key: &RenderKey,
        path: &[LatLng],
        style: &Style,
    ) -> VizResult<EntityHandle>;

    /// Remove a previously drawn entity.
    fn remove(&mut self, handle: EntityHandle) -> VizResult<()>;

    /// Move the viewport so `bounds` is visible.
    fn fit_bounds(&mut self, bounds: GeoBounds) -> VizResult<()>;
}

/// One call observed by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    /// `draw_marker`.
    DrawMarker {
        /// Entity key.
        key: RenderKey,
        /// Marker position.
        at: LatLng,
        /// Marker style.
        style: Style,
        /// Handle returned.
        handle: EntityHandle,
    },
    /// `draw_line`.
    DrawLine {
        /// Entity key.
        key: RenderKey,
        /// Line vertices.
        path: Vec<LatLng>,
        /// Line style.
        style: Style,
        /// Handle returned.
        handle: EntityHandle,
    },
    /// `remove`.
    Remove {
        /// Handle removed.
        handle: EntityHandle,
    },
    /// `fit_bounds`.
    FitBounds {
        /// Requested viewport.
        bounds: GeoBounds,
    },
}

impl SurfaceCall {
    /// Return `true` for draw or remove calls (anything that changes what is on screen).
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::FitBounds { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum LiveEntity {
    Marker(RenderKey),
    Line(RenderKey),
}

/// Surface double that records every call and tracks what is currently live.
///
/// Removing an unknown handle is an error, which makes double-free bugs in the engine visible in
/// tests. [`RecordingSurface::refuse_next_remove`] injects a one-off failure.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<SurfaceCall>,
    live: BTreeMap<EntityHandle, LiveEntity>,
    next_handle: u64,
    refuse_remove: bool,
}

impl RecordingSurface {
    /// Create an empty recording surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call in order.
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Forget recorded calls; live entities are kept.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of recorded draw/remove calls.
    pub fn mutation_count(&self) -> usize {
        self.calls.iter().filter(|c| c.is_mutation()).count()
    }

    /// Keys of live markers, sorted.
    pub fn live_markers(&self) -> Vec<RenderKey> {
        let mut out: Vec<_> = self
            .live
            .values()
            .filter_map(|e| match e {
                LiveEntity::Marker(k) => Some(k.clone()),
                LiveEntity::Line(_) => None,
            })
            .collect();
        out.sort();
        out
    }

    /// Keys of live lines, sorted.
    pub fn live_lines(&self) -> Vec<RenderKey> {
        let mut out: Vec<_> = self
            .live
            .values()
            .filter_map(|e| match e {
                LiveEntity::Line(k) => Some(k.clone()),
                LiveEntity::Marker(_) => None,
            })
            .collect();
        out.sort();
        out
    }

    /// Make the next `remove` fail without touching the entity.
    pub fn refuse_next_remove(&mut self) {
        self.refuse_remove = true;
    }

    /// Total live entities.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// The most recent `fit_bounds` argument.
    pub fn last_bounds(&self) -> Option<GeoBounds> {
        self.calls.iter().rev().find_map(|c| match c {
            SurfaceCall::FitBounds { bounds } => Some(*bounds),
            _ => None,
        })
    }

    fn alloc(&mut self, entity: LiveEntity) -> EntityHandle {
        let handle = EntityHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(handle, entity);
        handle
    }
}

impl DrawingSurface for RecordingSurface {
    fn draw_marker(
        &mut self,
        key: &RenderKey,
        at: LatLng,
        style: &Style,
    ) -> VizResult<EntityHandle> {
        let handle = self.alloc(LiveEntity::Marker(key.clone()));
        self.calls.push(SurfaceCall::DrawMarker {
            key: key.clone(),
            at,
            style: style.clone(),
            handle,
        });
        Ok(handle)
    }

    fn draw_line(
        &mut self,
        key: &RenderKey,
        path: &[LatLng],
        style: &Style,
    ) -> VizResult<EntityHandle> {
        let handle = self.alloc(LiveEntity::Line(key.clone()));
        self.calls.push(SurfaceCall::DrawLine {
            key: key.clone(),
            path: path.to_vec(),
            style: style.clone(),
            handle,
        });
        Ok(handle)
    }

    fn remove(&mut self, handle: EntityHandle) -> VizResult<()> {
        if std::mem::take(&mut self.refuse_remove) {
            return Err(VizError::surface(format!("remove of handle {} refused", handle.0)));
        }
        if self.live.remove(&handle).is_none() {
            return Err(VizError::surface(format!(
                "remove of unknown handle {}",
                handle.0
            )));
        }
        self.calls.push(SurfaceCall::Remove { handle });
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) -> VizResult<()> {
        self.calls.push(SurfaceCall::FitBounds { bounds });
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
