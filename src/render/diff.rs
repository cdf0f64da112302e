use crate::foundation::core::LatLng;
use crate::foundation::error::VizResult;
use crate::render::surface::{DrawingSurface, EntityHandle, RenderKey};
use crate::scene::model::Style;
use std::collections::BTreeMap;

/// Geometry of an entity the current frame needs on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityShape {
    /// Point marker.
    Marker {
        /// Marker position.
        at: LatLng,
    },
    /// Polyline through at least two points.
    Line {
        /// Line vertices in order.
        path: Vec<LatLng>,
    },
}

impl EntityShape {
    /// Every coordinate that must be inside the viewport for this shape.
    pub fn points(&self) -> &[LatLng] {
        match self {
            Self::Marker { at } => std::slice::from_ref(at),
            Self::Line { path } => path,
        }
    }
}

/// Geometry plus style for one required entity.
#[derive(Debug, Clone, PartialEq)]
pub struct RequiredEntity {
    /// Shape to draw.
    pub shape: EntityShape,
    /// Style applied at creation.
    pub style: Style,
}

impl RequiredEntity {
    /// Required point marker.
    pub fn marker(at: LatLng, style: Style) -> Self {
        Self {
            shape: EntityShape::Marker { at },
            style,
        }
    }

    /// Required polyline.
    pub fn line(path: Vec<LatLng>, style: Style) -> Self {
        Self {
            shape: EntityShape::Line { path },
            style,
        }
    }
}

/// Complete set of entities one frame requires, by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequiredSet {
    entities: BTreeMap<RenderKey, RequiredEntity>,
}

impl RequiredSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, returning the one it replaced under the same key.
    pub fn insert(&mut self, key: RenderKey, entity: RequiredEntity) -> Option<RequiredEntity> {
        self.entities.insert(key, entity)
    }

    /// Look up a required entity.
    pub fn get(&self, key: &RenderKey) -> Option<&RequiredEntity> {
        self.entities.get(key)
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Return `true` when nothing is required.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&RenderKey, &RequiredEntity)> {
        self.entities.iter()
    }
}

#[derive(Debug, Clone)]
struct DrawnEntity {
    handle: EntityHandle,
    entity: RequiredEntity,
}

/// The engine's record of what is currently drawn.
///
/// Only mutated through [`RenderDiffEngine::reconcile`] and [`RenderState::clear`], so it always
/// mirrors the live entities on the surface it was reconciled against.
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    drawn: BTreeMap<RenderKey, DrawnEntity>,
}

impl RenderState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of drawn entities.
    pub fn len(&self) -> usize {
        self.drawn.len()
    }

    /// Return `true` when nothing is drawn.
    pub fn is_empty(&self) -> bool {
        self.drawn.is_empty()
    }

    /// Return `true` when `key` is drawn.
    pub fn contains(&self, key: &RenderKey) -> bool {
        self.drawn.contains_key(key)
    }

    /// Surface handle for `key`.
    pub fn handle(&self, key: &RenderKey) -> Option<EntityHandle> {
        self.drawn.get(key).map(|d| d.handle)
    }

    /// Drawn keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &RenderKey> {
        self.drawn.keys()
    }

    /// Every marker position and line vertex currently drawn.
    pub fn points(&self) -> impl Iterator<Item = LatLng> + '_ {
        self.drawn
            .values()
            .flat_map(|d| d.entity.shape.points().iter().copied())
    }

    /// Return `true` when the drawn set equals `required` key-for-key and entity-for-entity.
    pub fn matches(&self, required: &RequiredSet) -> bool {
        self.drawn.len() == required.len()
            && self
                .drawn
                .iter()
                .all(|(k, d)| required.get(k) == Some(&d.entity))
    }

    /// Remove every drawn entity from `surface` and empty the state.
    ///
    /// An entity whose removal fails stays in the state, along with everything not yet removed.
    pub fn clear(&mut self, surface: &mut dyn DrawingSurface) -> VizResult<usize> {
        let n = self.drawn.len();
        while let Some((key, drawn)) = self.drawn.pop_first() {
            tracing::trace!(%key, handle = drawn.handle.0, "clear");
            if let Err(e) = surface.remove(drawn.handle) {
                self.drawn.insert(key, drawn);
                return Err(e);
            }
        }
        Ok(n)
    }

    fn remove(&mut self, key: &RenderKey, surface: &mut dyn DrawingSurface) -> VizResult<()> {
        if let Some(handle) = self.handle(key) {
            tracing::trace!(%key, handle = handle.0, "remove");
            surface.remove(handle)?;
            self.drawn.remove(key);
        }
        Ok(())
    }
}

/// Keys partitioned by the action reconciliation must take.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffPlan {
    /// Drawn but no longer required.
    pub remove: Vec<RenderKey>,
    /// Required but not drawn.
    pub add: Vec<RenderKey>,
    /// Drawn and required, but with different geometry or style.
    pub restyle: Vec<RenderKey>,
}

impl DiffPlan {
    /// Return `true` when reconciliation would not touch the surface.
    pub fn is_noop(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty() && self.restyle.is_empty()
    }
}

/// Surface operation counts from one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    /// Entities drawn for new keys.
    pub added: usize,
    /// Entities removed for dropped keys.
    pub removed: usize,
    /// Entities destroyed and redrawn because their appearance changed.
    pub restyled: usize,
}

impl DiffStats {
    /// Total `draw_*` plus `remove` calls issued.
    pub fn surface_ops(self) -> usize {
        self.added + self.removed + 2 * self.restyled
    }
}

/// Keyed reconciliation between a [`RenderState`] and a [`RequiredSet`].
pub struct RenderDiffEngine;

impl RenderDiffEngine {
    /// Compute the actions needed to turn `state` into `required`.
    pub fn plan(state: &RenderState, required: &RequiredSet) -> DiffPlan {
        let mut plan = DiffPlan::default();
        for (key, drawn) in &state.drawn {
            match required.get(key) {
                None => plan.remove.push(key.clone()),
                Some(want) if *want != drawn.entity => plan.restyle.push(key.clone()),
                Some(_) => {}
            }
        }
        for (key, _) in required.iter() {
            if !state.drawn.contains_key(key) {
                plan.add.push(key.clone());
            }
        }
        plan
    }

    /// Apply the plan to `surface` and update `state`.
    ///
    /// On return `state` equals `required` exactly. Removals run before draws, so a surface never
    /// holds two entities for one key. On error `state` still lists every entity the surface
    /// holds, so a later call picks up where this one stopped.
    pub fn reconcile(
        state: &mut RenderState,
        required: &RequiredSet,
        surface: &mut dyn DrawingSurface,
    ) -> VizResult<DiffStats> {
        let plan = Self::plan(state, required);
        let mut stats = DiffStats::default();
        if plan.is_noop() {
            return Ok(stats);
        }

        for key in plan.remove.iter().chain(plan.restyle.iter()) {
            state.remove(key, surface)?;
        }
        stats.removed = plan.remove.len();

        for key in plan.restyle.iter().chain(plan.add.iter()) {
            let Some(want) = required.get(key) else {
                continue;
            };
            let handle = draw(surface, key, want)?;
            tracing::trace!(%key, handle = handle.0, "draw");
            state.drawn.insert(
                key.clone(),
                DrawnEntity {
                    handle,
                    entity: want.clone(),
                },
            );
        }
        stats.added = plan.add.len();
        stats.restyled = plan.restyle.len();

        tracing::debug!(
            added = stats.added,
            removed = stats.removed,
            restyled = stats.restyled,
            drawn = state.len(),
            "reconciled render state"
        );
        Ok(stats)
    }
}

fn draw(
    surface: &mut dyn DrawingSurface,
    key: &RenderKey,
    entity: &RequiredEntity,
) -> VizResult<EntityHandle> {
    match &entity.shape {
        EntityShape::Marker { at } => surface.draw_marker(key, *at, &entity.style),
        EntityShape::Line { path } => surface.draw_line(key, path, &entity.style),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/diff.rs"]
mod tests;
