use crate::render::diff::RequiredEntity;
use crate::render::surface::RenderKey;
use crate::scene::model::{Direction, Snapshot, Style};

/// Styles for linker-produced lines.
///
/// The forward and backward fronts must stay visually distinguishable.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPalette {
    /// Connector style for forward-front snapshots.
    pub forward: Style,
    /// Connector style for backward-front snapshots.
    pub backward: Style,
    /// Best-known-path overlay style.
    pub temp_path: Style,
}

impl Default for LinkPalette {
    fn default() -> Self {
        Self {
            forward: Style::new("#2980b9", 3.0, 0.9),
            backward: Style::new("#e67e22", 3.0, 0.9),
            temp_path: Style::new("#0000FF", 4.0, 0.8),
        }
    }
}

impl LinkPalette {
    /// Connector style for `direction`.
    pub fn for_direction(&self, direction: Direction) -> &Style {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }
}

/// Lines derived from a snapshot's parent pointer and best-known path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Links {
    /// Parent-to-current connector, when both ends exist in the snapshot. Keyed like a snapshot
    /// edge so that it replaces the edge between the same pair.
    pub connector: Option<(RenderKey, RequiredEntity)>,
    /// Best-known path overlay under [`RenderKey::TempPath`].
    pub temp_path: Option<RequiredEntity>,
}

/// Reconstructs bidirectional search structure from one snapshot.
#[derive(Debug, Clone, Default)]
pub struct BidirectionalLinker {
    palette: LinkPalette,
}

impl BidirectionalLinker {
    /// Create a linker with the given palette.
    pub fn new(palette: LinkPalette) -> Self {
        Self { palette }
    }

    /// Borrow the palette.
    pub fn palette(&self) -> &LinkPalette {
        &self.palette
    }

    /// Derive the connector and temp-path lines for `snap`.
    ///
    /// The parent pointer is followed exactly once. A root (`previous_node == None`) or a parent
    /// missing from `snap.vertices` yields no connector.
    pub fn link(&self, snap: &Snapshot) -> Links {
        Links {
            connector: self.connector(snap),
            temp_path: self.temp_path(snap),
        }
    }

    fn connector(&self, snap: &Snapshot) -> Option<(RenderKey, RequiredEntity)> {
        let current_id = snap.current_id.as_ref()?;
        let parent_id = snap.previous_node.as_ref()?;
        let Some(parent) = snap.vertex(parent_id) else {
            tracing::debug!(%parent_id, %current_id, "parent not in snapshot; no connector");
            return None;
        };
        let current = snap.vertex(current_id)?;
        if parent_id == current_id {
            return None;
        }
        let style = self.palette.for_direction(snap.direction).clone();
        Some((
            RenderKey::edge(parent_id, current_id),
            RequiredEntity::line(vec![parent.coord(), current.coord()], style),
        ))
    }

    fn temp_path(&self, snap: &Snapshot) -> Option<RequiredEntity> {
        let path = snap.temp_path.as_ref()?;
        let path: Vec<_> = path.iter().copied().filter(|p| p.is_finite()).collect();
        if path.len() < 2 {
            tracing::debug!(points = path.len(), "temp path too short to draw");
            return None;
        }
        Some(RequiredEntity::line(path, self.palette.temp_path.clone()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/linker.rs"]
mod tests;
