use crate::render::diff::{RequiredEntity, RequiredSet};
use crate::render::linker::BidirectionalLinker;
use crate::render::surface::RenderKey;
use crate::scene::model::Snapshot;

/// Build the complete set of entities `snap` needs on screen.
///
/// Vertices become markers, edges become two-point lines, and the linker contributes the parent
/// connector and the temp-path overlay. The connector is inserted after the snapshot edges, so a
/// `parent-current` edge takes the direction style. Edges whose endpoints are missing from the snapshot, and
/// vertices with non-finite coordinates, are dropped and logged at debug level.
pub fn required_entities(snap: &Snapshot, linker: &BidirectionalLinker) -> RequiredSet {
    let mut out = RequiredSet::new();

    for (id, v) in &snap.vertices {
        let at = v.coord();
        if !at.is_finite() {
            tracing::debug!(vertex = %id, "dropping vertex with non-finite coordinate");
            continue;
        }
        out.insert(
            RenderKey::Vertex(id.clone()),
            RequiredEntity::marker(at, v.effective_style()),
        );
    }

    let mut dropped = 0usize;
    for e in &snap.edges {
        let (Some(from), Some(to)) = (snap.vertex(&e.from), snap.vertex(&e.to)) else {
            tracing::debug!(from = %e.from, to = %e.to, "dropping edge with missing endpoint");
            dropped += 1;
            continue;
        };
        if !from.coord().is_finite() || !to.coord().is_finite() {
            dropped += 1;
            continue;
        }
        out.insert(
            RenderKey::edge(&e.from, &e.to),
            RequiredEntity::line(vec![from.coord(), to.coord()], e.effective_style()),
        );
    }
    if dropped > 0 {
        tracing::debug!(dropped, "edges omitted from frame");
    }

    let links = linker.link(snap);
    if let Some((key, entity)) = links.connector {
        out.insert(key, entity);
    }
    if let Some(entity) = links.temp_path {
        out.insert(RenderKey::TempPath, entity);
    }

    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
