use super::*;
use crate::foundation::core::{LatLng, VertexId};
use crate::render::diff::{RenderDiffEngine, RequiredEntity, RequiredSet};
use crate::render::surface::{RecordingSurface, RenderKey};
use crate::scene::model::Style;

fn style() -> Style {
    Style::new("#000000", 8.0, 1.0)
}

#[test]
fn empty_state_does_not_touch_viewport() {
    let mut tracker = BoundsTracker::new();
    let mut surface = RecordingSurface::new();
    let out = tracker.fit(&RenderState::new(), &mut surface).unwrap();
    assert!(out.is_none());
    assert!(surface.calls().is_empty());
    assert!(tracker.last().is_none());
}

#[test]
fn bounds_cover_markers_and_lines_and_shrink() {
    let mut state = RenderState::new();
    let mut surface = RecordingSurface::new();
    let mut tracker = BoundsTracker::new();

    let mut req = RequiredSet::new();
    req.insert(
        RenderKey::Vertex(VertexId::from("A")),
        RequiredEntity::marker(LatLng::new(0.0, 0.0), style()),
    );
    req.insert(
        RenderKey::TempPath,
        RequiredEntity::line(vec![LatLng::new(-1.0, 2.0), LatLng::new(3.0, 1.0)], style()),
    );
    RenderDiffEngine::reconcile(&mut state, &req, &mut surface).unwrap();
    let b = tracker.fit(&state, &mut surface).unwrap().unwrap();
    assert_eq!((b.south, b.west, b.north, b.east), (-1.0, 0.0, 3.0, 2.0));
    assert_eq!(surface.last_bounds(), Some(b));

    let mut smaller = RequiredSet::new();
    smaller.insert(
        RenderKey::Vertex(VertexId::from("A")),
        RequiredEntity::marker(LatLng::new(0.0, 0.0), style()),
    );
    RenderDiffEngine::reconcile(&mut state, &smaller, &mut surface).unwrap();
    let b = tracker.fit(&state, &mut surface).unwrap().unwrap();
    assert_eq!(b.span(), (0.0, 0.0));
    assert_eq!(tracker.last(), Some(b));
}
