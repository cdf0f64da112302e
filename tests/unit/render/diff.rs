use super::*;
use crate::foundation::core::VertexId;
use crate::render::surface::{RecordingSurface, SurfaceCall};

fn vkey(id: &str) -> RenderKey {
    RenderKey::Vertex(VertexId::from(id))
}

fn marker(lat: f64, color: &str) -> RequiredEntity {
    RequiredEntity::marker(LatLng::new(lat, 0.0), Style::new(color, 8.0, 1.0))
}

fn set(items: &[(&str, RequiredEntity)]) -> RequiredSet {
    let mut s = RequiredSet::new();
    for (k, e) in items {
        s.insert(vkey(k), e.clone());
    }
    s
}

#[test]
fn first_reconcile_adds_everything() {
    let mut state = RenderState::new();
    let mut surface = RecordingSurface::new();
    let req = set(&[("A", marker(0.0, "#f00")), ("B", marker(1.0, "#f00"))]);

    let stats = RenderDiffEngine::reconcile(&mut state, &req, &mut surface).unwrap();
    assert_eq!(stats.added, 2);
    assert_eq!(stats.removed, 0);
    assert!(state.matches(&req));
    assert_eq!(surface.live_markers(), vec![vkey("A"), vkey("B")]);
}

#[test]
fn reconcile_is_idempotent() {
    let mut state = RenderState::new();
    let mut surface = RecordingSurface::new();
    let req = set(&[("A", marker(0.0, "#f00")), ("B", marker(1.0, "#00f"))]);

    RenderDiffEngine::reconcile(&mut state, &req, &mut surface).unwrap();
    surface.clear_calls();

    let stats = RenderDiffEngine::reconcile(&mut state, &req, &mut surface).unwrap();
    assert_eq!(stats, DiffStats::default());
    assert!(surface.calls().is_empty());
    assert!(RenderDiffEngine::plan(&state, &req).is_noop());
}

#[test]
fn removed_added_and_restyled_are_separated() {
    let mut state = RenderState::new();
    let mut surface = RecordingSurface::new();
    let before = set(&[
        ("A", marker(0.0, "#f00")),
        ("B", marker(1.0, "#f00")),
        ("C", marker(2.0, "#f00")),
    ]);
    RenderDiffEngine::reconcile(&mut state, &before, &mut surface).unwrap();
    let old_b = state.handle(&vkey("B")).unwrap();
    let old_a = state.handle(&vkey("A")).unwrap();

    let after = set(&[
        ("A", marker(0.0, "#f00")),
        ("B", marker(1.0, "#0f0")),
        ("D", marker(3.0, "#f00")),
    ]);
    let plan = RenderDiffEngine::plan(&state, &after);
    assert_eq!(plan.remove, vec![vkey("C")]);
    assert_eq!(plan.restyle, vec![vkey("B")]);
    assert_eq!(plan.add, vec![vkey("D")]);

    surface.clear_calls();
    let stats = RenderDiffEngine::reconcile(&mut state, &after, &mut surface).unwrap();
    assert_eq!(
        stats,
        DiffStats {
            added: 1,
            removed: 1,
            restyled: 1
        }
    );
    assert_eq!(stats.surface_ops(), surface.mutation_count());
    assert!(state.matches(&after));
    assert_eq!(state.handle(&vkey("A")), Some(old_a));
    assert_ne!(state.handle(&vkey("B")), Some(old_b));
    assert!(
        surface
            .calls()
            .contains(&SurfaceCall::Remove { handle: old_b })
    );
    assert_eq!(surface.live_markers(), vec![vkey("A"), vkey("B"), vkey("D")]);
}

#[test]
fn geometry_change_counts_as_restyle() {
    let mut state = RenderState::new();
    let mut surface = RecordingSurface::new();
    RenderDiffEngine::reconcile(&mut state, &set(&[("A", marker(0.0, "#f00"))]), &mut surface)
        .unwrap();
    let plan = RenderDiffEngine::plan(&state, &set(&[("A", marker(5.0, "#f00"))]));
    assert_eq!(plan.restyle, vec![vkey("A")]);
}

#[test]
fn empty_required_removes_all() {
    let mut state = RenderState::new();
    let mut surface = RecordingSurface::new();
    RenderDiffEngine::reconcile(
        &mut state,
        &set(&[("A", marker(0.0, "#f00")), ("B", marker(1.0, "#f00"))]),
        &mut surface,
    )
    .unwrap();
    let stats = RenderDiffEngine::reconcile(&mut state, &RequiredSet::new(), &mut surface).unwrap();
    assert_eq!(stats.removed, 2);
    assert!(state.is_empty());
    assert_eq!(surface.live_count(), 0);
}

#[test]
fn clear_removes_from_surface() {
    let mut state = RenderState::new();
    let mut surface = RecordingSurface::new();
    RenderDiffEngine::reconcile(&mut state, &set(&[("A", marker(0.0, "#f00"))]), &mut surface)
        .unwrap();
    assert_eq!(state.clear(&mut surface).unwrap(), 1);
    assert!(state.is_empty());
    assert_eq!(surface.live_count(), 0);
}

#[test]
fn points_include_line_vertices() {
    let mut state = RenderState::new();
    let mut surface = RecordingSurface::new();
    let mut req = set(&[("A", marker(0.0, "#f00"))]);
    req.insert(
        RenderKey::TempPath,
        RequiredEntity::line(
            vec![LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0)],
            Style::new("#00f", 4.0, 0.8),
        ),
    );
    RenderDiffEngine::reconcile(&mut state, &req, &mut surface).unwrap();
    assert_eq!(state.points().count(), 3);
}

#[test]
fn refused_remove_keeps_state_in_sync() {
    let mut state = RenderState::new();
    let mut surface = RecordingSurface::new();
    RenderDiffEngine::reconcile(&mut state, &set(&[("A", marker(0.0, "#f00"))]), &mut surface)
        .unwrap();

    surface.refuse_next_remove();
    assert!(RenderDiffEngine::reconcile(&mut state, &RequiredSet::new(), &mut surface).is_err());
    assert!(state.contains(&vkey("A")));
    assert_eq!(surface.live_count(), 1);

    RenderDiffEngine::reconcile(&mut state, &RequiredSet::new(), &mut surface).unwrap();
    assert!(state.is_empty());
    assert_eq!(surface.live_count(), 0);
}

#[test]
fn refused_clear_keeps_remaining_entities() {
    let mut state = RenderState::new();
    let mut surface = RecordingSurface::new();
    RenderDiffEngine::reconcile(
        &mut state,
        &set(&[("A", marker(0.0, "#f00")), ("B", marker(1.0, "#f00"))]),
        &mut surface,
    )
    .unwrap();

    surface.refuse_next_remove();
    assert!(state.clear(&mut surface).is_err());
    assert_eq!(state.len(), 2);
    assert_eq!(surface.live_count(), 2);

    assert_eq!(state.clear(&mut surface).unwrap(), 2);
    assert_eq!(surface.live_count(), 0);
}
