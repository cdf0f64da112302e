use super::*;
use crate::foundation::core::{LatLng, VertexId};
use crate::render::surface::{RecordingSurface, RenderKey, SurfaceCall};
use crate::scene::model::{EdgeState, VertexState};
use crate::session::opts::DEFAULT_INTERVAL;
use crate::session::scheduler::ManualScheduler;

type Ctl = PlaybackController<RecordingSurface, ManualScheduler>;

fn id(s: &str) -> VertexId {
    VertexId::from(s)
}

fn ctl() -> Ctl {
    PlaybackController::new(
        RecordingSurface::new(),
        ManualScheduler::new(),
        PlaybackOpts::default(),
    )
}

/// Snapshot `i` holds vertices `0..=i` in a row, each linked to its predecessor.
fn growing(len: usize) -> StepSequence {
    let steps = (0..len)
        .map(|i| {
            let mut s = Snapshot {
                current_id: Some(VertexId::from(i as u64)),
                previous_node: i.checked_sub(1).map(|p| VertexId::from(p as u64)),
                ..Snapshot::default()
            };
            for v in 0..=i {
                s.vertices
                    .insert(VertexId::from(v as u64), VertexState::new(0.0, v as f64));
            }
            for v in 1..=i {
                s.edges.push(EdgeState::new((v - 1) as u64, v as u64));
            }
            s
        })
        .collect();
    StepSequence::new(steps)
}

fn two_steps() -> StepSequence {
    let mut a = Snapshot {
        current_id: Some(id("A")),
        ..Snapshot::default()
    };
    let mut va = VertexState::new(0.0, 0.0);
    va.is_current = true;
    a.vertices.insert(id("A"), va);

    let mut b = Snapshot {
        current_id: Some(id("B")),
        previous_node: Some(id("A")),
        ..Snapshot::default()
    };
    b.vertices.insert(id("A"), VertexState::new(0.0, 0.0).visited());
    let mut vb = VertexState::new(1.0, 1.0);
    vb.is_current = true;
    b.vertices.insert(id("B"), vb);
    b.edges.push(EdgeState::new("A", "B"));

    StepSequence::new(vec![a, b])
}

#[test]
fn two_step_scenario_draws_two_markers_and_one_line() {
    let mut c = ctl();
    c.start(two_steps()).unwrap();
    assert_eq!(c.state(), PlaybackState::Ready);
    assert_eq!(c.surface().live_markers(), vec![RenderKey::Vertex(id("A"))]);
    assert!(c.surface().live_lines().is_empty());

    c.next().unwrap();
    assert_eq!(c.current_index(), 1);
    assert_eq!(
        c.surface().live_markers(),
        vec![RenderKey::Vertex(id("A")), RenderKey::Vertex(id("B"))]
    );
    assert_eq!(
        c.surface().live_lines(),
        vec![RenderKey::edge(&id("A"), &id("B"))]
    );

    let bounds = c.last_bounds().unwrap();
    assert!(bounds.contains(LatLng::new(0.0, 0.0)));
    assert!(bounds.contains(LatLng::new(1.0, 1.0)));
    assert_eq!(c.surface().last_bounds(), Some(bounds));
}

#[test]
fn index_is_clamped_to_last_step() {
    for k in 0..7 {
        let mut c = ctl();
        c.start(growing(4)).unwrap();
        for _ in 0..k {
            c.next().unwrap();
        }
        assert_eq!(c.current_index(), k.min(3));
    }
}

#[test]
fn boundary_moves_touch_nothing() {
    let mut c = ctl();
    c.start(growing(3)).unwrap();
    c.surface_mut().clear_calls();
    c.previous().unwrap();
    assert_eq!(c.current_index(), 0);
    assert!(c.surface().calls().is_empty());

    c.seek(2).unwrap();
    c.surface_mut().clear_calls();
    c.next().unwrap();
    assert_eq!(c.current_index(), 2);
    assert!(c.surface().calls().is_empty());
}

#[test]
fn reset_is_idempotent() {
    let mut c = ctl();
    c.start(growing(4)).unwrap();
    c.seek(3).unwrap();

    c.reset().unwrap();
    let first: Vec<_> = c.render_state().keys().cloned().collect();
    let live = c.surface().live_count();

    c.reset().unwrap();
    let second: Vec<_> = c.render_state().keys().cloned().collect();
    assert_eq!(first, second);
    assert_eq!(c.surface().live_count(), live);
    assert_eq!(c.current_index(), 0);
    assert_eq!(c.state(), PlaybackState::Ready);
    assert_eq!(live, 1);
}

#[test]
fn seek_renders_only_the_target_frame() {
    let mut c = ctl();
    c.start(growing(5)).unwrap();
    c.seek(4).unwrap();
    assert_eq!(c.surface().live_markers().len(), 5);
    c.seek(1).unwrap();
    assert_eq!(c.surface().live_markers().len(), 2);
    assert_eq!(c.surface().live_count(), c.render_state().len());
}

#[test]
fn seek_out_of_range_is_not_found() {
    let mut c = ctl();
    c.start(growing(2)).unwrap();
    let err = c.seek(2).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(c.current_index(), 0);
}

#[test]
fn autoplay_takes_len_minus_one_ticks() {
    let mut c = ctl();
    c.start(growing(4)).unwrap();
    c.play();
    assert!(c.is_playing());

    let mut advanced = 0;
    while let Some(tick) = c.scheduler_mut().advance_to_next() {
        if c.on_tick(tick).unwrap() {
            advanced += 1;
        }
    }
    assert_eq!(advanced, 3);
    assert_eq!(c.current_index(), 3);
    assert_eq!(c.state(), PlaybackState::Finished);
    assert_eq!(c.scheduler().pending_len(), 0);
    assert_eq!(c.scheduler().scheduled_total(), 3);
    assert_eq!(c.scheduler().now(), DEFAULT_INTERVAL * 3);
}

#[test]
fn stale_tick_is_ignored() {
    let mut c = ctl();
    c.start(growing(3)).unwrap();
    c.play();
    let stale = c.pending_tick().unwrap();
    c.pause();
    assert_eq!(c.state(), PlaybackState::Paused);
    assert_eq!(c.scheduler().pending_len(), 0);

    c.play();
    assert!(!c.on_tick(stale).unwrap());
    assert_eq!(c.current_index(), 0);

    let live = c.pending_tick().unwrap();
    assert_ne!(live, stale);
    assert!(c.on_tick(live).unwrap());
    assert_eq!(c.current_index(), 1);
}

#[test]
fn start_cancels_pending_tick() {
    let mut c = ctl();
    c.start(growing(3)).unwrap();
    c.play();
    let old = c.pending_tick().unwrap();

    c.start(two_steps()).unwrap();
    assert_eq!(c.state(), PlaybackState::Ready);
    assert_eq!(c.scheduler().pending_len(), 0);
    assert!(!c.on_tick(old).unwrap());
    assert_eq!(c.current_index(), 0);
    assert_eq!(c.surface().live_markers(), vec![RenderKey::Vertex(id("A"))]);
}

#[test]
fn set_speed_applies_from_next_tick() {
    let mut c = ctl();
    c.start(growing(4)).unwrap();
    c.play();
    c.set_speed(Duration::from_millis(100));
    assert_eq!(c.scheduler().next_due(), Some(DEFAULT_INTERVAL));

    let tick = c.scheduler_mut().advance_to_next().unwrap();
    c.on_tick(tick).unwrap();
    assert_eq!(
        c.scheduler().next_due(),
        Some(DEFAULT_INTERVAL + Duration::from_millis(100))
    );
}

#[test]
fn manual_next_to_last_finishes_autoplay() {
    let mut c = ctl();
    c.start(growing(2)).unwrap();
    c.play();
    c.next().unwrap();
    assert_eq!(c.state(), PlaybackState::Finished);
    assert_eq!(c.scheduler().pending_len(), 0);

    c.previous().unwrap();
    assert_eq!(c.state(), PlaybackState::Paused);
}

#[test]
fn play_on_single_step_finishes_immediately() {
    let mut c = ctl();
    c.start(growing(1)).unwrap();
    c.play();
    assert_eq!(c.state(), PlaybackState::Finished);
    assert_eq!(c.scheduler().scheduled_total(), 0);
}

#[test]
fn empty_sequence_is_inert() {
    let mut c = ctl();
    c.start(StepSequence::default()).unwrap();
    assert_eq!(c.state(), PlaybackState::Empty);
    c.play();
    c.next().unwrap();
    c.previous().unwrap();
    c.reset().unwrap();
    c.pause();
    assert_eq!(c.state(), PlaybackState::Empty);
    assert_eq!(c.scheduler().scheduled_total(), 0);
    assert!(c.surface().calls().is_empty());
    assert!(c.summary().is_none());
    assert_eq!(c.progress(), ProgressInfo::default());
}

#[test]
fn dangling_edge_is_not_drawn() {
    let mut s = Snapshot::default();
    s.vertices.insert(id("A"), VertexState::new(0.0, 0.0));
    s.edges.push(EdgeState::new("A", "GHOST"));

    let mut c = ctl();
    c.start(StepSequence::new(vec![s])).unwrap();
    assert_eq!(c.surface().live_markers(), vec![RenderKey::Vertex(id("A"))]);
    assert!(c.surface().live_lines().is_empty());
}

#[test]
fn clear_removes_everything() {
    let mut c = ctl();
    c.start(growing(3)).unwrap();
    c.seek(2).unwrap();
    c.play();
    c.seek(0).unwrap();
    c.clear().unwrap();
    assert_eq!(c.state(), PlaybackState::Empty);
    assert_eq!(c.surface().live_count(), 0);
    assert!(c.render_state().is_empty());
    assert_eq!(c.scheduler().pending_len(), 0);
    assert!(c.is_empty());
}

#[test]
fn fit_bounds_can_be_disabled() {
    let mut c = PlaybackController::new(
        RecordingSurface::new(),
        ManualScheduler::new(),
        PlaybackOpts::default().with_fit_bounds(false),
    );
    c.start(growing(2)).unwrap();
    c.next().unwrap();
    assert!(c.surface().last_bounds().is_none());
    assert!(c.last_bounds().is_none());
}

#[test]
fn progress_and_summary_follow_index() {
    let mut c = ctl();
    c.start(growing(4)).unwrap();
    c.seek(1).unwrap();
    let p = c.progress();
    assert_eq!((p.current_step, p.total_steps), (2, 4));
    let s = c.summary().unwrap();
    assert_eq!(s.current_id, Some(VertexId::from(1u64)));
    assert_eq!(s.step, 2);
}

#[test]
fn reset_while_playing_cancels_and_redraws() {
    let mut c = ctl();
    c.start(growing(3)).unwrap();
    c.play();
    let tick = c.scheduler_mut().advance_to_next().unwrap();
    assert!(c.on_tick(tick).unwrap());
    let old = c.pending_tick().unwrap();
    let v0 = RenderKey::Vertex(VertexId::from(0u64));
    let before = c.render_state().handle(&v0).unwrap();
    c.surface_mut().clear_calls();

    c.reset().unwrap();
    assert_eq!(c.scheduler().pending_len(), 0);
    assert_eq!(c.state(), PlaybackState::Ready);
    assert_eq!(c.current_index(), 0);
    assert!(!c.on_tick(old).unwrap());
    assert_eq!(c.current_index(), 0);

    let calls = c.surface().calls();
    let first_remove = calls
        .iter()
        .position(|call| matches!(call, SurfaceCall::Remove { .. }))
        .unwrap();
    let first_draw = calls
        .iter()
        .position(|call| {
            matches!(
                call,
                SurfaceCall::DrawMarker { .. } | SurfaceCall::DrawLine { .. }
            )
        })
        .unwrap();
    assert!(first_remove < first_draw);
    assert_ne!(c.render_state().handle(&v0), Some(before));
    assert_eq!(c.surface().live_count(), 1);
}

#[test]
fn refused_remove_during_reset_leaves_playback_paused() {
    let mut c = ctl();
    c.start(growing(3)).unwrap();
    c.play();
    c.surface_mut().refuse_next_remove();

    assert!(c.reset().is_err());
    assert_eq!(c.state(), PlaybackState::Paused);
    assert_eq!(c.scheduler().pending_len(), 0);
    assert_eq!(c.render_state().len(), c.surface().live_count());

    c.play();
    assert!(c.is_playing());
    assert!(c.pending_tick().is_some());

    c.reset().unwrap();
    assert_eq!(c.state(), PlaybackState::Ready);
    assert_eq!(c.render_state().len(), 1);
    assert_eq!(c.surface().live_count(), 1);
}

#[test]
fn refused_remove_during_start_keeps_old_sequence() {
    let mut c = ctl();
    c.start(growing(3)).unwrap();
    c.seek(1).unwrap();
    c.play();
    c.surface_mut().refuse_next_remove();

    assert!(c.start(two_steps()).is_err());
    assert_eq!(c.state(), PlaybackState::Paused);
    assert_eq!(c.len(), 3);
    assert_eq!(c.current_index(), 1);
    assert_eq!(c.render_state().len(), c.surface().live_count());

    c.start(two_steps()).unwrap();
    assert_eq!(c.surface().live_markers(), vec![RenderKey::Vertex(id("A"))]);
    assert_eq!(c.surface().live_count(), 1);
}
