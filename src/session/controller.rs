use crate::foundation::core::GeoBounds;
use crate::foundation::error::VizResult;
use crate::render::bounds::BoundsTracker;
use crate::render::diff::{DiffStats, RenderDiffEngine, RenderState};
use crate::render::frame::required_entities;
use crate::render::linker::BidirectionalLinker;
use crate::render::surface::DrawingSurface;
use crate::scene::model::Snapshot;
use crate::scene::sequence::StepSequence;
use crate::session::opts::PlaybackOpts;
use crate::session::progress::{ProgressInfo, StepSummary};
use crate::session::scheduler::{Scheduler, TickHandle};
use serde::Serialize;
use std::time::Duration;

/// Playback state machine.
///
/// `Empty -> Ready -> {Paused, Playing} -> Finished`; `reset` goes back to `Ready`, or `Empty`
/// when there is nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// No snapshots loaded.
    Empty,
    /// Freshly started or reset; nothing has been played yet.
    Ready,
    /// Autoplay stopped by the user.
    Paused,
    /// Autoplay running; exactly one tick is pending.
    Playing,
    /// Autoplay reached the last step.
    Finished,
}

/// Drives which snapshot is current and renders it through a [`DrawingSurface`].
///
/// The controller exclusively owns the sequence, the render state and the one outstanding
/// autoplay tick. Every operation is synchronous: when it returns, the surface already shows the
/// new current step. Pending ticks are always cancelled before `start`, `pause`, `stop`, `reset`
/// and `clear` mutate anything, so a stale tick can never advance a fresh session.
pub struct PlaybackController<D, S> {
    surface: D,
    scheduler: S,
    sequence: StepSequence,
    index: usize,
    state: PlaybackState,
    interval: Duration,
    fit_bounds: bool,
    linker: BidirectionalLinker,
    render_state: RenderState,
    bounds: BoundsTracker,
    pending: Option<TickHandle>,
    last_diff: DiffStats,
}

impl<D: DrawingSurface, S: Scheduler> PlaybackController<D, S> {
    /// Create an empty controller rendering to `surface` and scheduling through `scheduler`.
    pub fn new(surface: D, scheduler: S, opts: PlaybackOpts) -> Self {
        Self {
            surface,
            scheduler,
            sequence: StepSequence::default(),
            index: 0,
            state: PlaybackState::Empty,
            interval: opts.interval,
            fit_bounds: opts.fit_bounds,
            linker: BidirectionalLinker::new(opts.palette),
            render_state: RenderState::new(),
            bounds: BoundsTracker::new(),
            pending: None,
            last_diff: DiffStats::default(),
        }
    }

    /// Load `sequence` and show its first step.
    ///
    /// Anything drawn for a previous sequence is removed first.
    #[tracing::instrument(level = "debug", skip(self, sequence), fields(steps = sequence.len()))]
    pub fn start(&mut self, sequence: StepSequence) -> VizResult<()> {
        self.halt();
        self.render_state.clear(&mut self.surface)?;
        self.sequence = sequence;
        self.index = 0;
        if self.sequence.is_empty() {
            self.state = PlaybackState::Empty;
            return Ok(());
        }
        self.state = PlaybackState::Ready;
        self.render_current()
    }

    /// Advance one step. No-op at the last step or on an empty sequence.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn next(&mut self) -> VizResult<()> {
        let Some(last) = self.sequence.last_index() else {
            return Ok(());
        };
        if self.index >= last {
            return Ok(());
        }
        self.move_to(self.index + 1)
    }

    /// Go back one step. No-op at step 0.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn previous(&mut self) -> VizResult<()> {
        if self.sequence.is_empty() || self.index == 0 {
            return Ok(());
        }
        self.move_to(self.index - 1)
    }

    /// Jump to `index`.
    ///
    /// Out-of-range indices return [`crate::VizError::NotFound`] and leave everything unchanged.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn seek(&mut self, index: usize) -> VizResult<()> {
        self.sequence.try_get(index)?;
        if index == self.index {
            return Ok(());
        }
        self.move_to(index)
    }

    /// Remove everything drawn, return to step 0 and draw it again.
    ///
    /// Autoplay is cancelled first. If the surface refuses a removal the current step is kept,
    /// playback is left `Paused` and the error is returned.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn reset(&mut self) -> VizResult<()> {
        self.halt();
        self.render_state.clear(&mut self.surface)?;
        self.index = 0;
        if self.sequence.is_empty() {
            self.state = PlaybackState::Empty;
            return Ok(());
        }
        self.state = PlaybackState::Ready;
        self.render_current()
    }

    /// Drop the sequence and everything drawn.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) -> VizResult<()> {
        self.halt();
        self.render_state.clear(&mut self.surface)?;
        self.sequence = StepSequence::default();
        self.index = 0;
        self.state = PlaybackState::Empty;
        Ok(())
    }

    /// Start autoplay.
    ///
    /// No-op while already playing or on an empty sequence. At the last step (including a
    /// one-step sequence) playback goes straight to `Finished` without scheduling a tick.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn play(&mut self) {
        match self.state {
            PlaybackState::Empty | PlaybackState::Playing => return,
            PlaybackState::Ready | PlaybackState::Paused | PlaybackState::Finished => {}
        }
        self.cancel_pending();
        if self.at_last() {
            self.state = PlaybackState::Finished;
            return;
        }
        self.state = PlaybackState::Playing;
        self.schedule_tick();
    }

    /// Stop autoplay, keeping the current step.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn pause(&mut self) {
        self.cancel_pending();
        if self.state != PlaybackState::Empty {
            self.state = PlaybackState::Paused;
        }
    }

    /// Alias of [`PlaybackController::pause`].
    pub fn stop(&mut self) {
        self.pause();
    }

    /// Change the autoplay interval.
    ///
    /// An already-pending tick keeps its original deadline; the new interval applies from the
    /// next scheduled tick.
    pub fn set_speed(&mut self, interval: Duration) {
        tracing::debug!(?interval, "set playback speed");
        self.interval = interval;
    }

    /// Deliver a fired autoplay tick.
    ///
    /// Returns `Ok(true)` when the tick advanced playback. Ticks the controller is not waiting for
    /// are ignored. A render failure pauses playback and is returned.
    pub fn on_tick(&mut self, handle: TickHandle) -> VizResult<bool> {
        if self.pending != Some(handle) {
            tracing::debug!(tick = handle.0, "ignoring stale tick");
            return Ok(false);
        }
        self.pending = None;
        if self.state != PlaybackState::Playing || self.at_last() {
            return Ok(false);
        }

        self.index += 1;
        if let Err(e) = self.render_current() {
            self.state = PlaybackState::Paused;
            return Err(e);
        }
        if self.at_last() {
            tracing::debug!(index = self.index, "autoplay finished");
            self.state = PlaybackState::Finished;
        } else {
            self.schedule_tick();
        }
        Ok(true)
    }

    /// Index of the current step.
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Return `true` when no sequence (or an empty one) is loaded.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Return `true` while autoplay is running.
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current autoplay interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The tick currently awaited, if any.
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending
    }

    /// The loaded sequence.
    pub fn sequence(&self) -> &StepSequence {
        &self.sequence
    }

    /// The current snapshot, `None` when empty.
    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.sequence.get(self.index)
    }

    /// What is currently drawn.
    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    /// Surface operation counts from the most recent render.
    pub fn last_diff(&self) -> DiffStats {
        self.last_diff
    }

    /// Viewport passed to the surface by the most recent render.
    pub fn last_bounds(&self) -> Option<GeoBounds> {
        self.bounds.last()
    }

    /// Step counter for progress displays.
    pub fn progress(&self) -> ProgressInfo {
        ProgressInfo::new(self.index, self.sequence.len())
    }

    /// Description of the current step.
    pub fn summary(&self) -> Option<StepSummary> {
        self.current_snapshot()
            .map(|s| StepSummary::new(self.index, self.sequence.len(), s))
    }

    /// Borrow the surface.
    pub fn surface(&self) -> &D {
        &self.surface
    }

    /// Mutably borrow the surface, e.g. to rasterize it.
    ///
    /// Callers must not draw or remove entities through this borrow; the render state would no
    /// longer match the surface.
    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }

    /// Borrow the scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutably borrow the scheduler, e.g. to advance a virtual clock.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn at_last(&self) -> bool {
        self.sequence.last_index() == Some(self.index)
    }

    fn move_to(&mut self, index: usize) -> VizResult<()> {
        self.index = index;
        self.render_current()?;
        let at_last = self.at_last();
        match self.state {
            PlaybackState::Playing if at_last => {
                self.cancel_pending();
                self.state = PlaybackState::Finished;
            }
            PlaybackState::Finished if !at_last => self.state = PlaybackState::Paused,
            _ => {}
        }
        Ok(())
    }

    fn render_current(&mut self) -> VizResult<()> {
        let Some(snap) = self.sequence.get(self.index) else {
            return Ok(());
        };
        let required = required_entities(snap, &self.linker);
        self.last_diff =
            RenderDiffEngine::reconcile(&mut self.render_state, &required, &mut self.surface)?;
        if self.fit_bounds {
            self.bounds.fit(&self.render_state, &mut self.surface)?;
        }
        Ok(())
    }

    fn schedule_tick(&mut self) {
        let handle = self.scheduler.schedule(self.interval);
        tracing::trace!(tick = handle.0, "scheduled autoplay tick");
        self.pending = Some(handle);
    }

    /// Cancel autoplay ahead of a fallible step; a failure then leaves the controller `Paused`.
    fn halt(&mut self) {
        self.cancel_pending();
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            tracing::trace!(tick = handle.0, "cancelled autoplay tick");
            self.scheduler.cancel(handle);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/controller.rs"]
mod tests;
