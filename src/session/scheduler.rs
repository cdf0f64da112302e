use std::collections::BTreeMap;
use std::time::Duration;

/// Handle for one scheduled autoplay tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickHandle(pub u64);

/// Timer capability the playback controller schedules autoplay through.
///
/// A scheduled tick fires once. The host delivers it by calling
/// [`crate::PlaybackController::on_tick`] with the handle; cancelled handles must never be
/// delivered, and the controller ignores any handle it is not waiting for.
pub trait Scheduler {
    /// Register a tick to fire after `delay`.
    fn schedule(&mut self, delay: Duration) -> TickHandle;

    /// Cancel a pending tick. Cancelling an unknown or already-fired handle is a no-op.
    fn cancel(&mut self, handle: TickHandle);
}

/// Deterministic scheduler driven by a virtual clock.
///
/// Time only moves when the host calls [`ManualScheduler::advance`] or
/// [`ManualScheduler::advance_to_next`]. Used by tests and by the frame exporter.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<TickHandle, Duration>,
    scheduled_total: u64,
    cancelled_total: u64,
}

impl ManualScheduler {
    /// Create a scheduler at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of ticks waiting to fire.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Ticks scheduled since creation.
    pub fn scheduled_total(&self) -> u64 {
        self.scheduled_total
    }

    /// Ticks cancelled since creation.
    pub fn cancelled_total(&self) -> u64 {
        self.cancelled_total
    }

    /// Due time of the earliest pending tick.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.values().min().copied()
    }

    /// Move the clock forward by `by` and return the ticks that came due, earliest first.
    ///
    /// Fired ticks are removed from the pending set.
    pub fn advance(&mut self, by: Duration) -> Vec<TickHandle> {
        self.now = self.now.saturating_add(by);
        let mut due: Vec<(Duration, TickHandle)> = self
            .pending
            .iter()
            .filter(|(_, at)| **at <= self.now)
            .map(|(h, at)| (*at, *h))
            .collect();
        due.sort();
        for (_, h) in &due {
            self.pending.remove(h);
        }
        due.into_iter().map(|(_, h)| h).collect()
    }

    /// Jump the clock to the earliest pending tick and fire it.
    pub fn advance_to_next(&mut self) -> Option<TickHandle> {
        let (at, handle) = self
            .pending
            .iter()
            .map(|(h, at)| (*at, *h))
            .min()?;
        self.pending.remove(&handle);
        self.now = self.now.max(at);
        Some(handle)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TickHandle {
        let handle = TickHandle(self.next_id);
        self.next_id += 1;
        self.scheduled_total += 1;
        self.pending.insert(handle, self.now.saturating_add(delay));
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.pending.remove(&handle).is_some() {
            self.cancelled_total += 1;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/scheduler.rs"]
mod tests;
