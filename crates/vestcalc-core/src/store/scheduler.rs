use std::time::{Duration, Instant};

/// A single pending-write slot.
///
/// Scheduling replaces whatever was pending, so a burst of mutations
/// collapses into one write carrying the last snapshot, due one window after
/// the last mutation.
#[derive(Debug)]
pub struct SaveScheduler<T> {
    window: Duration,
    slot: Option<PendingWrite<T>>,
}

#[derive(Debug)]
struct PendingWrite<T> {
    due: Instant,
    snapshot: T,
}

impl<T> SaveScheduler<T> {
    pub fn new(window: Duration) -> Self {
        SaveScheduler { window, slot: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn schedule(&mut self, now: Instant, snapshot: T) {
        self.slot = Some(PendingWrite {
            due: now + self.window,
            snapshot,
        });
    }

    /// Take the snapshot if its window has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        if self.slot.as_ref().is_some_and(|p| p.due <= now) {
            self.take_now()
        } else {
            None
        }
    }

    /// Take the snapshot regardless of its due time.
    pub fn take_now(&mut self) -> Option<T> {
        self.slot.take().map(|p| p.snapshot)
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.slot.as_ref().map(|p| p.due)
    }

    pub fn cancel(&mut self) {
        self.slot = None;
    }
}
