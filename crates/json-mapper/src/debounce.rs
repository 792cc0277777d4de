//! Debouncer for text edits.
//!
//! Each push replaces the pending item and restarts the quiet period, so
//! an item superseded before the delay elapses is never yielded. Time is
//! supplied by the caller.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn push(&mut self, item: T, now: Instant) {
        self.pending = Some((item, now));
    }

    /// Takes the pending item once `delay` has passed since the last push.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = matches!(
            &self.pending,
            Some((_, at)) if now.saturating_duration_since(*at) >= self.delay
        );
        if ready {
            self.pending.take().map(|(item, _)| item)
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops the pending item without yielding it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(item, _)| item)
    }
}
