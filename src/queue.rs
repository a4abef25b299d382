use std::collections::VecDeque;
use std::sync::Mutex;

use crate::event::LogEvent;

/// FIFO buffer of events waiting for the next batch.
///
/// Uses `std::sync::Mutex` (not tokio) because the lock is never held across
/// `.await`; each operation is a single push, pop, or swap. Producers only
/// ever touch the lock for the duration of one append, so a slow dispatch
/// can never block `emit`.
#[derive(Default)]
pub(crate) struct EventQueue {
    inner: Mutex<VecDeque<LogEvent>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: LogEvent) {
        self.inner.lock().unwrap().push_back(event);
    }

    pub fn pop(&self) -> Option<LogEvent> {
        self.inner.lock().unwrap().pop_front()
    }

    /// Discard everything. Returns the number of events dropped.
    pub fn clear(&self) -> usize {
        let mut guard = self.inner.lock().unwrap();
        let dropped = guard.len();
        guard.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}
