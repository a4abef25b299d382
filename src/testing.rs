use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::event::LogEvent;
use crate::transport::{Transport, TransportError};

/// Batches captured by a mock transport.
#[derive(Default)]
pub struct RecordedBatches {
    batches: Mutex<Vec<Vec<LogEvent>>>,
}

impl RecordedBatches {
    fn record(&self, batch: &[LogEvent]) {
        self.batches.lock().unwrap().push(batch.to_vec());
    }

    pub fn batches(&self) -> Vec<Vec<LogEvent>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn dispatch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    /// All delivered events, flattened in delivery order.
    pub fn events(&self) -> Vec<LogEvent> {
        self.batches.lock().unwrap().iter().flatten().cloned().collect()
    }
}

fn simulated_failure() -> TransportError {
    TransportError::Other("simulated dispatch failure".into())
}

/// Records every batch and succeeds.
pub struct RecordingTransport {
    state: Arc<RecordedBatches>,
}

impl RecordingTransport {
    pub fn new() -> (Self, Arc<RecordedBatches>) {
        let state = Arc::new(RecordedBatches::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

impl Transport for RecordingTransport {
    async fn dispatch(&self, batch: &[LogEvent]) -> Result<(), TransportError> {
        self.state.record(batch);
        Ok(())
    }
}

/// Fails every dispatch, counting attempts.
pub struct FailingTransport {
    attempts: Arc<AtomicU32>,
}

impl FailingTransport {
    pub fn new() -> (Self, Arc<AtomicU32>) {
        let attempts = Arc::new(AtomicU32::new(0));
        (
            Self {
                attempts: Arc::clone(&attempts),
            },
            attempts,
        )
    }
}

impl Transport for FailingTransport {
    async fn dispatch(&self, _batch: &[LogEvent]) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(simulated_failure())
    }
}

/// Fails the first `fail_first` dispatches, then records and succeeds.
pub struct FlakyTransport {
    remaining_failures: AtomicU32,
    state: Arc<RecordedBatches>,
}

impl FlakyTransport {
    pub fn new(fail_first: u32) -> (Self, Arc<RecordedBatches>) {
        let state = Arc::new(RecordedBatches::default());
        (
            Self {
                remaining_failures: AtomicU32::new(fail_first),
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

impl Transport for FlakyTransport {
    async fn dispatch(&self, batch: &[LogEvent]) -> Result<(), TransportError> {
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(simulated_failure());
        }
        self.state.record(batch);
        Ok(())
    }
}

/// Sleeps before recording and succeeding, for shutdown-vs-inflight tests.
pub struct SlowTransport {
    delay: Duration,
    state: Arc<RecordedBatches>,
}

impl SlowTransport {
    pub fn new(delay: Duration) -> (Self, Arc<RecordedBatches>) {
        let state = Arc::new(RecordedBatches::default());
        (
            Self {
                delay,
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

impl Transport for SlowTransport {
    async fn dispatch(&self, batch: &[LogEvent]) -> Result<(), TransportError> {
        tokio::time::sleep(self.delay).await;
        self.state.record(batch);
        Ok(())
    }
}

/// Events with recognizable payloads, in order.
pub fn events(count: usize) -> Vec<LogEvent> {
    (0..count).map(|i| LogEvent::new(format!("event-{i:03}"))).collect()
}
