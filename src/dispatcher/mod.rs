use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::config::IncludePredicate;
use crate::event::LogEvent;
use crate::queue::EventQueue;
use crate::status::ConnectionStatus;
use crate::timer::TickHandler;
use crate::transport::Transport;

/// Drains the queue into size-limited batches and hands them to the
/// transport, one tick at a time.
///
/// The working batch survives a failed dispatch so the same events are
/// retried on the next tick; only the drop-batch policy discards them. A
/// backlog drains in back-to-back batches within a single tick for as long
/// as each batch comes out full.
pub(crate) struct BatchDispatcher<T: Transport> {
    queue: Arc<EventQueue>,
    transport: T,
    status: ConnectionStatus,
    predicate: Option<IncludePredicate>,
    batch_size_limit: usize,
    batch: Vec<LogEvent>,
}

impl<T: Transport> BatchDispatcher<T> {
    pub fn new(
        queue: Arc<EventQueue>,
        transport: T,
        batch_size_limit: usize,
        predicate: Option<IncludePredicate>,
        status: ConnectionStatus,
    ) -> Self {
        Self {
            queue,
            transport,
            status,
            predicate,
            batch_size_limit,
            batch: Vec::with_capacity(batch_size_limit),
        }
    }

    /// Top up the working batch from the queue, applying the inclusion
    /// predicate. Excluded events are discarded without being dispatched.
    fn fill_batch(&mut self) {
        while self.batch.len() < self.batch_size_limit {
            let Some(event) = self.queue.pop() else { break };
            if self.include(&event) {
                self.batch.push(event);
            }
        }
    }

    fn include(&self, event: &LogEvent) -> bool {
        self.predicate.as_ref().is_none_or(|accept| accept(event))
    }

    /// One tick: dispatch full batches back-to-back, stop on the first
    /// non-full batch or failure, then apply the drop policies. Returns the
    /// delay before the next tick. Nothing in here propagates an error;
    /// a failed dispatch only feeds the backoff state.
    async fn run_once(&mut self) -> Duration {
        loop {
            self.fill_batch();
            if self.batch.is_empty() {
                break;
            }

            let was_full = self.batch.len() >= self.batch_size_limit;
            let result = self.transport.dispatch(&self.batch).await;
            match result {
                Ok(()) => {
                    debug!(events = self.batch.len(), "batch dispatched");
                    self.batch.clear();
                    self.status.mark_success();
                    if !was_full {
                        break;
                    }
                }
                Err(e) => {
                    error!(
                        error = %e,
                        events = self.batch.len(),
                        "batch dispatch failed"
                    );
                    self.status.mark_failure();
                    // keep the batch; it is retried on the next tick
                    break;
                }
            }
        }

        if self.status.should_drop_batch() && !self.batch.is_empty() {
            warn!(
                events = self.batch.len(),
                "dropping batch after repeated dispatch failures"
            );
            self.batch.clear();
        }
        if self.status.should_drop_queue() {
            let dropped = self.queue.clear();
            if dropped > 0 {
                warn!(events = dropped, "dropping pending queue during outage");
            }
        }

        self.status.next_interval()
    }
}

impl<T: Transport> TickHandler for BatchDispatcher<T> {
    async fn tick(&mut self) -> Duration {
        self.run_once().await
    }

    async fn drain(&mut self) {
        self.run_once().await;
    }
}
