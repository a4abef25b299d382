use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tracing::trace;

use crate::config::BatchSinkBuilder;
use crate::dispatcher::BatchDispatcher;
use crate::event::LogEvent;
use crate::queue::EventQueue;
use crate::timer::RecurringTimer;
use crate::transport::Transport;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    /// An event with an empty payload carries nothing to deliver.
    #[error("log event payload is empty")]
    EmptyEvent,
}

/// Idle → Running → Disposed, never backwards.
///
/// The dispatcher sits inert in `Idle` until the first emit hands it to the
/// worker; after that the timer owns it outright.
enum Lifecycle<T: Transport> {
    Idle(BatchDispatcher<T>),
    Running(RecurringTimer),
    Disposed,
}

/// The producer-facing sink: enqueue events, let the worker batch them out.
///
/// `emit` is synchronous, non-blocking, and safe to call from any thread
/// inside a tokio runtime. The first emit starts the dispatch worker with an
/// immediate first tick so early events get fast feedback; after
/// [`shutdown`](BatchSink::shutdown) the sink silently discards everything.
///
/// Two locks, never nested the other way around: this lifecycle lock guards
/// state transitions and the decision to start the worker; the queue has its
/// own lock scoped to single append/remove operations. Neither is ever held
/// across `.await`.
pub struct BatchSink<T: Transport> {
    queue: Arc<EventQueue>,
    state: Mutex<Lifecycle<T>>,
}

impl<T: Transport> std::fmt::Debug for BatchSink<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchSink").finish_non_exhaustive()
    }
}

impl<T: Transport> BatchSink<T> {
    /// Start configuring a sink around the given transport.
    pub fn builder(transport: T) -> BatchSinkBuilder<T> {
        BatchSinkBuilder::new(transport)
    }

    pub(crate) fn from_parts(queue: Arc<EventQueue>, dispatcher: BatchDispatcher<T>) -> Self {
        Self {
            queue,
            state: Mutex::new(Lifecycle::Idle(dispatcher)),
        }
    }

    /// Hand one event to the sink. Fire-and-forget: the only error a
    /// producer ever sees is an empty payload, reported before any state
    /// changes. Never waits on the transport.
    pub fn emit(&self, event: LogEvent) -> Result<(), EmitError> {
        if event.is_empty() {
            return Err(EmitError::EmptyEvent);
        }

        let mut state = self.state.lock().unwrap();
        match std::mem::replace(&mut *state, Lifecycle::Disposed) {
            Lifecycle::Disposed => {
                trace!("event discarded, sink already shut down");
            }
            Lifecycle::Running(timer) => {
                *state = Lifecycle::Running(timer);
                drop(state);
                self.queue.push(event);
            }
            Lifecycle::Idle(dispatcher) => {
                self.queue.push(event);
                // First tick fires immediately; the steady period only
                // applies from the second tick on.
                *state = Lifecycle::Running(RecurringTimer::spawn(Duration::ZERO, dispatcher));
            }
        }
        Ok(())
    }

    /// Stop the worker and flush what remains. Idempotent.
    ///
    /// The first call waits out any in-flight dispatch, runs one final
    /// drain pass over the queue, and only then returns; no dispatch runs
    /// afterwards. Events emitted after this are discarded. Without this
    /// call, queued events are lost when the sink is dropped.
    pub async fn shutdown(&self) {
        let timer = {
            let mut state = self.state.lock().unwrap();
            match std::mem::replace(&mut *state, Lifecycle::Disposed) {
                Lifecycle::Running(timer) => Some(timer),
                Lifecycle::Idle(_) | Lifecycle::Disposed => None,
            }
        };
        if let Some(timer) = timer {
            timer.shutdown().await;
        }
    }
}
