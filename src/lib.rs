//! Bounded-memory batching relay for structured log events.
//!
//! Producers hand pre-serialized events to a [`BatchSink`]; a single worker
//! drains them into size-limited batches on a recurring timer and passes each
//! batch to a [`Transport`]. Consecutive delivery failures stretch the
//! interval between attempts and eventually shed buffered data, so memory
//! stays bounded through a collector outage. Delivery is best-effort: events
//! may be dropped under sustained failure, and anything still queued when the
//! process exits without [`BatchSink::shutdown`] is lost.

mod config;
mod dispatcher;
mod event;
mod queue;
mod sink;
mod status;
mod timer;
mod transport;

#[cfg(test)]
mod testing;

pub use config::{BatchSinkBuilder, ConfigError, IncludePredicate};
pub use event::LogEvent;
pub use sink::{BatchSink, EmitError};
pub use status::BackoffPolicy;
pub use transport::{HttpTransport, Transport, TransportError};
