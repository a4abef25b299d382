use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::dispatcher::BatchDispatcher;
use crate::event::LogEvent;
use crate::queue::EventQueue;
use crate::sink::BatchSink;
use crate::status::{BackoffPolicy, ConnectionStatus};
use crate::transport::Transport;

/// Per-event filter applied as events move from the queue into a batch.
/// Rejected events are discarded without being dispatched.
pub type IncludePredicate = Arc<dyn Fn(&LogEvent) -> bool + Send + Sync>;

pub(crate) const DEFAULT_BATCH_SIZE_LIMIT: usize = 1000;
pub(crate) const DEFAULT_PERIOD: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("batch size limit must be at least 1")]
    ZeroBatchSize,

    #[error("base period must be greater than zero")]
    ZeroPeriod,

    #[error("invalid backoff policy: {detail}")]
    Backoff { detail: String },
}

/// Constructor-time configuration for a [`BatchSink`]; immutable once built.
pub struct BatchSinkBuilder<T: Transport> {
    transport: T,
    batch_size_limit: usize,
    period: Duration,
    predicate: Option<IncludePredicate>,
    backoff: BackoffPolicy,
}

impl<T: Transport> BatchSinkBuilder<T> {
    pub(crate) fn new(transport: T) -> Self {
        Self {
            transport,
            batch_size_limit: DEFAULT_BATCH_SIZE_LIMIT,
            period: DEFAULT_PERIOD,
            predicate: None,
            backoff: BackoffPolicy::default(),
        }
    }

    /// Maximum events per dispatched batch.
    pub fn batch_size_limit(mut self, limit: usize) -> Self {
        self.batch_size_limit = limit;
        self
    }

    /// Steady interval between ticks while the collector is healthy.
    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Only batch events the predicate accepts; the rest are discarded.
    /// Defaults to accept-all.
    pub fn include(mut self, predicate: impl Fn(&LogEvent) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn backoff(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = policy;
        self
    }

    pub fn build(self) -> Result<BatchSink<T>, ConfigError> {
        if self.batch_size_limit == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.period.is_zero() {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.backoff.maximum_backoff < self.backoff.minimum_backoff {
            return Err(ConfigError::Backoff {
                detail: "maximum_backoff is below minimum_backoff".into(),
            });
        }
        if self.backoff.drop_batch_after == 0 {
            return Err(ConfigError::Backoff {
                detail: "drop_batch_after must be at least 1".into(),
            });
        }
        if self.backoff.drop_queue_after < self.backoff.drop_batch_after {
            return Err(ConfigError::Backoff {
                detail: "drop_queue_after is below drop_batch_after".into(),
            });
        }

        let queue = Arc::new(EventQueue::new());
        let status = ConnectionStatus::new(self.period, self.backoff);
        let dispatcher = BatchDispatcher::new(
            Arc::clone(&queue),
            self.transport,
            self.batch_size_limit,
            self.predicate,
            status,
        );
        Ok(BatchSink::from_parts(queue, dispatcher))
    }
}
