use std::time::Duration;

/// Doubling beyond this many consecutive failures has no effect; the interval
/// is pinned to the cap well before it.
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Tunables for the failure backoff and the two-tier drop policy.
///
/// The defaults are deliberately conservative: a batch that has failed eight
/// times in a row is discarded, and two failures later the whole pending
/// queue goes with it. Intervals between attempts double from
/// `minimum_backoff` up to `maximum_backoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Floor for the first backed-off interval when the base period is short.
    pub minimum_backoff: Duration,
    /// Ceiling for the interval between dispatch attempts.
    pub maximum_backoff: Duration,
    /// Consecutive failures after which the retained batch is discarded.
    pub drop_batch_after: u32,
    /// Consecutive failures after which the entire pending queue is discarded.
    /// Must be at least `drop_batch_after`.
    pub drop_queue_after: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            minimum_backoff: Duration::from_secs(5),
            maximum_backoff: Duration::from_secs(600),
            drop_batch_after: 8,
            drop_queue_after: 10,
        }
    }
}

/// Tracks consecutive dispatch failures and derives the wait interval and
/// drop decisions from them. Owned by the dispatch worker; never shared.
pub(crate) struct ConnectionStatus {
    period: Duration,
    policy: BackoffPolicy,
    failures: u32,
}

impl ConnectionStatus {
    pub fn new(period: Duration, policy: BackoffPolicy) -> Self {
        Self {
            period,
            policy,
            failures: 0,
        }
    }

    pub fn mark_success(&mut self) {
        self.failures = 0;
    }

    pub fn mark_failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
    }

    /// Wait before the next tick.
    ///
    /// The base period until a second consecutive failure, then exponential
    /// doubling of `max(period, minimum_backoff)`, capped at
    /// `maximum_backoff` and never below the base period. Non-decreasing
    /// while failures persist.
    pub fn next_interval(&self) -> Duration {
        if self.failures <= 1 {
            return self.period;
        }
        let exponent = (self.failures - 1).min(MAX_BACKOFF_EXPONENT);
        let base = self.period.max(self.policy.minimum_backoff);
        let backed_off = base
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.policy.maximum_backoff);
        backed_off.min(self.policy.maximum_backoff).max(self.period)
    }

    pub fn should_drop_batch(&self) -> bool {
        self.failures >= self.policy.drop_batch_after
    }

    pub fn should_drop_queue(&self) -> bool {
        self.failures >= self.policy.drop_queue_after
    }
}
