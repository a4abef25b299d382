use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Work driven by a [`RecurringTimer`].
///
/// `tick` runs to completion before the timer re-arms, so at most one tick is
/// ever in flight; the returned duration is the delay before the next tick.
/// `drain` runs exactly once, after cancellation, before the worker exits.
pub(crate) trait TickHandler: Send + 'static {
    fn tick(&mut self) -> impl Future<Output = Duration> + Send;

    fn drain(&mut self) -> impl Future<Output = ()> + Send;
}

/// Single-flight re-armable timer on a dedicated worker task.
///
/// The worker owns the handler outright: sleep, tick, sleep again with the
/// delay the tick reported. Cancellation only takes effect between ticks:
/// a pending sleep is abandoned immediately, but an in-flight tick always
/// finishes first. `shutdown` waits for both before returning, so no tick
/// can run after it resolves.
pub(crate) struct RecurringTimer {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RecurringTimer {
    pub fn spawn<H: TickHandler>(initial_delay: Duration, mut handler: H) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut delay = initial_delay;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = time::sleep(delay) => {}
                }
                delay = handler.tick().await;
            }
            handler.drain().await;
        });

        Self { cancel, task }
    }

    /// Cancel any pending arm, wait out an in-flight tick and the final
    /// drain pass, then return.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "batching worker task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Clone, Default)]
    struct Counters {
        ticks: Arc<AtomicU32>,
        drains: Arc<AtomicU32>,
    }

    impl Counters {
        fn ticks(&self) -> u32 {
            self.ticks.load(Ordering::SeqCst)
        }

        fn drains(&self) -> u32 {
            self.drains.load(Ordering::SeqCst)
        }
    }

    struct CountingHandler {
        counters: Counters,
        interval: Duration,
        tick_duration: Duration,
    }

    impl CountingHandler {
        fn new(interval: Duration) -> (Self, Counters) {
            let counters = Counters::default();
            (
                Self {
                    counters: counters.clone(),
                    interval,
                    tick_duration: Duration::ZERO,
                },
                counters,
            )
        }
    }

    impl TickHandler for CountingHandler {
        async fn tick(&mut self) -> Duration {
            if !self.tick_duration.is_zero() {
                time::sleep(self.tick_duration).await;
            }
            self.counters.ticks.fetch_add(1, Ordering::SeqCst);
            self.interval
        }

        async fn drain(&mut self) {
            self.counters.drains.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rearms_with_reported_interval() {
        let (handler, counters) = CountingHandler::new(Duration::from_secs(1));
        let timer = RecurringTimer::spawn(Duration::ZERO, handler);

        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(counters.ticks(), 1);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counters.ticks(), 2);

        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(counters.ticks(), 5);

        timer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn initial_delay_is_honored() {
        let (handler, counters) = CountingHandler::new(Duration::from_secs(1));
        let timer = RecurringTimer::spawn(Duration::from_secs(30), handler);

        time::sleep(Duration::from_secs(29)).await;
        assert_eq!(counters.ticks(), 0);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counters.ticks(), 1);

        timer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_arm() {
        let (handler, counters) = CountingHandler::new(Duration::from_secs(1));
        let timer = RecurringTimer::spawn(Duration::from_secs(3600), handler);

        time::sleep(Duration::from_millis(10)).await;
        timer.shutdown().await;

        assert_eq!(counters.ticks(), 0);
        assert_eq!(counters.drains(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_waits_for_inflight_tick() {
        let (mut handler, counters) = CountingHandler::new(Duration::from_secs(1));
        handler.tick_duration = Duration::from_secs(5);
        let timer = RecurringTimer::spawn(Duration::ZERO, handler);

        // Let the tick start, then shut down while it is mid-sleep.
        time::sleep(Duration::from_millis(10)).await;
        timer.shutdown().await;

        assert_eq!(counters.ticks(), 1);
        assert_eq!(counters.drains(), 1);
    }
}
