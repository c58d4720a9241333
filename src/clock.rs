// src/clock.rs
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Source of "now" in unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Hand-driven clock for tests and demos.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// A cancellable periodic timer that posts an event to a channel on every tick.
///
/// The first tick fires one full `period` after spawning. Dropping the task
/// cancels it; it also stops by itself once the receiving side is gone.
#[derive(Debug)]
pub struct PeriodicTask {
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    pub fn spawn<E, F>(period: Duration, tx: UnboundedSender<E>, make_event: F) -> Self
    where
        E: Send + 'static,
        F: Fn() -> E + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            // A stalled receiver should not cause a burst of catch-up ticks.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(make_event()).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let c = ManualClock::new(100);
        assert_eq!(c.now(), 100);
        c.advance(45);
        assert_eq!(c.now(), 145);
        c.set(10);
        assert_eq!(c.now(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_task_ticks_and_cancels() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let task = PeriodicTask::spawn(Duration::from_secs(1), tx, || "tick");

        // Nothing before the first full period.
        time::sleep(Duration::from_millis(900)).await;
        assert!(rx.try_recv().is_err());

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(rx.recv().await, Some("tick"));
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(rx.recv().await, Some("tick"));

        task.cancel();
        // Let the abort land, then make sure the channel closes.
        tokio::task::yield_now().await;
        assert_eq!(rx.recv().await, None);
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_task_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let task = PeriodicTask::spawn(Duration::from_secs(1), tx, || 1u8);
        drop(task);
        assert_eq!(rx.recv().await, None);
    }
}
