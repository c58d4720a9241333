// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use next5_racing::{FeedError, RaceBatch, RaceFeedClient, RaceRecord, SessionConfig, ViewState};
use tokio::sync::{oneshot, watch};

pub const NOW: i64 = 1_732_300_000;

type Outcome = Result<RaceBatch, FeedError>;

enum Step {
    Ready(Outcome),
    Gated(oneshot::Receiver<Outcome>),
}

/// Feed that replays queued outcomes, then falls back to a fixed one.
pub struct ScriptedFeed {
    steps: Mutex<VecDeque<Step>>,
    fallback: Mutex<Outcome>,
    calls: AtomicUsize,
}

impl ScriptedFeed {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Ok(RaceBatch::default())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn push_ok(&self, batch: RaceBatch) {
        self.steps.lock().unwrap().push_back(Step::Ready(Ok(batch)));
    }

    pub fn push_err(&self, err: FeedError) {
        self.steps.lock().unwrap().push_back(Step::Ready(Err(err)));
    }

    /// Queue a call that blocks until the returned sender fires.
    pub fn push_gated(&self) -> oneshot::Sender<Outcome> {
        let (tx, rx) = oneshot::channel();
        self.steps.lock().unwrap().push_back(Step::Gated(rx));
        tx
    }

    pub fn set_fallback(&self, outcome: Outcome) {
        *self.fallback.lock().unwrap() = outcome;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RaceFeedClient for ScriptedFeed {
    async fn fetch_races(&self) -> Result<RaceBatch, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Ready(outcome)) => outcome,
            Some(Step::Gated(rx)) => rx.await.unwrap_or(Err(FeedError::Cancelled)),
            None => {
                let outcome = self.fallback.lock().unwrap().clone();
                outcome
            }
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn race(id: &str, category_id: &str, start: Option<i64>) -> RaceRecord {
    RaceRecord::new(id, format!("Meeting {id}"), 1, category_id, start)
}

pub fn batch(records: Vec<RaceRecord>) -> RaceBatch {
    RaceBatch::from_records(records)
}

/// Timers effectively off: only explicit triggers cause fetches.
pub fn quiet_config() -> SessionConfig {
    SessionConfig {
        refresh_interval_secs: 3_600,
        tick_interval_ms: 3_600_000,
        ..SessionConfig::default()
    }
}

pub fn ticking_config(tick_ms: u64) -> SessionConfig {
    SessionConfig {
        refresh_interval_secs: 3_600,
        tick_interval_ms: tick_ms,
        ..SessionConfig::default()
    }
}

pub async fn wait_for_view<F>(rx: &mut watch::Receiver<ViewState>, pred: F) -> ViewState
where
    F: FnMut(&ViewState) -> bool,
{
    let got = tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
        .await
        .expect("timed out waiting for view state")
        .expect("session stopped while waiting");
    let state = (*got).clone();
    state
}

pub async fn wait_until<F: Fn() -> bool>(cond: F) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for condition");
}

pub fn ids(v: &ViewState) -> Vec<&str> {
    v.race_ids()
}
