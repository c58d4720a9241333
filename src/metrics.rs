// src/metrics.rs
use metrics::{describe_counter, describe_gauge};
use once_cell::sync::OnceCell;

pub const FETCH_STARTED: &str = "race_fetch_started_total";
pub const FETCH_FAILED: &str = "race_fetch_failed_total";
pub const FETCH_STALE: &str = "race_fetch_stale_total";
pub const FETCH_CANCELLED: &str = "race_fetch_cancelled_total";
pub const CONNECTIVITY_BLOCKED: &str = "race_connectivity_blocked_total";
pub const VIEW_PUBLISHED: &str = "race_view_published_total";
pub const VIEW_SUPPRESSED: &str = "race_view_suppressed_total";
pub const EXPIRY_REFRESH: &str = "race_expiry_refresh_total";
pub const VIEW_RACES: &str = "race_view_races";
pub const LAST_FETCH_TS: &str = "race_last_fetch_ts";
pub const FEED_HTTP_ERRORS: &str = "race_feed_http_errors_total";

/// One-time metrics registration (so series show up once a recorder is installed).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(FETCH_STARTED, "Feed fetches issued.");
        describe_counter!(FETCH_FAILED, "Feed fetches that ended in an error state.");
        describe_counter!(
            FETCH_STALE,
            "Fetch results discarded because a newer fetch superseded them."
        );
        describe_counter!(FETCH_CANCELLED, "Cancelled fetches absorbed silently.");
        describe_counter!(
            CONNECTIVITY_BLOCKED,
            "Refreshes short-circuited by the reachability gate."
        );
        describe_counter!(VIEW_PUBLISHED, "View state notifications sent to observers.");
        describe_counter!(
            VIEW_SUPPRESSED,
            "Loaded lists identical to the previous one (no notification)."
        );
        describe_counter!(EXPIRY_REFRESH, "Refreshes triggered by the expiry sweep.");
        describe_counter!(
            FEED_HTTP_ERRORS,
            "HTTP feed calls that failed in transport or returned a non-2xx status."
        );
        describe_gauge!(VIEW_RACES, "Races in the current view.");
        describe_gauge!(LAST_FETCH_TS, "Unix ts of the last applied fetch.");
    });
}

/// Counter-only recorder for asserting on series in unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use metrics::{
        Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };

    #[derive(Default, Clone)]
    pub(crate) struct CountingRecorder {
        counts: Arc<Mutex<HashMap<String, u64>>>,
    }

    impl CountingRecorder {
        pub(crate) fn count(&self, name: &str) -> u64 {
            self.counts.lock().unwrap().get(name).copied().unwrap_or(0)
        }
    }

    struct Tally {
        name: String,
        counts: Arc<Mutex<HashMap<String, u64>>>,
    }

    impl CounterFn for Tally {
        fn increment(&self, value: u64) {
            *self
                .counts
                .lock()
                .unwrap()
                .entry(self.name.clone())
                .or_default() += value;
        }

        fn absolute(&self, value: u64) {
            self.counts.lock().unwrap().insert(self.name.clone(), value);
        }
    }

    impl Recorder for CountingRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            Counter::from_arc(Arc::new(Tally {
                name: key.name().to_string(),
                counts: Arc::clone(&self.counts),
            }))
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }
}
