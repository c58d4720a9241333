//! # Race Repository
//! Pure, testable logic that maps `(raw batch, filter, now)` to a `ViewState`.
//! No I/O; the retained batch is replaced wholesale on every successful fetch.
//!
//! Expiry policy: a race is dropped once it is *strictly more* than
//! `EXPIRY_THRESHOLD_SECS` past its advertised start. A race exactly 60s past
//! start is still shown; at 61s it is gone.

use crate::filter::CategoryFilter;
use crate::race::{RaceBatch, RaceRecord};
use crate::view::ViewState;

/// Size of the "next N" list.
pub const NEXT_RACES_LIMIT: usize = 5;

/// Seconds past advertised start after which a race leaves the list.
pub const EXPIRY_THRESHOLD_SECS: i64 = 60;

/// True when a race starting at `advertised_start` must no longer be shown at `now`.
pub fn is_expired(advertised_start: i64, now: i64) -> bool {
    now.saturating_sub(advertised_start) > EXPIRY_THRESHOLD_SECS
}

/// Filter, sort, truncate. `raw` is in feed order, which breaks start-time ties.
pub fn apply(raw: &[RaceRecord], filter: &CategoryFilter, now: i64) -> ViewState {
    let mut eligible: Vec<(i64, &RaceRecord)> = raw
        .iter()
        .filter_map(|r| r.advertised_start.map(|start| (start, r)))
        .filter(|(start, _)| !is_expired(*start, now))
        .filter(|(_, r)| filter.admits(&r.category_id))
        .collect();

    // `sort_by_key` is stable: equal start times keep feed order.
    eligible.sort_by_key(|(start, _)| *start);

    let races = eligible
        .into_iter()
        .take(NEXT_RACES_LIMIT)
        .map(|(_, r)| r.clone())
        .collect();

    ViewState::from_races(races)
}

/// Holds the last fetched batch and the last accepted visible id sequence.
#[derive(Debug, Default)]
pub struct RaceRepository {
    retained: Vec<RaceRecord>,
    last_accepted: Option<Vec<String>>,
}

impl RaceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the retained set with a freshly fetched batch.
    pub fn replace(&mut self, batch: &RaceBatch) {
        self.retained = batch.ordered_records();
    }

    pub fn retained(&self) -> &[RaceRecord] {
        &self.retained
    }

    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    /// Recompute the visible state from the retained batch.
    pub fn project(&self, filter: &CategoryFilter, now: i64) -> ViewState {
        apply(&self.retained, filter, now)
    }

    /// Record `view` as the state about to be published.
    ///
    /// Returns `false` when it is a `Loaded` list with exactly the same ids,
    /// in the same order, as the previously accepted `Loaded` list; callers
    /// use that to skip a redundant notification.
    pub fn accept(&mut self, view: &ViewState) -> bool {
        match view {
            ViewState::Loaded(races) => {
                let ids: Vec<String> = races.iter().map(|r| r.race_id.clone()).collect();
                let changed = self.last_accepted.as_ref() != Some(&ids);
                self.last_accepted = Some(ids);
                changed
            }
            _ => {
                self.last_accepted = None;
                true
            }
        }
    }

    /// Ids from `displayed` that are no longer visible when recomputed at `now`.
    pub fn dropped_since(
        &self,
        displayed: &[RaceRecord],
        filter: &CategoryFilter,
        now: i64,
    ) -> Vec<String> {
        let current = self.project(filter, now);
        let still: Vec<&str> = current.race_ids();
        displayed
            .iter()
            .filter(|r| !still.contains(&r.race_id.as_str()))
            .map(|r| r.race_id.clone())
            .collect()
    }
}
