//! # Race records
//! Immutable race data as handed over by the feed, plus the closed set of
//! race categories the client knows about.

use std::collections::HashMap;

use serde::Serialize;

/// One upcoming race. Created fresh on every feed fetch; identity across
/// fetches is only by `race_id` equality.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RaceRecord {
    pub race_id: String,
    pub meeting_name: String,
    pub race_number: u32,
    pub category_id: String,
    /// Unix seconds. Races without a start time never reach the visible list.
    pub advertised_start: Option<i64>,
}

impl RaceRecord {
    pub fn new(
        race_id: impl Into<String>,
        meeting_name: impl Into<String>,
        race_number: u32,
        category_id: impl Into<String>,
        advertised_start: Option<i64>,
    ) -> Self {
        Self {
            race_id: race_id.into(),
            meeting_name: meeting_name.into(),
            race_number,
            category_id: category_id.into(),
            advertised_start,
        }
    }
}

/// A decoded feed response: races keyed by id plus the feed's own
/// "next to go" ordering hint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaceBatch {
    pub next_to_go_ids: Vec<String>,
    pub races: HashMap<String, RaceRecord>,
}

impl RaceBatch {
    pub fn new(next_to_go_ids: Vec<String>, races: HashMap<String, RaceRecord>) -> Self {
        Self {
            next_to_go_ids,
            races,
        }
    }

    /// Build a batch whose next-to-go order is the order of `records`.
    pub fn from_records(records: Vec<RaceRecord>) -> Self {
        let next_to_go_ids = records.iter().map(|r| r.race_id.clone()).collect();
        let races = records
            .into_iter()
            .map(|r| (r.race_id.clone(), r))
            .collect();
        Self {
            next_to_go_ids,
            races,
        }
    }

    pub fn len(&self) -> usize {
        self.races.len()
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    /// Records in feed order: everything named in `next_to_go_ids` first (in
    /// that order, each id once), then any remaining races by ascending id.
    pub fn ordered_records(&self) -> Vec<RaceRecord> {
        let mut out = Vec::with_capacity(self.races.len());
        let mut seen = std::collections::HashSet::new();

        for id in &self.next_to_go_ids {
            if let Some(r) = self.races.get(id) {
                if seen.insert(id.as_str()) {
                    out.push(r.clone());
                }
            }
        }

        let mut rest: Vec<&RaceRecord> = self
            .races
            .iter()
            .filter(|(id, _)| !seen.contains(id.as_str()))
            .map(|(_, r)| r)
            .collect();
        rest.sort_by(|a, b| a.race_id.cmp(&b.race_id));
        out.extend(rest.into_iter().cloned());

        out
    }
}

pub const HORSE_CATEGORY_ID: &str = "4a2788f8-e825-4d36-9894-efd4baf1cfae";
pub const HARNESS_CATEGORY_ID: &str = "161d9be2-e909-4326-8c2c-35ed71fb460b";
pub const GREYHOUND_CATEGORY_ID: &str = "9daef0d7-bf3c-4f50-921d-8e818c60fe61";

/// Known categories as `(category_id, display name)`, in display order.
pub const CATEGORY_CATALOGUE: [(&str, &str); 3] = [
    (HORSE_CATEGORY_ID, "Horse"),
    (HARNESS_CATEGORY_ID, "Harness"),
    (GREYHOUND_CATEGORY_ID, "Greyhound"),
];

/// Display name for a known category id.
pub fn category_name(category_id: &str) -> Option<&'static str> {
    CATEGORY_CATALOGUE
        .iter()
        .find(|(id, _)| *id == category_id)
        .map(|(_, name)| *name)
}
