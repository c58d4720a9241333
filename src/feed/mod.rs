// src/feed/mod.rs
pub mod fixture;
pub mod http;

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::FeedError;
use crate::race::{RaceBatch, RaceRecord};

pub use fixture::FixtureRaceFeed;
pub use http::HttpRaceFeed;

/// Upstream source of upcoming races.
///
/// Implementations must tolerate being abandoned mid-call: the session drops
/// the in-flight future when a newer refresh starts or on teardown.
#[async_trait::async_trait]
pub trait RaceFeedClient: Send + Sync {
    async fn fetch_races(&self) -> Result<RaceBatch, FeedError>;
    fn name(&self) -> &'static str;
}

// --- wire format of the "nextraces" endpoint ---

#[derive(Debug, Deserialize)]
struct Envelope {
    status: Option<i64>,
    data: Option<Data>,
    #[allow(dead_code)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Data {
    #[serde(default)]
    next_to_go_ids: Vec<String>,
    #[serde(default)]
    race_summaries: HashMap<String, Summary>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    race_id: Option<String>,
    race_number: Option<u32>,
    meeting_name: Option<String>,
    category_id: Option<String>,
    advertised_start: Option<AdvertisedStart>,
}

#[derive(Debug, Deserialize)]
struct AdvertisedStart {
    seconds: Option<i64>,
}

/// Decode a feed response body into a `RaceBatch`.
///
/// Summaries without a usable race number are skipped; a missing start time
/// is kept as `None` and left for the repository to drop.
pub fn decode_next_races(body: &str) -> Result<RaceBatch, FeedError> {
    let env: Envelope =
        serde_json::from_str(body.trim()).map_err(|e| FeedError::Parsing(e.to_string()))?;

    match env.status {
        Some(200) => {}
        other => return Err(FeedError::Server(other.unwrap_or(0))),
    }

    let data = env.data.ok_or(FeedError::NoData)?;

    let mut races = HashMap::with_capacity(data.race_summaries.len());
    let mut skipped = 0usize;
    for (key, s) in data.race_summaries {
        let Some(race_number) = s.race_number.filter(|n| *n > 0) else {
            skipped += 1;
            continue;
        };
        let race_id = s.race_id.unwrap_or(key);
        let rec = RaceRecord {
            race_id: race_id.clone(),
            meeting_name: s.meeting_name.unwrap_or_default(),
            race_number,
            category_id: s.category_id.unwrap_or_default(),
            advertised_start: s.advertised_start.and_then(|a| a.seconds),
        };
        races.insert(race_id, rec);
    }

    if skipped > 0 {
        tracing::debug!(target: "feed", skipped, "dropped race summaries without race number");
    }

    Ok(RaceBatch::new(data.next_to_go_ids, races))
}
