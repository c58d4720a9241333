use async_trait::async_trait;

use super::{decode_next_races, RaceFeedClient};
use crate::error::FeedError;
use crate::race::RaceBatch;

/// Serves a fixed response body on every call. Decoding happens per call so
/// a broken fixture surfaces the same way a broken upstream response would.
pub struct FixtureRaceFeed {
    body: String,
}

impl FixtureRaceFeed {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            body: s.to_string(),
        }
    }
}

#[async_trait]
impl RaceFeedClient for FixtureRaceFeed {
    async fn fetch_races(&self) -> Result<RaceBatch, FeedError> {
        decode_next_races(&self.body)
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
