use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;

use super::{decode_next_races, RaceFeedClient};
use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::metrics as m;
use crate::race::RaceBatch;

/// Fetches "next races" from the racing REST API.
#[derive(Clone)]
pub struct HttpRaceFeed {
    client: Client,
    url: String,
}

impl HttpRaceFeed {
    /// Fails with `InvalidData` when the configured base URL does not parse.
    pub fn new(cfg: &FeedConfig) -> Result<Self, FeedError> {
        let url = next_races_url(&cfg.base_url, cfg.count);
        if let Err(e) = reqwest::Url::parse(&url) {
            tracing::warn!(target: "feed", url = %url, error = %e, "invalid race feed url");
            return Err(FeedError::InvalidData);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| FeedError::Network(e.to_string()))?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// `<base>?method=nextraces&count=<n>`
pub fn next_races_url(base_url: &str, count: u32) -> String {
    format!("{base_url}?method=nextraces&count={count}")
}

#[async_trait]
impl RaceFeedClient for HttpRaceFeed {
    async fn fetch_races(&self) -> Result<RaceBatch, FeedError> {
        let resp = match self.client.get(&self.url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(target: "feed", error = %e, "race feed http error");
                counter!(m::FEED_HTTP_ERRORS).increment(1);
                return Err(FeedError::Network(e.to_string()));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            counter!(m::FEED_HTTP_ERRORS).increment(1);
            return Err(FeedError::Server(i64::from(status.as_u16())));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;
        decode_next_races(&body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
