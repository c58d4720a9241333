// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod clock;
pub mod config;
pub mod countdown;
pub mod error;
pub mod feed;
pub mod filter;
pub mod metrics;
pub mod race;
pub mod reachability;
pub mod repository;
pub mod scheduler;
pub mod session;
pub mod view;

// ---- Re-exports for stable public API ----
pub use crate::config::{FeedConfig, SessionConfig};
pub use crate::countdown::RaceCountdown;
pub use crate::error::{FeedError, RefreshError};
pub use crate::feed::{FixtureRaceFeed, HttpRaceFeed, RaceFeedClient};
pub use crate::filter::CategoryFilter;
pub use crate::race::{RaceBatch, RaceRecord};
pub use crate::repository::{apply, RaceRepository, EXPIRY_THRESHOLD_SECS, NEXT_RACES_LIMIT};
pub use crate::session::RaceSession;
pub use crate::view::{RaceCategory, ViewState};
