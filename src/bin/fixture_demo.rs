//! Demo that runs a session against the bundled fixture feed on a simulated
//! clock (15s per tick) and prints the list as races count down and expire.

use std::sync::Arc;
use std::time::Duration;

use next5_racing::clock::{Clock, ManualClock};
use next5_racing::countdown::accessibility_label;
use next5_racing::reachability::ReachabilitySignal;
use next5_racing::{FixtureRaceFeed, RaceSession, SessionConfig, ViewState};

const FIXTURE: &str = include_str!("../../tests/fixtures/next_races.json");
const FIXTURE_NOW: i64 = 1_732_300_000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = SessionConfig {
        refresh_interval_secs: 30,
        tick_interval_ms: 400,
        ..SessionConfig::default()
    };
    let clock = Arc::new(ManualClock::new(FIXTURE_NOW));
    let session = RaceSession::start_with_clock(
        &cfg,
        Arc::new(FixtureRaceFeed::from_fixture_str(FIXTURE)),
        ReachabilitySignal::fixed(true),
        clock.clone(),
    );

    for step in 0..10 {
        tokio::time::sleep(Duration::from_millis(400)).await;
        let now = clock.now();
        match session.view() {
            ViewState::Loaded(races) => {
                println!("-- t+{}s", step * 15);
                for r in &races {
                    println!("   {}", accessibility_label(r, now));
                }
            }
            other => println!("-- t+{}s {:?}", step * 15, other),
        }
        clock.advance(15);
    }

    session.shutdown().await;
    println!("fixture-demo done");
}
