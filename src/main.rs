//! Next-to-go racing: Binary Entrypoint
//! Runs a live race session against the upstream feed and logs what an
//! attached view would show, until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use next5_racing::countdown::render;
use next5_racing::reachability::ReachabilitySignal;
use next5_racing::{HttpRaceFeed, RaceCountdown, RaceSession, SessionConfig, ViewState};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact human logs by default; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("next5_racing=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

fn log_view(state: &ViewState) {
    match state {
        ViewState::Loading => info!("loading races..."),
        ViewState::Empty => info!("no upcoming races for the selected categories"),
        ViewState::Error(msg) => warn!(message = %msg, "race list unavailable"),
        ViewState::Loaded(races) => {
            let now = chrono::Utc::now().timestamp();
            for r in races {
                info!(
                    race = r.race_number,
                    meeting = %r.meeting_name,
                    countdown = %render(r.advertised_start, now),
                    "next to go"
                );
            }
        }
    }
}

/// One line per tick: `id text | id text | ...`.
fn countdown_summary(countdowns: &[RaceCountdown]) -> String {
    countdowns
        .iter()
        .map(|c| format!("{} {}", c.race_id, c.text))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = SessionConfig::load_default().context("loading session config")?;
    let feed = HttpRaceFeed::new(&cfg.feed).context("building race feed client")?;
    info!(url = feed.url(), "using race feed");

    // No platform reachability monitor here: assume online and let fetch
    // errors speak for themselves.
    let session = RaceSession::start(&cfg, Arc::new(feed), ReachabilitySignal::fixed(true));

    let mut views = session.subscribe_view();
    let mut countdowns = session.subscribe_countdowns();
    log_view(&views.borrow_and_update());

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                log_view(&views.borrow_and_update());
            }
            changed = countdowns.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = countdown_summary(&countdowns.borrow_and_update());
                if !line.is_empty() {
                    debug!(countdowns = %line, "tick");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl-c received, shutting down");
                break;
            }
        }
    }

    session.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_summary_joins_in_display_order() {
        let rows = vec![
            RaceCountdown {
                race_id: "r2".into(),
                text: "0 min 30s".into(),
            },
            RaceCountdown {
                race_id: "r3".into(),
                text: "-5s".into(),
            },
        ];
        assert_eq!(countdown_summary(&rows), "r2 0 min 30s | r3 -5s");
        assert_eq!(countdown_summary(&[]), "");
    }
}
