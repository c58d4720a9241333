//! # Countdown
//! Per-race "time remaining" text, recomputed on every clock tick.

use serde::Serialize;

use crate::race::RaceRecord;

const SECS_PER_MIN: i64 = 60;

/// Render the countdown for a race starting at `advertised_start` as seen at `now`.
///
/// - unknown start → `"Time unknown"`
/// - still to come → `"<m> min <s>s"`
/// - started less than a minute ago (or exactly now) → `"-<s>s"`
/// - otherwise → `"Race Started!"`
pub fn render(advertised_start: Option<i64>, now: i64) -> String {
    let Some(start) = advertised_start else {
        return "Time unknown".to_string();
    };
    let remaining = start.saturating_sub(now);
    if remaining > 0 {
        format!(
            "{} min {}s",
            remaining / SECS_PER_MIN,
            remaining % SECS_PER_MIN
        )
    } else {
        let elapsed = remaining.unsigned_abs();
        if elapsed < SECS_PER_MIN as u64 {
            format!("-{elapsed}s")
        } else {
            "Race Started!".to_string()
        }
    }
}

/// Screen-reader text for one row.
pub fn accessibility_label(race: &RaceRecord, now: i64) -> String {
    let location = if race.meeting_name.trim().is_empty() {
        "Unknown location"
    } else {
        race.meeting_name.as_str()
    };
    format!(
        "Race {} at {}, starting in {}",
        race.race_number,
        location,
        render(race.advertised_start, now)
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceCountdown {
    pub race_id: String,
    pub text: String,
}

/// Tracks the currently displayed races and renders their countdowns.
#[derive(Debug, Default)]
pub struct CountdownEngine {
    tracked: Vec<(String, Option<i64>)>,
}

impl CountdownEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of displayed races (display order is kept).
    pub fn track(&mut self, races: &[RaceRecord]) {
        self.tracked = races
            .iter()
            .map(|r| (r.race_id.clone(), r.advertised_start))
            .collect();
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn render_all(&self, now: i64) -> Vec<RaceCountdown> {
        self.tracked
            .iter()
            .map(|(id, start)| RaceCountdown {
                race_id: id.clone(),
                text: render(*start, now),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn renders_exact_strings() {
        assert_eq!(render(Some(NOW + 125), NOW), "2 min 5s");
        assert_eq!(render(Some(NOW + 59), NOW), "0 min 59s");
        assert_eq!(render(Some(NOW + 1), NOW), "0 min 1s");
        assert_eq!(render(Some(NOW), NOW), "-0s");
        assert_eq!(render(Some(NOW - 30), NOW), "-30s");
        assert_eq!(render(Some(NOW - 59), NOW), "-59s");
        assert_eq!(render(Some(NOW - 60), NOW), "Race Started!");
        assert_eq!(render(Some(NOW - 61), NOW), "Race Started!");
        assert_eq!(render(None, NOW), "Time unknown");
    }

    #[test]
    fn extreme_start_times_render() {
        assert_eq!(render(Some(i64::MIN), NOW), "Race Started!");
        let far = render(Some(i64::MAX), NOW);
        assert!(far.ends_with('s') && far.contains(" min "), "{far}");
        assert_eq!(render(Some(i64::MAX), i64::MIN), "153722867280912930 min 7s");
    }

    #[test]
    fn label_mentions_race_and_meeting() {
        let r = RaceRecord::new("1", "Meeting 1", 1, "C1", Some(NOW + 300));
        assert_eq!(
            accessibility_label(&r, NOW),
            "Race 1 at Meeting 1, starting in 5 min 0s"
        );
        let anon = RaceRecord::new("2", "", 4, "C1", None);
        assert_eq!(
            accessibility_label(&anon, NOW),
            "Race 4 at Unknown location, starting in Time unknown"
        );
    }

    #[test]
    fn engine_renders_tracked_in_order() {
        let mut eng = CountdownEngine::new();
        eng.track(&[
            RaceRecord::new("a", "M", 1, "C", Some(NOW + 10)),
            RaceRecord::new("b", "M", 2, "C", Some(NOW - 5)),
        ]);
        let out = eng.render_all(NOW);
        assert_eq!(
            out,
            vec![
                RaceCountdown {
                    race_id: "a".into(),
                    text: "0 min 10s".into()
                },
                RaceCountdown {
                    race_id: "b".into(),
                    text: "-5s".into()
                },
            ]
        );
        // One second later every text moves.
        let next = eng.render_all(NOW + 1);
        assert_eq!(next[0].text, "0 min 9s");
        assert_eq!(next[1].text, "-6s");
    }
}
