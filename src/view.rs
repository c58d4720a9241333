//! # View state
//! The externally observable state of the race list, and the projection from
//! refresh outcomes and the category filter onto it.

use serde::Serialize;

use crate::error::RefreshError;
use crate::filter::CategoryFilter;
use crate::race::{RaceRecord, CATEGORY_CATALOGUE};

/// Exactly one of these is current at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum ViewState {
    Loading,
    /// Never empty, at most five races, ascending by advertised start.
    Loaded(Vec<RaceRecord>),
    Empty,
    Error(String),
}

impl ViewState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ViewState::Loaded(_))
    }

    /// Races currently displayed (empty slice for every non-`Loaded` state).
    pub fn races(&self) -> &[RaceRecord] {
        match self {
            ViewState::Loaded(races) => races,
            _ => &[],
        }
    }

    pub fn race_ids(&self) -> Vec<&str> {
        self.races().iter().map(|r| r.race_id.as_str()).collect()
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ViewState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ViewState::Loading => "loading",
            ViewState::Loaded(_) => "loaded",
            ViewState::Empty => "empty",
            ViewState::Error(_) => "error",
        }
    }

    /// Wrap an already filtered/sorted/truncated list.
    pub fn from_races(races: Vec<RaceRecord>) -> Self {
        if races.is_empty() {
            ViewState::Empty
        } else {
            ViewState::Loaded(races)
        }
    }

    /// Map a failed refresh. Silent failures (cancellation) leave the
    /// previous state in place and yield `None`.
    pub fn from_failure(err: &RefreshError) -> Option<Self> {
        if err.is_silent() {
            None
        } else {
            Some(ViewState::Error(err.to_string()))
        }
    }
}

/// A category as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceCategory {
    pub id: String,
    pub name: String,
    pub is_selected: bool,
}

/// Project the closed category catalogue against the current filter.
pub fn categories(filter: &CategoryFilter) -> Vec<RaceCategory> {
    CATEGORY_CATALOGUE
        .iter()
        .map(|(id, name)| RaceCategory {
            id: (*id).to_string(),
            name: (*name).to_string(),
            is_selected: filter.contains(id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::race::{HARNESS_CATEGORY_ID, HORSE_CATEGORY_ID};

    #[test]
    fn empty_list_is_empty_state() {
        assert_eq!(ViewState::from_races(vec![]), ViewState::Empty);
    }

    #[test]
    fn failures_map_to_error_except_cancellation() {
        assert_eq!(
            ViewState::from_failure(&RefreshError::Connectivity),
            Some(ViewState::Error("No internet connection.".into()))
        );
        assert_eq!(
            ViewState::from_failure(&RefreshError::Fetch(FeedError::Server(503))),
            Some(ViewState::Error("Server error: 503".into()))
        );
        assert_eq!(ViewState::from_failure(&RefreshError::Cancelled), None);
        assert_eq!(
            ViewState::from_failure(&RefreshError::Fetch(FeedError::Cancelled)),
            None
        );
    }

    #[test]
    fn categories_reflect_filter() {
        let f = CategoryFilter::from_ids([HARNESS_CATEGORY_ID]);
        let cats = categories(&f);
        assert_eq!(cats.len(), 3);
        let names: Vec<&str> = cats.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Horse", "Harness", "Greyhound"]);
        assert!(cats.iter().any(|c| c.id == HARNESS_CATEGORY_ID && c.is_selected));
        assert!(cats.iter().any(|c| c.id == HORSE_CATEGORY_ID && !c.is_selected));
    }

    #[test]
    fn serializes_tagged() {
        let s = serde_json::to_string(&ViewState::Error("boom".into())).unwrap();
        assert_eq!(s, r#"{"state":"error","value":"boom"}"#);
        let s = serde_json::to_string(&ViewState::Empty).unwrap();
        assert_eq!(s, r#"{"state":"empty"}"#);
    }
}
