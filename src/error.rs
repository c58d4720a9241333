// src/error.rs
use thiserror::Error;

/// Failures surfaced by a race feed client. Messages are user-facing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Failed to parse data: {0}")]
    Parsing(String),
    #[error("Invalid data received")]
    InvalidData,
    #[error("No race data available")]
    NoData,
    #[error("Server error: {0}")]
    Server(i64),
    /// The call was abandoned before completing.
    #[error("Fetch cancelled")]
    Cancelled,
}

/// Outcome taxonomy for a single refresh attempt.
///
/// An empty result is not an error: it maps to `ViewState::Empty`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    /// Detected before the feed client is called.
    #[error("No internet connection.")]
    Connectivity,
    #[error(transparent)]
    Fetch(FeedError),
    #[error("Fetch cancelled")]
    Cancelled,
}

impl RefreshError {
    /// Cancellation is swallowed and never reaches observers.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            RefreshError::Cancelled | RefreshError::Fetch(FeedError::Cancelled)
        )
    }
}

impl From<FeedError> for RefreshError {
    fn from(e: FeedError) -> Self {
        match e {
            FeedError::Cancelled => RefreshError::Cancelled,
            other => RefreshError::Fetch(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_verbatim() {
        assert_eq!(
            RefreshError::Connectivity.to_string(),
            "No internet connection."
        );
        assert_eq!(
            RefreshError::from(FeedError::Network("timed out".into())).to_string(),
            "Network error: timed out"
        );
        assert_eq!(
            RefreshError::from(FeedError::NoData).to_string(),
            "No race data available"
        );
    }

    #[test]
    fn cancellation_is_silent() {
        assert!(RefreshError::from(FeedError::Cancelled).is_silent());
        assert!(!RefreshError::Connectivity.is_silent());
        assert!(!RefreshError::from(FeedError::InvalidData).is_silent());
    }
}
