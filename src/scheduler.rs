//! # Refresh Scheduler
//! Decides which fetch result is allowed to touch state.
//!
//! Every fetch gets a `FetchTicket` carrying a generation number. Starting a
//! new fetch (or cancelling) bumps the generation, so a late result from a
//! superseded fetch no longer matches and is dropped on arrival.
//!
//! State machine: `Idle → Fetching → (Idle | Failed)`.

use std::fmt;

/// Why a refresh was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Periodic,
    Manual,
    FilterChanged,
    /// A displayed race crossed the expiry threshold.
    Expiry,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trigger::Startup => "startup",
            Trigger::Periodic => "periodic",
            Trigger::Manual => "manual",
            Trigger::FilterChanged => "filter_changed",
            Trigger::Expiry => "expiry",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Fetching { trigger: Trigger },
    /// Idle, but the last attempt ended in an error.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// How a completed fetch ended, as far as the scheduler cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Succeeded,
    Failed,
    Cancelled,
}

#[derive(Debug)]
pub struct RefreshScheduler {
    generation: u64,
    phase: FetchPhase,
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self {
            generation: 0,
            phase: FetchPhase::Idle,
        }
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.phase, FetchPhase::Fetching { .. })
    }

    /// Start a fetch, superseding any outstanding one.
    ///
    /// Returns the new ticket and whether an in-flight fetch was superseded.
    pub fn begin(&mut self, trigger: Trigger) -> (FetchTicket, bool) {
        let superseded = self.is_fetching();
        self.generation += 1;
        self.phase = FetchPhase::Fetching { trigger };
        (
            FetchTicket {
                generation: self.generation,
            },
            superseded,
        )
    }

    /// Invalidate any outstanding ticket without starting a new fetch.
    /// Returns whether something was in flight.
    pub fn cancel(&mut self) -> bool {
        let was_fetching = self.is_fetching();
        self.generation += 1;
        if was_fetching {
            self.phase = FetchPhase::Idle;
        }
        was_fetching
    }

    /// A refresh failed before a fetch was issued (connectivity gate).
    pub fn fail_preflight(&mut self) {
        self.generation += 1;
        self.phase = FetchPhase::Failed;
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.generation == self.generation && self.is_fetching()
    }

    /// Close out `ticket`. Returns `false` for a stale ticket, whose result
    /// must be discarded without touching state.
    pub fn finish(&mut self, ticket: FetchTicket, completion: Completion) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.phase = match completion {
            Completion::Succeeded | Completion::Cancelled => FetchPhase::Idle,
            Completion::Failed => FetchPhase::Failed,
        };
        true
    }
}
