//! # Race Session
//! Owns the live race list for one viewer.
//!
//! All state (view, retained batch, filter) lives inside a single actor task.
//! Commands from the handle, timer ticks and fetch completions are all
//! delivered to that task over channels and handled one at a time, so there
//! is exactly one mutation point. Observers read through `watch` channels.

use std::sync::Arc;

use metrics::{counter, gauge};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::{Clock, PeriodicTask, SystemClock};
use crate::config::SessionConfig;
use crate::countdown::{CountdownEngine, RaceCountdown};
use crate::error::{FeedError, RefreshError};
use crate::feed::RaceFeedClient;
use crate::filter::CategoryFilter;
use crate::metrics as m;
use crate::race::RaceBatch;
use crate::reachability::ReachabilitySignal;
use crate::repository::RaceRepository;
use crate::scheduler::{Completion, FetchPhase, FetchTicket, RefreshScheduler, Trigger};
use crate::view::{self, RaceCategory, ViewState};

#[derive(Debug)]
enum Command {
    Refresh,
    ToggleCategory(String),
    SetFilters(Vec<String>),
    ClearFilters,
}

#[derive(Debug)]
enum Event {
    RefreshDue,
    Tick,
    FetchCompleted {
        ticket: FetchTicket,
        outcome: Result<RaceBatch, FeedError>,
    },
}

/// Handle to a running session. Dropping it (or calling `shutdown`) stops
/// the timers and any in-flight fetch.
pub struct RaceSession {
    commands: mpsc::UnboundedSender<Command>,
    view_rx: watch::Receiver<ViewState>,
    countdown_rx: watch::Receiver<Vec<RaceCountdown>>,
    categories_rx: watch::Receiver<Vec<RaceCategory>>,
    actor: JoinHandle<()>,
}

impl RaceSession {
    /// Start a session on the current Tokio runtime using wall-clock time.
    pub fn start(
        config: &SessionConfig,
        feed: Arc<dyn RaceFeedClient>,
        reachability: ReachabilitySignal,
    ) -> Self {
        Self::start_with_clock(config, feed, reachability, Arc::new(SystemClock))
    }

    pub fn start_with_clock(
        config: &SessionConfig,
        feed: Arc<dyn RaceFeedClient>,
        reachability: ReachabilitySignal,
        clock: Arc<dyn Clock>,
    ) -> Self {
        m::ensure_described();
        let config = config.clone().sanitized();

        let filter = CategoryFilter::new();
        let (view_tx, view_rx) = watch::channel(ViewState::Loading);
        let (countdown_tx, countdown_rx) = watch::channel(Vec::new());
        let (categories_tx, categories_rx) = watch::channel(view::categories(&filter));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (ev_tx, ev_rx) = mpsc::unbounded_channel();

        let timers = [
            PeriodicTask::spawn(config.refresh_interval(), ev_tx.clone(), || {
                Event::RefreshDue
            }),
            PeriodicTask::spawn(config.tick_interval(), ev_tx.clone(), || Event::Tick),
        ];

        info!(
            target: "refresh",
            feed = feed.name(),
            refresh_secs = config.refresh_interval_secs,
            tick_ms = config.tick_interval_ms,
            "race session starting"
        );

        let actor = SessionActor {
            feed,
            reachability,
            clock,
            scheduler: RefreshScheduler::new(),
            repository: RaceRepository::new(),
            filter,
            countdown: CountdownEngine::new(),
            view_tx,
            countdown_tx,
            categories_tx,
            events: ev_tx,
            in_flight: None,
        };

        let actor = tokio::spawn(actor.run(cmd_rx, ev_rx, timers));

        Self {
            commands: cmd_tx,
            view_rx,
            countdown_rx,
            categories_rx,
            actor,
        }
    }

    /// Latest view state; the receiver sees the current value immediately.
    pub fn subscribe_view(&self) -> watch::Receiver<ViewState> {
        self.view_rx.clone()
    }

    pub fn subscribe_countdowns(&self) -> watch::Receiver<Vec<RaceCountdown>> {
        self.countdown_rx.clone()
    }

    pub fn subscribe_categories(&self) -> watch::Receiver<Vec<RaceCategory>> {
        self.categories_rx.clone()
    }

    pub fn view(&self) -> ViewState {
        self.view_rx.borrow().clone()
    }

    pub fn categories(&self) -> Vec<RaceCategory> {
        self.categories_rx.borrow().clone()
    }

    /// Manual pull / retry.
    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    pub fn toggle_category(&self, category_id: &str) {
        self.send(Command::ToggleCategory(category_id.to_string()));
    }

    pub fn set_filters<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = ids.into_iter().map(|s| s.as_ref().to_string()).collect();
        self.send(Command::SetFilters(ids));
    }

    pub fn clear_filters(&self) {
        self.send(Command::ClearFilters);
    }

    /// Stop timers and any in-flight fetch, and wait for the actor to exit.
    pub async fn shutdown(self) {
        let Self {
            commands, actor, ..
        } = self;
        drop(commands);
        if let Err(e) = actor.await {
            warn!(target: "refresh", error = %e, "race session actor ended abnormally");
        }
    }

    fn send(&self, cmd: Command) {
        if self.commands.send(cmd).is_err() {
            debug!(target: "refresh", "command dropped: session already stopped");
        }
    }
}

struct SessionActor {
    feed: Arc<dyn RaceFeedClient>,
    reachability: ReachabilitySignal,
    clock: Arc<dyn Clock>,
    scheduler: RefreshScheduler,
    repository: RaceRepository,
    filter: CategoryFilter,
    countdown: CountdownEngine,
    view_tx: watch::Sender<ViewState>,
    countdown_tx: watch::Sender<Vec<RaceCountdown>>,
    categories_tx: watch::Sender<Vec<RaceCategory>>,
    events: mpsc::UnboundedSender<Event>,
    in_flight: Option<JoinHandle<()>>,
}

impl SessionActor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: mpsc::UnboundedReceiver<Event>,
        timers: [PeriodicTask; 2],
    ) {
        self.request_refresh(Trigger::Startup);

        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(ev) = events.recv() => self.handle_event(ev),
            }
        }

        for t in &timers {
            t.cancel();
        }
        self.abort_in_flight();
        self.scheduler.cancel();
        info!(target: "refresh", "race session stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Refresh => {
                self.request_refresh(Trigger::Manual);
            }
            Command::ToggleCategory(id) => {
                let selected = self.filter.toggle(&id);
                info!(target: "refresh", category = %id, selected, "category toggled");
                self.filter_changed();
            }
            Command::SetFilters(ids) => {
                self.filter.set(ids);
                info!(target: "refresh", filters = ?self.filter.ids(), "filters set");
                self.filter_changed();
            }
            Command::ClearFilters => {
                self.filter.clear();
                info!(target: "refresh", "filters cleared");
                self.filter_changed();
            }
        }
    }

    fn handle_event(&mut self, ev: Event) {
        match ev {
            Event::RefreshDue => {
                self.request_refresh(Trigger::Periodic);
            }
            Event::Tick => self.on_tick(),
            Event::FetchCompleted { ticket, outcome } => self.on_fetch_completed(ticket, outcome),
        }
    }

    fn filter_changed(&mut self) {
        self.categories_tx
            .send_replace(view::categories(&self.filter));
        self.request_refresh(Trigger::FilterChanged);
    }

    /// Cancel whatever is outstanding, pass the connectivity gate, then fetch.
    /// Returns the ticket of the fetch issued, if any.
    fn request_refresh(&mut self, trigger: Trigger) -> Option<FetchTicket> {
        self.abort_in_flight();

        if !self.reachability.is_reachable() {
            self.scheduler.fail_preflight();
            counter!(m::CONNECTIVITY_BLOCKED).increment(1);
            warn!(target: "refresh", %trigger, "offline: refresh skipped");
            if let Some(state) = ViewState::from_failure(&RefreshError::Connectivity) {
                self.publish(state);
            }
            return None;
        }

        let (ticket, superseded) = self.scheduler.begin(trigger);
        counter!(m::FETCH_STARTED).increment(1);
        debug!(
            target: "refresh",
            %trigger,
            generation = ticket.generation(),
            superseded,
            "fetch started"
        );

        if !self.view_tx.borrow().is_loaded() {
            self.publish(ViewState::Loading);
        }

        let feed = Arc::clone(&self.feed);
        let events = self.events.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = feed.fetch_races().await;
            // Receiver gone means the session is shutting down.
            let _ = events.send(Event::FetchCompleted { ticket, outcome });
        }));
        Some(ticket)
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    fn on_fetch_completed(&mut self, ticket: FetchTicket, outcome: Result<RaceBatch, FeedError>) {
        let completion = match &outcome {
            Ok(_) => Completion::Succeeded,
            Err(FeedError::Cancelled) => Completion::Cancelled,
            Err(_) => Completion::Failed,
        };
        if !self.scheduler.finish(ticket, completion) {
            counter!(m::FETCH_STALE).increment(1);
            debug!(
                target: "refresh",
                generation = ticket.generation(),
                "stale fetch result discarded"
            );
            return;
        }
        self.in_flight = None;

        match outcome {
            Ok(batch) => {
                let now = self.clock.now();
                self.repository.replace(&batch);
                gauge!(m::LAST_FETCH_TS).set(now as f64);
                let state = self.repository.project(&self.filter, now);
                info!(
                    target: "refresh",
                    fetched = batch.len(),
                    state = state.kind(),
                    shown = state.races().len(),
                    "fetch applied"
                );
                self.publish(state);
            }
            Err(e) => {
                let err = RefreshError::from(e);
                match ViewState::from_failure(&err) {
                    Some(state) => {
                        counter!(m::FETCH_FAILED).increment(1);
                        warn!(target: "refresh", error = %err, "fetch failed");
                        self.publish(state);
                    }
                    None => {
                        counter!(m::FETCH_CANCELLED).increment(1);
                        debug!(target: "refresh", "fetch cancelled; keeping previous state");
                    }
                }
            }
        }
    }

    /// Countdown refresh plus expiry sweep.
    fn on_tick(&mut self) {
        let now = self.clock.now();
        self.publish_countdowns(now);

        let displayed = self.view_tx.borrow().races().to_vec();
        if displayed.is_empty() {
            return;
        }
        let dropped = self.repository.dropped_since(&displayed, &self.filter, now);
        if dropped.is_empty() {
            return;
        }
        // An outstanding expiry refresh already covers this; any other fetch
        // is superseded.
        if self.scheduler.phase() == (FetchPhase::Fetching { trigger: Trigger::Expiry }) {
            return;
        }
        counter!(m::EXPIRY_REFRESH).increment(1);
        info!(target: "refresh", expired = ?dropped, "race expired; refreshing");
        self.request_refresh(Trigger::Expiry);
    }

    fn publish(&mut self, state: ViewState) {
        let changed = self.repository.accept(&state);
        gauge!(m::VIEW_RACES).set(state.races().len() as f64);
        self.countdown.track(state.races());

        self.view_tx.send_if_modified(|current| {
            *current = state;
            changed
        });
        if changed {
            counter!(m::VIEW_PUBLISHED).increment(1);
        } else {
            counter!(m::VIEW_SUPPRESSED).increment(1);
            debug!(target: "refresh", "race list unchanged; notification suppressed");
        }

        self.publish_countdowns(self.clock.now());
    }

    fn publish_countdowns(&self, now: i64) {
        let next = self.countdown.render_all(now);
        self.countdown_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
