//! Search session: controller, debouncer, and background tasks.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use moviefind_api::appwrite::{AnalyticsStore, TrendingEntry};
use moviefind_api::tmdb::CatalogApi;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::controller::{FetchOutcome, FetchTicket, SearchController, ViewState};
use crate::debounce::{DEFAULT_DEBOUNCE, Debouncer};
use crate::tasks::{AnalyticsQueue, spawn_fetch, spawn_trending};

/// Default number of trending searches to load.
pub const DEFAULT_TRENDING_LIMIT: u32 = 5;

/// How long [`Session::shutdown`] waits for queued analytics writes.
pub const ANALYTICS_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Tunables for a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Quiet period before the raw query settles.
    pub debounce: Duration,
    /// Number of trending searches to load at startup.
    pub trending_limit: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            trending_limit: DEFAULT_TRENDING_LIMIT,
        }
    }
}

/// An edit to the raw query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEdit {
    /// Append a character.
    Push(char),
    /// Delete the last character.
    Pop,
    /// Clear the query.
    Clear,
    /// Replace the whole query.
    Set(String),
}

/// What a [`Session::tick`] applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// The raw query settled; a fetch was started if it changed.
    Settled {
        /// Whether a new fetch was issued.
        fetch_started: bool,
    },
    /// A fetch completed.
    Fetched {
        /// Whether the outcome was applied (not superseded).
        applied: bool,
    },
    /// The trending load completed.
    Trending,
}

/// Drives one search session.
///
/// All state mutation happens on the task that owns the session; spawned
/// tasks only report back over channels.
#[derive(Debug)]
pub struct Session<C> {
    controller: SearchController,
    debouncer: Debouncer<String>,
    catalog: Arc<C>,
    analytics: AnalyticsQueue,
    analytics_worker: JoinHandle<()>,
    outcomes_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    trending_rx: Option<oneshot::Receiver<Result<Vec<TrendingEntry>>>>,
}

impl<C> Session<C>
where
    C: CatalogApi + Send + Sync + 'static,
{
    /// Starts a session: spawns the analytics worker and the trending load,
    /// and issues the fetch for the initial empty query.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn start<S>(catalog: Arc<C>, store: Arc<S>, config: SessionConfig) -> Self
    where
        S: AnalyticsStore + Send + Sync + 'static,
    {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        let trending_rx = spawn_trending(Arc::clone(&store), config.trending_limit);
        let (analytics, analytics_worker) = AnalyticsQueue::spawn(store);

        let mut session = Self {
            controller: SearchController::new(),
            debouncer: Debouncer::new(config.debounce),
            catalog,
            analytics,
            analytics_worker,
            outcomes_tx,
            outcomes_rx,
            trending_rx: Some(trending_rx),
        };
        let ticket = session.controller.initial_fetch();
        session.dispatch(ticket);
        session
    }

    /// Returns the current view state.
    #[must_use]
    pub const fn state(&self) -> &ViewState {
        self.controller.state()
    }

    /// Applies an edit to the raw query and restarts the quiet period.
    pub fn input(&mut self, edit: QueryEdit) {
        match edit {
            QueryEdit::Push(ch) => self.controller.push_char(ch),
            QueryEdit::Pop => self.controller.pop_char(),
            QueryEdit::Clear => self.controller.clear_query(),
            QueryEdit::Set(raw) => self.controller.set_raw_query(raw),
        }
        self.debouncer
            .schedule(self.controller.state().raw_query.clone());
    }

    /// Waits for the next debounce expiry, fetch completion, or trending
    /// result, and applies it.
    ///
    /// Cancel-safe: nothing is applied unless the wait completes.
    pub async fn tick(&mut self) -> Update {
        let deadline = self.debouncer.deadline();
        let trending_pending = self.trending_rx.is_some();

        tokio::select! {
            () = sleep_until_opt(deadline), if deadline.is_some() => {
                self.settle(Instant::now())
            }
            Some(outcome) = self.outcomes_rx.recv() => {
                self.apply_outcome(outcome)
            }
            result = recv_trending(&mut self.trending_rx), if trending_pending => {
                self.trending_rx = None;
                self.controller.apply_trending(result);
                Update::Trending
            }
        }
    }

    /// Ends the session, giving queued analytics writes up to
    /// [`ANALYTICS_DRAIN_TIMEOUT`] to finish.
    ///
    /// In-flight fetches and the trending load are abandoned.
    pub async fn shutdown(self) {
        let Self {
            analytics,
            analytics_worker,
            ..
        } = self;
        drop(analytics);

        match tokio::time::timeout(ANALYTICS_DRAIN_TIMEOUT, analytics_worker).await {
            Ok(Ok(())) => tracing::debug!("Analytics queue drained"),
            Ok(Err(err)) => tracing::warn!("Analytics worker failed: {err}"),
            Err(_) => tracing::warn!(
                timeout = ?ANALYTICS_DRAIN_TIMEOUT,
                "Analytics queue not drained before exit; pending searches dropped"
            ),
        }
    }

    /// Commits the debounced query if its quiet period has elapsed.
    fn settle(&mut self, now: Instant) -> Update {
        let Some(value) = self.debouncer.take_ready(now) else {
            return Update::Settled {
                fetch_started: false,
            };
        };
        tracing::debug!(query = %value, "Query settled");
        match self.controller.settle(value) {
            Some(ticket) => {
                self.dispatch(ticket);
                Update::Settled {
                    fetch_started: true,
                }
            }
            None => Update::Settled {
                fetch_started: false,
            },
        }
    }

    /// Applies a fetch outcome and queues the analytics write, if any.
    fn apply_outcome(&mut self, outcome: FetchOutcome) -> Update {
        let seq = outcome.seq;
        let hit = self.controller.apply_outcome(outcome);
        if let Some(hit) = hit {
            self.analytics.enqueue(hit);
        }
        Update::Fetched {
            applied: seq == self.controller.latest_seq(),
        }
    }

    /// Spawns the fetch for `ticket`.
    fn dispatch(&self, ticket: FetchTicket) {
        spawn_fetch(Arc::clone(&self.catalog), ticket, self.outcomes_tx.clone());
    }
}

/// Sleeps until `deadline`; never completes for `None`.
async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Waits for the trending result; a dropped sender counts as a failure.
async fn recv_trending(
    receiver: &mut Option<oneshot::Receiver<Result<Vec<TrendingEntry>>>>,
) -> Result<Vec<TrendingEntry>> {
    match receiver {
        Some(rx) => rx
            .await
            .unwrap_or_else(|_| Err(anyhow::anyhow!("trending task ended without a result"))),
        None => std::future::pending().await,
    }
}
