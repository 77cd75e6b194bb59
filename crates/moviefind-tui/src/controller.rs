//! Search controller state machine.
//!
//! One fetch cycle runs `Idle -> Loading -> {Success, Error} -> Idle`.
//! Every fetch carries a sequence number; only the outcome of the most
//! recently issued fetch is applied, so a slow response for an older
//! query can never overwrite the results of a newer one.

use anyhow::Result;
use moviefind_api::appwrite::{TrendingEntry, normalize_query};
use moviefind_api::tmdb::{Movie, MovieRequest};

/// Prefix of the user-visible catalog error message.
pub const FETCH_ERROR_PREFIX: &str = "Error fetching movies";

/// State rendered by the view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Text as typed, updated on every keystroke.
    pub raw_query: String,
    /// Last settled query; fetches are keyed off this value only.
    pub debounced_query: String,
    /// A fetch for `debounced_query` is in flight.
    pub is_loading: bool,
    /// User-visible catalog error.
    pub error_message: Option<String>,
    /// Results of the latest fetch.
    pub movies: Vec<Movie>,
    /// Trending searches, loaded once at startup.
    pub trending: Vec<TrendingEntry>,
}

/// The one thing the main section shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MainSection<'a> {
    /// A fetch is in flight.
    Loading,
    /// The last fetch failed.
    Error(&'a str),
    /// The last fetch succeeded (possibly with no movies).
    Results(&'a [Movie]),
}

impl ViewState {
    /// Picks exactly one of loading, error, or results.
    #[must_use]
    pub fn main_section(&self) -> MainSection<'_> {
        if self.is_loading {
            MainSection::Loading
        } else if let Some(message) = &self.error_message {
            MainSection::Error(message)
        } else {
            MainSection::Results(&self.movies)
        }
    }
}

/// A fetch the caller must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Sequence number of this fetch.
    pub seq: u64,
    /// Catalog request to issue.
    pub request: MovieRequest,
}

/// Completion of a fetch.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Sequence number from the ticket.
    pub seq: u64,
    /// Catalog request that was issued.
    pub request: MovieRequest,
    /// Movies, or the failure reason.
    pub result: Result<Vec<Movie>>,
}

/// A successful non-empty search to record in the analytics store.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Settled query text.
    pub query: String,
    /// First (top) result.
    pub movie: Movie,
}

/// Owns the view state and decides when fetches start and which
/// outcomes are applied.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct SearchController {
    state: ViewState,
    /// Sequence number of the most recently issued fetch (0 = none yet).
    latest_seq: u64,
}

impl SearchController {
    /// Creates a controller with an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current view state.
    #[must_use]
    pub const fn state(&self) -> &ViewState {
        &self.state
    }

    /// Returns the sequence number of the latest issued fetch.
    #[must_use]
    pub const fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Replaces the raw query.
    pub fn set_raw_query(&mut self, raw: String) {
        self.state.raw_query = raw;
    }

    /// Appends a character to the raw query.
    pub fn push_char(&mut self, ch: char) {
        self.state.raw_query.push(ch);
    }

    /// Removes the last character of the raw query.
    pub fn pop_char(&mut self) {
        self.state.raw_query.pop();
    }

    /// Clears the raw query.
    pub fn clear_query(&mut self) {
        self.state.raw_query.clear();
    }

    /// Starts the fetch for the initial (empty) debounced value.
    pub fn initial_fetch(&mut self) -> FetchTicket {
        self.begin_fetch()
    }

    /// Commits a settled query. Returns a ticket only when the debounced
    /// value actually changed.
    pub fn settle(&mut self, value: String) -> Option<FetchTicket> {
        if value == self.state.debounced_query {
            return None;
        }
        self.state.debounced_query = value;
        Some(self.begin_fetch())
    }

    /// Marks loading, clears error and list, and issues a new sequence number.
    fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_seq = self.latest_seq.saturating_add(1);
        self.state.is_loading = true;
        self.state.error_message = None;
        self.state.movies.clear();

        let request = MovieRequest::for_query(&self.state.debounced_query);
        tracing::debug!(seq = self.latest_seq, ?request, "Fetch started");
        FetchTicket {
            seq: self.latest_seq,
            request,
        }
    }

    /// Applies a fetch completion.
    ///
    /// Outcomes of superseded fetches are discarded. On success the list is
    /// replaced and, for a non-blank query with results, the top hit is
    /// returned for recording. On failure the list is emptied and an error
    /// message is set. Loading is cleared last in both cases.
    pub fn apply_outcome(&mut self, outcome: FetchOutcome) -> Option<SearchHit> {
        if outcome.seq != self.latest_seq {
            tracing::debug!(
                seq = outcome.seq,
                latest = self.latest_seq,
                "Discarding superseded fetch result"
            );
            return None;
        }

        let hit = match outcome.result {
            Ok(movies) => {
                tracing::debug!(count = movies.len(), "Fetch succeeded");
                let hit = match (outcome.request.query(), movies.first()) {
                    (Some(query), Some(top)) if !normalize_query(query).is_empty() => {
                        Some(SearchHit {
                            query: String::from(query),
                            movie: top.clone(),
                        })
                    }
                    _ => None,
                };
                self.state.movies = movies;
                hit
            }
            Err(err) => {
                tracing::error!("Error fetching movies: {err:#}");
                self.state.movies.clear();
                self.state.error_message = Some(format!("{FETCH_ERROR_PREFIX}: {err:#}"));
                None
            }
        };

        self.state.is_loading = false;
        hit
    }

    /// Applies the startup trending load. Failures are logged and leave the
    /// trending list unchanged; they never touch the catalog error.
    pub fn apply_trending(&mut self, result: Result<Vec<TrendingEntry>>) {
        match result {
            Ok(trending) => {
                tracing::debug!(count = trending.len(), "Trending searches loaded");
                self.state.trending = trending;
            }
            Err(err) => {
                tracing::warn!("Failed to load trending searches: {err:#}");
            }
        }
    }
}
