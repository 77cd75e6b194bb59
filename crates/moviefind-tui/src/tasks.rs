//! Background work spawned by the search session.
//!
//! Catalog fetches and the trending load report back over channels.
//! Analytics writes go through [`AnalyticsQueue`], a fire-and-forget
//! queue with its own worker task, so a slow or failing store never
//! blocks the search flow.

use std::sync::Arc;

use anyhow::Result;
use moviefind_api::appwrite::{AnalyticsStore, TrendingEntry};
use moviefind_api::tmdb::{CatalogApi, fetch_movies};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::controller::{FetchOutcome, FetchTicket, SearchHit};

/// Spawns a catalog fetch that reports its outcome on `outcomes`.
///
/// The task is never cancelled; superseded outcomes are filtered by the
/// controller's sequence check.
pub fn spawn_fetch<C>(
    catalog: Arc<C>,
    ticket: FetchTicket,
    outcomes: mpsc::UnboundedSender<FetchOutcome>,
) -> JoinHandle<()>
where
    C: CatalogApi + Send + Sync + 'static,
{
    let span = tracing::debug_span!("fetch", seq = ticket.seq);
    tokio::spawn(
        async move {
            let result = fetch_movies(catalog.as_ref(), &ticket.request).await;
            let outcome = FetchOutcome {
                seq: ticket.seq,
                request: ticket.request,
                result,
            };
            if outcomes.send(outcome).is_err() {
                tracing::debug!("Session closed before fetch completed");
            }
        }
        .instrument(span),
    )
}

/// Spawns the one-shot trending load.
pub fn spawn_trending<S>(store: Arc<S>, limit: u32) -> oneshot::Receiver<Result<Vec<TrendingEntry>>>
where
    S: AnalyticsStore + Send + Sync + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::spawn(
        async move {
            let result = store.trending(limit).await;
            if tx.send(result).is_err() {
                tracing::debug!("Session closed before trending load completed");
            }
        }
        .instrument(tracing::debug_span!("trending", limit)),
    );
    rx
}

/// Fire-and-forget queue of search hits to record.
///
/// One worker task drains the queue in order. Failures are logged and
/// swallowed. Dropping every sender lets the worker finish.
#[derive(Debug, Clone)]
pub struct AnalyticsQueue {
    sender: mpsc::UnboundedSender<SearchHit>,
}

impl AnalyticsQueue {
    /// Spawns the worker and returns the queue plus the worker handle.
    pub fn spawn<S>(store: Arc<S>) -> (Self, JoinHandle<()>)
    where
        S: AnalyticsStore + Send + Sync + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(store, receiver));
        (Self { sender }, worker)
    }

    /// Enqueues a hit. Never blocks and never fails the caller.
    pub fn enqueue(&self, hit: SearchHit) {
        if self.sender.send(hit).is_err() {
            tracing::warn!("Analytics worker stopped; search not recorded");
        }
    }
}

/// Records queued hits one at a time.
async fn run_worker<S>(store: Arc<S>, mut receiver: mpsc::UnboundedReceiver<SearchHit>)
where
    S: AnalyticsStore + Send + Sync + 'static,
{
    while let Some(hit) = receiver.recv().await {
        match store.record_search(&hit.query, &hit.movie).await {
            Ok(()) => {
                tracing::debug!(query = %hit.query, movie_id = hit.movie.id, "Search recorded");
            }
            Err(err) => {
                tracing::warn!(query = %hit.query, "Failed to record search: {err:#}");
            }
        }
    }
    tracing::debug!("Analytics worker finished");
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::sync::Mutex;

    use anyhow::bail;
    use moviefind_api::tmdb::{Movie, MovieRequest};

    use super::*;

    /// Store that records calls and fails for one query.
    #[derive(Default)]
    struct RecordingStore {
        recorded: Mutex<Vec<(String, u64)>>,
        fail_query: Option<String>,
    }

    impl AnalyticsStore for RecordingStore {
        async fn record_search(&self, query: &str, movie: &Movie) -> Result<()> {
            if self.fail_query.as_deref() == Some(query) {
                bail!("store unavailable");
            }
            self.recorded
                .lock()
                .unwrap()
                .push((String::from(query), movie.id));
            Ok(())
        }

        async fn trending(&self, _limit: u32) -> Result<Vec<TrendingEntry>> {
            bail!("trending unavailable")
        }
    }

    /// Catalog that echoes the request as a single movie title.
    struct EchoCatalog;

    impl CatalogApi for EchoCatalog {
        async fn list_popular(&self) -> Result<Vec<Movie>> {
            Ok(vec![movie(0, "popular")])
        }

        async fn search(&self, query: &str) -> Result<Vec<Movie>> {
            Ok(vec![movie(1, query)])
        }
    }

    fn movie(id: u64, title: &str) -> Movie {
        Movie {
            id,
            title: String::from(title),
            poster_path: None,
            release_date: None,
            original_language: None,
            vote_average: None,
        }
    }

    fn hit(query: &str, id: u64) -> SearchHit {
        SearchHit {
            query: String::from(query),
            movie: movie(id, "Batman"),
        }
    }

    #[tokio::test]
    async fn test_spawn_fetch_reports_outcome() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticket = FetchTicket {
            seq: 7,
            request: MovieRequest::Search(String::from("bat")),
        };

        // Act
        spawn_fetch(Arc::new(EchoCatalog), ticket, tx).await.unwrap();
        let outcome = rx.recv().await.unwrap();

        // Assert
        assert_eq!(outcome.seq, 7);
        assert_eq!(outcome.result.unwrap()[0].title, "bat");
    }

    #[tokio::test]
    async fn test_queue_records_every_hit_in_order() {
        // Arrange
        let store = Arc::new(RecordingStore::default());
        let (queue, worker) = AnalyticsQueue::spawn(Arc::clone(&store));

        // Act: identical searches are recorded each time
        queue.enqueue(hit("bat", 1));
        queue.enqueue(hit("bat", 1));
        queue.enqueue(hit("dune", 2));
        drop(queue);
        worker.await.unwrap();

        // Assert
        let recorded = store.recorded.lock().unwrap();
        assert_eq!(
            *recorded,
            vec![
                (String::from("bat"), 1),
                (String::from("bat"), 1),
                (String::from("dune"), 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_queue_survives_store_failure() {
        // Arrange
        let store = Arc::new(RecordingStore {
            recorded: Mutex::new(Vec::new()),
            fail_query: Some(String::from("bad")),
        });
        let (queue, worker) = AnalyticsQueue::spawn(Arc::clone(&store));

        // Act
        queue.enqueue(hit("bad", 1));
        queue.enqueue(hit("good", 2));
        drop(queue);
        worker.await.unwrap();

        // Assert: the failure is swallowed and the next hit still lands
        let recorded = store.recorded.lock().unwrap();
        assert_eq!(*recorded, vec![(String::from("good"), 2)]);
    }

    #[tokio::test]
    async fn test_spawn_trending_propagates_failure() {
        // Arrange
        let store = Arc::new(RecordingStore::default());

        // Act
        let result = spawn_trending(store, 5).await.unwrap();

        // Assert
        assert!(result.unwrap_err().to_string().contains("trending unavailable"));
    }
}
