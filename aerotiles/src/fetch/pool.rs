//! Bounded worker pool for concurrent tile fetches.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::coord::TileCoord;
use crate::provider::AsyncHttpClient;

use super::fetcher::{FetchedTile, TileFetcher};

/// Runs a [`TileFetcher`] over many tiles with at most `parallel_downloads`
/// requests in flight.
///
/// Results are delivered in completion order over a bounded channel. A full
/// channel holds workers (and their permits), which stalls dispatch.
pub struct FetchPool<C: AsyncHttpClient> {
    fetcher: Arc<TileFetcher<C>>,
    cycle: Arc<str>,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl<C: AsyncHttpClient + 'static> FetchPool<C> {
    /// Creates a pool fetching tiles of `cycle`.
    pub fn new(
        fetcher: Arc<TileFetcher<C>>,
        cycle: &str,
        parallel_downloads: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            cycle: Arc::from(cycle),
            permits: Arc::new(Semaphore::new(parallel_downloads.max(1))),
            cancel,
        }
    }

    /// Starts dispatching `tiles` and returns a handle resolving to the
    /// number of tiles submitted.
    ///
    /// Every submitted tile yields exactly one [`FetchedTile`] on `sender`.
    /// After cancellation no new fetch is started; fetches already in
    /// flight run to completion and still report. The channel closes once
    /// the dispatcher and every worker have finished.
    pub fn spawn<I>(&self, tiles: I, sender: mpsc::Sender<FetchedTile>) -> JoinHandle<u64>
    where
        I: IntoIterator<Item = TileCoord>,
        I::IntoIter: Send + 'static,
    {
        let tiles = tiles.into_iter();
        let fetcher = Arc::clone(&self.fetcher);
        let cycle = Arc::clone(&self.cycle);
        let permits = Arc::clone(&self.permits);
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let mut submitted = 0u64;

            for tile in tiles {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!(submitted, "Fetch dispatch cancelled");
                        break;
                    }
                    permit = Arc::clone(&permits).acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break,
                    },
                };

                submitted += 1;
                let fetcher = Arc::clone(&fetcher);
                let cycle = Arc::clone(&cycle);
                let sender = sender.clone();
                tokio::spawn(async move {
                    let fetched = fetcher.fetch(tile, &cycle).await;
                    trace!(tile = %fetched.tile, ok = fetched.is_success(), "Tile fetch finished");
                    // Receiver gone means the run was torn down
                    let _ = sender.send(fetched).await;
                    drop(permit);
                });
            }

            submitted
        })
    }
}
