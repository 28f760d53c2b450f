//! Single-tile fetch with retry.

use std::fmt;

use tracing::{debug, warn};

use crate::coord::TileCoord;
use crate::provider::{AsyncHttpClient, ProviderError, UrlTemplate};

use super::policy::RetryPolicy;

/// Why a tile could not be fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    /// Last error returned by the upstream source.
    pub error: ProviderError,
    /// Number of requests made before giving up.
    pub attempts: u32,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (after {} attempt(s))", self.error, self.attempts)
    }
}

/// A tile address paired with its payload or a failure marker.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedTile {
    pub tile: TileCoord,
    pub result: Result<Vec<u8>, FetchFailure>,
}

impl FetchedTile {
    pub fn success(tile: TileCoord, data: Vec<u8>) -> Self {
        Self {
            tile,
            result: Ok(data),
        }
    }

    pub fn failure(tile: TileCoord, error: ProviderError, attempts: u32) -> Self {
        Self {
            tile,
            result: Err(FetchFailure { error, attempts }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Payload bytes of a successful fetch.
    pub fn data(&self) -> Option<&[u8]> {
        self.result.as_deref().ok()
    }
}

/// Resolves tile addresses to bytes through an injected HTTP client.
pub struct TileFetcher<C: AsyncHttpClient> {
    client: C,
    template: UrlTemplate,
    retry: RetryPolicy,
}

impl<C: AsyncHttpClient> TileFetcher<C> {
    /// Creates a fetcher.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for every request
    /// * `template` - Tile URL template
    /// * `retry` - Retry policy for transient failures
    pub fn new(client: C, template: UrlTemplate, retry: RetryPolicy) -> Self {
        Self {
            client,
            template,
            retry,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn template(&self) -> &UrlTemplate {
        &self.template
    }

    /// Request URL for a tile in `cycle`.
    pub fn url_for(&self, tile: &TileCoord, cycle: &str) -> String {
        self.template.render(tile, cycle)
    }

    /// Fetches one tile of `cycle`.
    ///
    /// Transient errors are retried with backoff; permanent errors end the
    /// attempt immediately. Never fails: exhaustion is reported as a
    /// [`FetchedTile`] carrying a [`FetchFailure`].
    pub async fn fetch(&self, tile: TileCoord, cycle: &str) -> FetchedTile {
        let url = self.url_for(&tile, cycle);
        let mut attempt = 1;

        loop {
            match self.client.get(&url).await {
                Ok(data) => {
                    if attempt > 1 {
                        debug!(tile = %tile, attempt, "Tile fetched after retry");
                    }
                    return FetchedTile::success(tile, data);
                }
                Err(error) if !error.is_transient() => {
                    debug!(tile = %tile, error = %error, "Permanent fetch failure");
                    return FetchedTile::failure(tile, error, attempt);
                }
                Err(error) => match self.retry.retry_delay(attempt) {
                    Some(delay) => {
                        debug!(
                            tile = %tile,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %error,
                            "Transient fetch failure, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        warn!(tile = %tile, attempts = attempt, error = %error, "Giving up on tile");
                        return FetchedTile::failure(tile, error, attempt);
                    }
                },
            }
        }
    }
}
