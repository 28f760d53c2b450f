//! Tile retrieval
//!
//! [`TileFetcher`] turns one tile address into bytes, retrying transient
//! upstream failures according to a [`RetryPolicy`]. [`FetchPool`] runs the
//! fetcher over a stream of tiles on a bounded set of tokio tasks and
//! delivers every result over a bounded channel.

mod fetcher;
mod policy;
mod pool;

pub use fetcher::{FetchFailure, FetchedTile, TileFetcher};
pub use policy::{
    RetryPolicy, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_DELAY_MS, DEFAULT_JITTER,
    DEFAULT_MAX_DELAY_SECS,
};
pub use pool::FetchPool;
