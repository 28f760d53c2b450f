//! Pipeline tuning.

use std::path::PathBuf;

/// Default number of concurrent tile requests.
pub const DEFAULT_PARALLEL_DOWNLOADS: usize = 8;

/// Default capacity of the fetch-to-writer channel.
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

/// Default number of tiles per archive transaction.
pub const DEFAULT_BATCH_SIZE: usize = 128;

/// Default failure ratio above which a run is degraded.
pub const DEFAULT_FAILURE_THRESHOLD: f64 = 0.10;

/// Default ceiling on tiles per region.
pub const DEFAULT_MAX_TILES: u64 = 250_000;

/// Default directory for produced archives.
pub const DEFAULT_OUTPUT_DIR: &str = "mbtiles";

/// Settings for one pipeline instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Maximum fetches in flight.
    pub parallel_downloads: usize,
    /// Fetched tiles buffered between the pool and the writer.
    pub queue_depth: usize,
    /// Tiles committed per transaction.
    pub batch_size: usize,
    /// Failed / attempted ratio above which the run is degraded.
    pub failure_threshold: f64,
    /// Abort instead of degrading when the threshold is crossed.
    pub abort_on_failure: bool,
    /// Regions with more tiles than this are rejected up front.
    pub max_tiles: u64,
    /// Directory receiving the archives.
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel_downloads: DEFAULT_PARALLEL_DOWNLOADS,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            batch_size: DEFAULT_BATCH_SIZE,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            abort_on_failure: false,
            max_tiles: DEFAULT_MAX_TILES,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallel_downloads(mut self, parallel_downloads: usize) -> Self {
        self.parallel_downloads = parallel_downloads.max(1);
        self
    }

    pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = queue_depth.max(1);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Sets the failure threshold, clamped to `[0.0, 1.0]`.
    pub fn with_failure_threshold(mut self, threshold: f64) -> Self {
        self.failure_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_abort_on_failure(mut self, abort: bool) -> Self {
        self.abort_on_failure = abort;
        self
    }

    pub fn with_max_tiles(mut self, max_tiles: u64) -> Self {
        self.max_tiles = max_tiles;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.parallel_downloads, 8);
        assert_eq!(config.queue_depth, 64);
        assert_eq!(config.batch_size, 128);
        assert_eq!(config.failure_threshold, 0.10);
        assert!(!config.abort_on_failure);
        assert_eq!(config.max_tiles, 250_000);
        assert_eq!(config.output_dir, PathBuf::from("mbtiles"));
    }

    #[test]
    fn test_builder_clamps_values() {
        let config = PipelineConfig::new()
            .with_parallel_downloads(0)
            .with_queue_depth(0)
            .with_batch_size(0)
            .with_failure_threshold(1.5);
        assert_eq!(config.parallel_downloads, 1);
        assert_eq!(config.queue_depth, 1);
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.failure_threshold, 1.0);
    }
}
