//! Settings structs, one per `[section]` of the INI file.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use crate::airac::{default_reference_date, CycleCalculator};
use crate::fetch::{
    RetryPolicy, TileFetcher, DEFAULT_INITIAL_DELAY_MS, DEFAULT_JITTER, DEFAULT_MAX_DELAY_SECS,
};
use crate::pipeline::{
    PipelineConfig, DEFAULT_BATCH_SIZE, DEFAULT_FAILURE_THRESHOLD, DEFAULT_MAX_TILES,
    DEFAULT_OUTPUT_DIR, DEFAULT_PARALLEL_DOWNLOADS, DEFAULT_QUEUE_DEPTH,
};
use crate::provider::{AsyncReqwestClient, ProviderError, UrlTemplate, DEFAULT_USER_AGENT};

/// Default HTTP request timeout in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Default retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// Upstream tile source
    pub source: SourceSettings,
    /// HTTP and retry behavior
    pub download: DownloadSettings,
    /// Archive assembly
    pub pipeline: PipelineSettings,
    /// Cycle calendar
    pub airac: AiracSettings,
}

/// `[source]`
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub url_template: UrlTemplate,
    pub user_agent: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url_template: UrlTemplate::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// `[download]`
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    /// Request timeout in seconds
    pub timeout: u64,
    pub max_retries: u32,
    pub parallel_downloads: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Fraction of each backoff delay randomized
    pub jitter: f64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            parallel_downloads: DEFAULT_PARALLEL_DOWNLOADS,
            initial_backoff_ms: DEFAULT_INITIAL_DELAY_MS,
            max_backoff_ms: DEFAULT_MAX_DELAY_SECS * 1000,
            jitter: DEFAULT_JITTER,
        }
    }
}

/// `[pipeline]`
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub queue_depth: usize,
    pub batch_size: usize,
    pub failure_threshold: f64,
    pub abort_on_failure: bool,
    pub max_tiles: u64,
    pub output_dir: PathBuf,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            queue_depth: DEFAULT_QUEUE_DEPTH,
            batch_size: DEFAULT_BATCH_SIZE,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            abort_on_failure: false,
            max_tiles: DEFAULT_MAX_TILES,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// `[airac]`
#[derive(Debug, Clone, PartialEq)]
pub struct AiracSettings {
    /// Start date of a known cycle
    pub reference_date: NaiveDate,
}

impl Default for AiracSettings {
    fn default() -> Self {
        Self {
            reference_date: default_reference_date(),
        }
    }
}

impl ConfigFile {
    /// Pipeline tuning from `[download]` and `[pipeline]`.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new()
            .with_parallel_downloads(self.download.parallel_downloads)
            .with_queue_depth(self.pipeline.queue_depth)
            .with_batch_size(self.pipeline.batch_size)
            .with_failure_threshold(self.pipeline.failure_threshold)
            .with_abort_on_failure(self.pipeline.abort_on_failure)
            .with_max_tiles(self.pipeline.max_tiles)
            .with_output_dir(self.pipeline.output_dir.clone())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_retries(self.download.max_retries).with_backoff(
            Duration::from_millis(self.download.initial_backoff_ms),
            Duration::from_millis(self.download.max_backoff_ms),
            self.download.jitter,
        )
    }

    pub fn http_client(&self) -> Result<AsyncReqwestClient, ProviderError> {
        AsyncReqwestClient::build(
            Duration::from_secs(self.download.timeout),
            &self.source.user_agent,
        )
    }

    /// Fetcher backed by the real HTTP client.
    pub fn tile_fetcher(&self) -> Result<TileFetcher<AsyncReqwestClient>, ProviderError> {
        Ok(TileFetcher::new(
            self.http_client()?,
            self.source.url_template.clone(),
            self.retry_policy(),
        ))
    }

    pub fn cycle_calculator(&self) -> CycleCalculator {
        CycleCalculator::new(self.airac.reference_date)
    }
}
