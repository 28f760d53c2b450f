//! Region to archive orchestration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::archive::{archive_file_name, ArchiveMetadata, ArchiveWriter};
use crate::coord::{count_region, enumerate};
use crate::fetch::{FetchPool, FetchedTile, TileFetcher};
use crate::provider::AsyncHttpClient;
use crate::region::Region;

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::summary::{BatchReport, Summary};

/// Called by the writer path after each tile with `(completed, total)`.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Running counts for one region.
#[derive(Debug, Default)]
struct Tally {
    total: u64,
    attempted: u64,
    succeeded: u64,
    failed: u64,
}

impl Tally {
    fn new(total: u64) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Tiles submitted to a pool whose result never arrived.
    fn record_lost(&mut self, lost: u64) {
        self.attempted += lost;
        self.failed += lost;
    }

    fn record(&mut self, fetched: &FetchedTile) {
        self.attempted += 1;
        if fetched.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Failures so far already push the whole run over `threshold`.
    fn exceeds_planned(&self, threshold: f64) -> bool {
        self.total > 0 && self.failed as f64 / self.total as f64 > threshold
    }

    fn ratio(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.failed as f64 / self.attempted as f64
        }
    }
}

/// Turns regions into MBTiles archives.
///
/// Per zoom level the tiles are enumerated, fetched by a [`FetchPool`] and
/// streamed over a bounded channel to the single [`ArchiveWriter`], which
/// commits them in batches.
pub struct Pipeline<C: AsyncHttpClient> {
    fetcher: Arc<TileFetcher<C>>,
    config: PipelineConfig,
    cancel: CancellationToken,
    progress: Option<ProgressCallback>,
}

impl<C: AsyncHttpClient + 'static> Pipeline<C> {
    pub fn new(fetcher: TileFetcher<C>, config: PipelineConfig) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            config,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// Uses an external token; cancelling it stops the current run.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: impl Fn(u64, u64) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Destination of the archive for `region` in `cycle`.
    pub fn archive_path(&self, region: &Region, cycle: &str) -> PathBuf {
        let zoom = region.zoom();
        self.config
            .output_dir
            .join(archive_file_name(region.id(), cycle, zoom.min, zoom.max))
    }

    /// Builds the archive for one region.
    ///
    /// On success the archive is finalized and its counts returned. On any
    /// error the partially written archive is removed.
    ///
    /// # Errors
    ///
    /// * [`PipelineError::TooManyTiles`] - region exceeds `max_tiles`
    /// * [`PipelineError::Storage`] - archive could not be written
    /// * [`PipelineError::Aborted`] - failure threshold crossed with abort enabled
    /// * [`PipelineError::Cancelled`] - external cancellation
    pub async fn run_pipeline(&self, region: &Region, cycle: &str) -> Result<Summary, PipelineError> {
        if self.cancel.is_cancelled() {
            return Err(PipelineError::Cancelled {
                region: region.id().to_string(),
            });
        }

        let total = count_region(region);
        if total > self.config.max_tiles {
            return Err(PipelineError::TooManyTiles {
                region: region.id().to_string(),
                count: total,
                limit: self.config.max_tiles,
            });
        }

        let path = self.archive_path(region, cycle);
        info!(
            region = region.id(),
            cycle = cycle,
            tiles = total,
            path = %path.display(),
            "Building archive"
        );

        let mut writer = ArchiveWriter::open(&path, &ArchiveMetadata::for_region(region, cycle))?;
        let mut tally = Tally::new(total);

        if let Err(e) = self.assemble(region, cycle, &mut writer, &mut tally).await {
            warn!(region = region.id(), error = %e, "Run failed, discarding archive");
            writer.discard();
            return Err(e);
        }

        let archive = match writer.close() {
            Ok(archive) => archive,
            Err(e) => {
                remove_unfinished(&path);
                return Err(e.into());
            }
        };

        let degraded = tally.ratio() > self.config.failure_threshold;
        if degraded {
            warn!(
                region = region.id(),
                failed = tally.failed,
                attempted = tally.attempted,
                threshold = self.config.failure_threshold,
                "Archive is degraded"
            );
        }

        let summary = Summary {
            region: region.id().to_string(),
            cycle: cycle.to_string(),
            attempted: tally.attempted,
            succeeded: tally.succeeded,
            failed: tally.failed,
            degraded,
            archive,
        };
        info!(summary = %summary, "Region complete");
        Ok(summary)
    }

    /// Runs every region in order, stopping at the first error.
    pub async fn run_all(&self, regions: &[Region], cycle: &str) -> BatchReport {
        let mut summaries = Vec::with_capacity(regions.len());

        for region in regions {
            match self.run_pipeline(region, cycle).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    error!(region = region.id(), error = %e, "Stopping batch");
                    return BatchReport {
                        summaries,
                        error: Some(e),
                    };
                }
            }
        }

        BatchReport {
            summaries,
            error: None,
        }
    }

    async fn assemble(
        &self,
        region: &Region,
        cycle: &str,
        writer: &mut ArchiveWriter,
        tally: &mut Tally,
    ) -> Result<(), PipelineError> {
        // Aborting a region must not cancel the caller's token
        let run_cancel = self.cancel.child_token();

        for zoom in region.zooms() {
            let range = enumerate(region, zoom).map_err(|e| PipelineError::InvalidRegion {
                region: region.id().to_string(),
                reason: e.to_string(),
            })?;
            debug!(region = region.id(), zoom, tiles = range.tile_count(), "Fetching zoom level");

            let (tx, mut rx) = mpsc::channel(self.config.queue_depth.max(1));
            let pool = FetchPool::new(
                Arc::clone(&self.fetcher),
                cycle,
                self.config.parallel_downloads,
                run_cancel.clone(),
            );
            let dispatcher = pool.spawn(range, tx);

            let mut batch = Vec::with_capacity(self.config.batch_size);
            let mut storage_error = None;
            let mut aborted = false;
            let mut received = 0u64;

            while let Some(fetched) = rx.recv().await {
                received += 1;
                tally.record(&fetched);
                if let Some(progress) = &self.progress {
                    progress(tally.attempted, tally.total);
                }
                // Once stopping, in-flight results are only counted
                if aborted || storage_error.is_some() {
                    continue;
                }

                batch.push(fetched);
                if batch.len() >= self.config.batch_size {
                    if let Err(e) = writer.write_batch(&batch) {
                        error!(region = region.id(), error = %e, "Batch write failed");
                        storage_error = Some(e);
                        run_cancel.cancel();
                    }
                    batch.clear();
                }

                if self.config.abort_on_failure
                    && tally.exceeds_planned(self.config.failure_threshold)
                {
                    warn!(
                        region = region.id(),
                        failed = tally.failed,
                        total = tally.total,
                        "Failure threshold exceeded, aborting"
                    );
                    aborted = true;
                    run_cancel.cancel();
                }
            }

            let submitted = dispatcher.await?;
            // A worker that panicked dropped its sender without reporting
            let lost = submitted.saturating_sub(received);
            if lost > 0 {
                warn!(region = region.id(), zoom, lost, "Fetch workers ended without a result");
                tally.record_lost(lost);
                if let Some(progress) = &self.progress {
                    progress(tally.attempted, tally.total);
                }
                if self.config.abort_on_failure
                    && tally.exceeds_planned(self.config.failure_threshold)
                {
                    aborted = true;
                }
            }

            if let Some(e) = storage_error {
                return Err(e.into());
            }
            if aborted {
                return Err(PipelineError::Aborted {
                    region: region.id().to_string(),
                    failed: tally.failed,
                    attempted: tally.attempted,
                });
            }
            if self.cancel.is_cancelled() {
                return Err(PipelineError::Cancelled {
                    region: region.id().to_string(),
                });
            }
            if !batch.is_empty() {
                writer.write_batch(&batch)?;
            }
        }

        Ok(())
    }
}

/// Deletes an archive that failed to finalize; returns whether it is gone.
fn remove_unfinished(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to remove unfinished archive");
            false
        }
    }
}
