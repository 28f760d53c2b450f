//! Build commands - turn one region, or every region of a list, into
//! MBTiles archives.

use std::path::PathBuf;

use aerotiles::config::ConfigFile;
use aerotiles::coord::enumerate;
use aerotiles::pipeline::{Pipeline, Summary};
use aerotiles::provider::AsyncReqwestClient;
use aerotiles::region::{load_regions, region_names, BoundingBox, Region, ZoomRange};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::airac::resolve_cycle;
use crate::error::CliError;

/// Arguments for the build command.
pub struct BuildArgs {
    pub bbox: [f64; 4],
    pub zoom: [u8; 2],
    pub airac: String,
    pub oaci_prefix: String,
    pub progress: bool,
}

impl BuildArgs {
    fn region(&self) -> Result<Region, CliError> {
        Ok(Region::new(
            self.oaci_prefix.trim(),
            BoundingBox::from_array(self.bbox),
            ZoomRange::new(self.zoom[0], self.zoom[1]),
        )?)
    }
}

/// Arguments for the build-all command.
pub struct BuildAllArgs {
    pub regions: PathBuf,
    pub airac: String,
    pub progress: bool,
}

/// Run the build command.
pub fn run(args: BuildArgs, config: &ConfigFile) -> Result<(), CliError> {
    let region = args.region()?;
    let cycle = resolve_cycle(&args.airac, &config.cycle_calculator())?;

    println!(
        "Generating MBTiles for bbox=[{}], zooms={}-{}, AIRAC={}",
        region.bbox(),
        region.zoom().min,
        region.zoom().max,
        cycle
    );
    for zoom in region.zooms() {
        if let Ok(range) = enumerate(&region, zoom) {
            println!("Zoom {}: {} tiles", zoom, range.tile_count());
        }
    }

    let session = Session::new(config, args.progress)?;
    let result = session
        .runtime
        .block_on(session.pipeline.run_pipeline(&region, &cycle));
    session.bar.finish_and_clear();

    print_summary(&result?);
    Ok(())
}

/// Run the build-all command.
pub fn run_all(args: BuildAllArgs, config: &ConfigFile) -> Result<(), CliError> {
    let regions = load_regions(&args.regions)?;
    let cycle = resolve_cycle(&args.airac, &config.cycle_calculator())?;

    println!(
        "Generating MBTiles for {} region(s) ({}), AIRAC={}",
        regions.len(),
        region_names(&regions),
        cycle
    );

    let session = Session::new(config, args.progress)?;
    let report = session
        .runtime
        .block_on(session.pipeline.run_all(&regions, &cycle));
    session.bar.finish_and_clear();

    for summary in &report.summaries {
        print_summary(summary);
    }
    match report.error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Runtime, pipeline and progress display for one command invocation.
struct Session {
    runtime: Runtime,
    pipeline: Pipeline<AsyncReqwestClient>,
    bar: ProgressBar,
}

impl Session {
    fn new(config: &ConfigFile, show_progress: bool) -> Result<Self, CliError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Runtime(format!("Failed to start async runtime: {}", e)))?;

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        ctrlc::set_handler(move || {
            eprintln!();
            eprintln!("Received interrupt, finishing in-flight tiles...");
            on_interrupt.cancel();
        })
        .map_err(|e| CliError::Runtime(format!("Failed to set signal handler: {}", e)))?;

        let bar = progress_bar(show_progress);
        let callback_bar = bar.clone();
        let pipeline = Pipeline::new(config.tile_fetcher()?, config.pipeline_config())
            .with_cancellation(cancel)
            .with_progress(move |done, total| {
                callback_bar.set_length(total);
                callback_bar.set_position(done);
            });

        info!(
            output_dir = %config.pipeline.output_dir.display(),
            parallel_downloads = config.download.parallel_downloads,
            "Pipeline ready"
        );

        Ok(Self {
            runtime,
            pipeline,
            bar,
        })
    }
}

fn progress_bar(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{msg} [{bar:40.cyan/blue}] {pos}/{len} tiles ({per_sec}, eta {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> "),
    );
    bar.set_message("Downloading tiles");
    bar
}

fn print_summary(summary: &Summary) {
    println!();
    println!("MBTiles file created: {}", summary.archive.display());
    println!(
        "  Tiles: {} stored, {} failed of {}",
        summary.succeeded, summary.failed, summary.attempted
    );
    if summary.degraded {
        eprintln!(
            "  Warning: {:.1}% of tiles failed, archive is incomplete",
            summary.failure_ratio() * 100.0
        );
    }
}
