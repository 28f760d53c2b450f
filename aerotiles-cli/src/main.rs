//! AeroTiles CLI - Command-line interface
//!
//! Builds MBTiles archives of aeronautical charts and answers AIRAC
//! calendar questions for scheduled jobs.

mod commands;
mod error;

use std::io;
use std::path::PathBuf;

use aerotiles::config::ConfigFile;
use aerotiles::logging::{default_log_dir, default_log_file, init_logging_or_stderr};
use clap::{Parser, Subcommand};
use tracing::debug;

use commands::airac::DEFAULT_FUTURE_COUNT;
use commands::build::{BuildAllArgs, BuildArgs};
use commands::regions::DEFAULT_REGIONS_FILE;
use error::CliError;

#[derive(Parser)]
#[command(name = "aerotiles")]
#[command(version, about = "Build MBTiles archives of aeronautical charts per AIRAC cycle", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.aerotiles/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the archive for one bounding box
    Build {
        /// Bounding box in degrees
        #[arg(
            long,
            num_args = 4,
            value_names = ["MIN_LON", "MIN_LAT", "MAX_LON", "MAX_LAT"],
            allow_negative_numbers = true,
            required = true
        )]
        bbox: Vec<f64>,

        /// Zoom level range, inclusive
        #[arg(long, num_args = 2, value_names = ["MIN_ZOOM", "MAX_ZOOM"], default_values_t = [7u8, 12u8])]
        zoom: Vec<u8>,

        /// AIRAC cycle (YYNN) or "latest"
        #[arg(long, default_value = "latest")]
        airac: String,

        /// OACI prefix naming the region (e.g. LS)
        #[arg(long)]
        oaci_prefix: String,

        /// Show a progress bar during downloads
        #[arg(long)]
        progress: bool,
    },

    /// Build archives for every region in a region list
    BuildAll {
        /// Region list (JSON)
        #[arg(long, default_value = DEFAULT_REGIONS_FILE)]
        regions: PathBuf,

        /// AIRAC cycle (YYNN) or "latest"
        #[arg(long, default_value = "latest")]
        airac: String,

        /// Show a progress bar during downloads
        #[arg(long)]
        progress: bool,
    },

    /// Show the current AIRAC cycle
    Airac {
        /// Print only the cycle identifier
        #[arg(long)]
        current_only: bool,
    },

    /// Print 1 if today starts an AIRAC cycle, 0 otherwise
    IsStart,

    /// List upcoming AIRAC cycles
    Future {
        /// Number of cycles to list
        #[arg(long, default_value_t = DEFAULT_FUTURE_COUNT)]
        count: usize,
    },

    /// List regions as prefix:bbox:zoom
    Regions {
        /// Region list (JSON)
        #[arg(long, default_value = DEFAULT_REGIONS_FILE)]
        regions: PathBuf,
    },

    /// List unique region prefixes
    RegionNames {
        /// Region list (JSON)
        #[arg(long, default_value = DEFAULT_REGIONS_FILE)]
        regions: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let _logging_guard = init_logging_or_stderr(&default_log_dir(), default_log_file(), cli.debug);

    let config = match &cli.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    debug!(reference_date = %config.airac.reference_date, "Configuration loaded");

    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Build {
            bbox,
            zoom,
            airac,
            oaci_prefix,
            progress,
        } => {
            let args = BuildArgs {
                bbox: fixed_len(bbox, "--bbox")?,
                zoom: fixed_len(zoom, "--zoom")?,
                airac,
                oaci_prefix,
                progress,
            };
            drop(stdout);
            commands::build::run(args, &config)
        }
        Commands::BuildAll {
            regions,
            airac,
            progress,
        } => {
            drop(stdout);
            commands::build::run_all(
                BuildAllArgs {
                    regions,
                    airac,
                    progress,
                },
                &config,
            )
        }
        Commands::Airac { current_only } => {
            commands::airac::current(&config.cycle_calculator(), current_only, &mut stdout)
        }
        Commands::IsStart => commands::airac::is_start(&config.cycle_calculator(), &mut stdout),
        Commands::Future { count } => {
            commands::airac::future(&config.cycle_calculator(), count, &mut stdout)
        }
        Commands::Regions { regions } => commands::regions::list(&regions, &mut stdout),
        Commands::RegionNames { regions } => commands::regions::names(&regions, &mut stdout),
    }
}

fn fixed_len<T, const N: usize>(values: Vec<T>, flag: &str) -> Result<[T; N], CliError> {
    values
        .try_into()
        .map_err(|v: Vec<T>| CliError::Usage(format!("{} expects {} values, got {}", flag, N, v.len())))
}
