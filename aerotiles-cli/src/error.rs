//! Errors surfaced by the `aerotiles` binary.
//!
//! Every command returns [`CliError`]; `main` prints it with any hint that
//! applies and exits with status 1.

use std::fmt;
use std::process;

use aerotiles::airac::AiracError;
use aerotiles::config::ConfigFileError;
use aerotiles::pipeline::PipelineError;
use aerotiles::provider::ProviderError;
use aerotiles::region::RegionError;

/// Anything that ends a command unsuccessfully.
#[derive(Debug)]
pub enum CliError {
    /// Configuration file could not be loaded
    Config(ConfigFileError),
    /// Invalid command-line argument
    Usage(String),
    /// Region definition or region list error
    Region(RegionError),
    /// Date outside the AIRAC calendar
    Airac(AiracError),
    /// HTTP client could not be created
    Provider(ProviderError),
    /// A region run failed
    Pipeline(PipelineError),
    /// Async runtime or signal handler setup failed
    Runtime(String),
    /// Writing command output failed
    Output(std::io::Error),
}

impl CliError {
    /// Prints the error, plus a hint for pipeline limits, and exits 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Pipeline(PipelineError::TooManyTiles { .. }) => {
                eprintln!();
                eprintln!("Reduce the bounding box or zoom range, or raise");
                eprintln!("max_tiles in the [pipeline] section of config.ini.");
            }
            CliError::Pipeline(PipelineError::Aborted { .. }) => {
                eprintln!();
                eprintln!("Check that the AIRAC cycle is published upstream, or set");
                eprintln!("abort_on_failure = false to keep a degraded archive.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::Region(e) => write!(f, "{}", e),
            CliError::Airac(e) => write!(f, "{}", e),
            CliError::Provider(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Pipeline(e) => write!(f, "{}", e),
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Region(e) => Some(e),
            CliError::Airac(e) => Some(e),
            CliError::Provider(e) => Some(e),
            CliError::Pipeline(e) => Some(e),
            CliError::Output(e) => Some(e),
            CliError::Usage(_) | CliError::Runtime(_) => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<RegionError> for CliError {
    fn from(e: RegionError) -> Self {
        CliError::Region(e)
    }
}

impl From<AiracError> for CliError {
    fn from(e: AiracError) -> Self {
        CliError::Airac(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Provider(e)
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Output(e)
    }
}
