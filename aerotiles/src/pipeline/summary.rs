//! Per-region run outcome.

use std::fmt;
use std::path::PathBuf;

/// Result of a finalized region run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub region: String,
    pub cycle: String,
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Failure ratio exceeded the configured threshold.
    pub degraded: bool,
    pub archive: PathBuf,
}

impl Summary {
    /// Failed / attempted, 0.0 for an empty run.
    pub fn failure_ratio(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.failed as f64 / self.attempted as f64
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}/{} tiles, {} failed{} -> {}",
            self.region,
            self.cycle,
            self.succeeded,
            self.attempted,
            self.failed,
            if self.degraded { " [degraded]" } else { "" },
            self.archive.display()
        )
    }
}

/// Outcome of a multi-region run.
///
/// `summaries` holds every region finalized before `error` stopped the run.
#[derive(Debug)]
pub struct BatchReport {
    pub summaries: Vec<Summary>,
    pub error: Option<super::PipelineError>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
