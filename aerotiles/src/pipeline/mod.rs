//! Region to archive pipeline
//!
//! [`Pipeline::run_pipeline`] is the single entry point for one region:
//!
//! ```text
//! count ──► open archive ──► per zoom: enumerate ──► FetchPool ──► mpsc ──► batch writer
//!                                                                             │
//!                                          close (Summary) or discard ◄───────┘
//! ```
//!
//! Tile failures are counted, not fatal. A run whose failure ratio exceeds
//! the threshold is marked degraded, or aborted when configured to.

mod config;
mod error;
mod orchestrator;
mod summary;

pub use config::{
    PipelineConfig, DEFAULT_BATCH_SIZE, DEFAULT_FAILURE_THRESHOLD, DEFAULT_MAX_TILES,
    DEFAULT_OUTPUT_DIR, DEFAULT_PARALLEL_DOWNLOADS, DEFAULT_QUEUE_DEPTH,
};
pub use error::PipelineError;
pub use orchestrator::{Pipeline, ProgressCallback};
pub use summary::{BatchReport, Summary};
