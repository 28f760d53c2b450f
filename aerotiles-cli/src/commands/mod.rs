//! CLI command implementations.
//!
//! - [`airac`] - AIRAC cycle queries (current, is-start, future)
//! - [`build`] - Archive generation for one region or a region list
//! - [`regions`] - Region list inspection

pub mod airac;
pub mod build;
pub mod regions;
