//! AeroTiles - MBTiles archives of aeronautical charts
//!
//! This library turns a geographic bounding box and a zoom range into a
//! self-contained MBTiles archive. Tiles are enumerated with Web Mercator
//! math, fetched concurrently from an upstream tile server and written by a
//! single transactional writer. A separate module computes the 28-day AIRAC
//! calendar used to version each archive.
//!
//! # Architecture
//!
//! ```text
//! Region ──► coord::enumerate ──► fetch::FetchPool ──► mpsc ──► archive::ArchiveWriter
//!                                  (N workers)        (bounded)     (single writer)
//! ```

pub mod airac;
pub mod archive;
pub mod config;
pub mod coord;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod provider;
pub mod region;
