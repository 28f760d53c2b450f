//! Regions: a named bounding box plus a zoom range.
//!
//! A [`Region`] is validated once at construction and immutable afterwards.
//! Region lists are read from a JSON file shaped like:
//!
//! ```json
//! [
//!   { "oaci_prefix": "LS", "bbox": [5.96, 45.82, 10.49, 47.81], "zoom": [7, 12] }
//! ]
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::coord::{LON_LIMIT, MAX_ZOOM};

/// Geographic latitude limits accepted in region definitions.
///
/// Projection clamps further to the Web Mercator limit.
const GEO_MIN_LAT: f64 = -90.0;
const GEO_MAX_LAT: f64 = 90.0;

/// Errors raised while building or loading regions.
#[derive(Debug, Error)]
pub enum RegionError {
    /// The region definition violates a bounding box or zoom invariant.
    #[error("Invalid region '{id}': {reason}")]
    InvalidRegion { id: String, reason: String },

    /// Failed to read the region list file.
    #[error("Failed to read region list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The region list is not valid JSON or has the wrong shape.
    #[error("Failed to parse region list {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A `prefix:bbox:zoom` descriptor could not be parsed.
    #[error("Invalid region descriptor '{0}'")]
    InvalidDescriptor(String),
}

/// Bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Builds a bounding box from `[min_lon, min_lat, max_lon, max_lat]`.
    pub fn from_array(values: [f64; 4]) -> Self {
        Self {
            min_lon: values[0],
            min_lat: values[1],
            max_lon: values[2],
            max_lat: values[3],
        }
    }

    /// Returns `[min_lon, min_lat, max_lon, max_lat]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// Inclusive zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    pub min: u8,
    pub max: u8,
}

impl ZoomRange {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// Iterates the zoom levels in ascending order.
    pub fn iter(&self) -> RangeInclusive<u8> {
        self.min..=self.max
    }
}

/// A named rectangular area to be turned into one archive.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    id: String,
    bbox: BoundingBox,
    zoom: ZoomRange,
}

impl Region {
    /// Creates a validated region.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::InvalidRegion`] when the bounding box is not
    /// finite, is out of geographic range, is inverted (including
    /// antimeridian-crossing boxes with `min_lon > max_lon`), or when the zoom
    /// range is inverted or exceeds the supported maximum.
    pub fn new(
        id: impl Into<String>,
        bbox: BoundingBox,
        zoom: ZoomRange,
    ) -> Result<Self, RegionError> {
        let id = id.into();
        let invalid = |reason: String| RegionError::InvalidRegion {
            id: id.clone(),
            reason,
        };

        if id.trim().is_empty() {
            return Err(invalid("identifier is empty".to_string()));
        }
        if bbox.to_array().iter().any(|v| !v.is_finite()) {
            return Err(invalid(format!("bbox [{}] is not finite", bbox)));
        }
        for lon in [bbox.min_lon, bbox.max_lon] {
            if lon.abs() > LON_LIMIT {
                return Err(invalid(format!(
                    "longitude {} outside [-{}, {}]",
                    lon, LON_LIMIT, LON_LIMIT
                )));
            }
        }
        for lat in [bbox.min_lat, bbox.max_lat] {
            if !(GEO_MIN_LAT..=GEO_MAX_LAT).contains(&lat) {
                return Err(invalid(format!(
                    "latitude {} outside [{}, {}]",
                    lat, GEO_MIN_LAT, GEO_MAX_LAT
                )));
            }
        }
        if bbox.min_lon > bbox.max_lon {
            return Err(invalid(format!(
                "min_lon {} > max_lon {} (antimeridian crossing is not supported)",
                bbox.min_lon, bbox.max_lon
            )));
        }
        if bbox.min_lat > bbox.max_lat {
            return Err(invalid(format!(
                "min_lat {} > max_lat {}",
                bbox.min_lat, bbox.max_lat
            )));
        }
        if zoom.min > zoom.max {
            return Err(invalid(format!(
                "min_zoom {} > max_zoom {}",
                zoom.min, zoom.max
            )));
        }
        if zoom.max > MAX_ZOOM {
            return Err(invalid(format!(
                "max_zoom {} exceeds {}",
                zoom.max, MAX_ZOOM
            )));
        }

        Ok(Self { id, bbox, zoom })
    }

    /// Region identifier (OACI prefix).
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn zoom(&self) -> ZoomRange {
        self.zoom
    }

    /// Zoom levels of the region, lowest first.
    pub fn zooms(&self) -> RangeInclusive<u8> {
        self.zoom.iter()
    }

    /// Formats the region as `prefix:min_lon,min_lat,max_lon,max_lat:min,max`.
    pub fn descriptor(&self) -> String {
        format!(
            "{}:{}:{},{}",
            self.id, self.bbox, self.zoom.min, self.zoom.max
        )
    }

    /// Parses a `prefix:bbox:zoom` descriptor produced by [`Region::descriptor`].
    pub fn parse_descriptor(s: &str) -> Result<Self, RegionError> {
        let bad = || RegionError::InvalidDescriptor(s.to_string());

        let mut parts = s.trim().split(':');
        let (prefix, bbox, zoom) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(b), Some(z), None) => (p, b, z),
            _ => return Err(bad()),
        };

        let bbox: Vec<f64> = bbox
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| bad())?;
        let zoom: Vec<u8> = zoom
            .split(',')
            .map(|v| v.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|_| bad())?;

        let bbox: [f64; 4] = bbox.try_into().map_err(|_| bad())?;
        let zoom: [u8; 2] = zoom.try_into().map_err(|_| bad())?;

        Region::new(
            prefix,
            BoundingBox::from_array(bbox),
            ZoomRange::new(zoom[0], zoom[1]),
        )
    }
}

/// One record of the JSON region list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionEntry {
    pub oaci_prefix: String,
    pub bbox: [f64; 4],
    pub zoom: [u8; 2],
}

impl TryFrom<RegionEntry> for Region {
    type Error = RegionError;

    fn try_from(entry: RegionEntry) -> Result<Self, Self::Error> {
        Region::new(
            entry.oaci_prefix,
            BoundingBox::from_array(entry.bbox),
            ZoomRange::new(entry.zoom[0], entry.zoom[1]),
        )
    }
}

impl From<&Region> for RegionEntry {
    fn from(region: &Region) -> Self {
        Self {
            oaci_prefix: region.id.clone(),
            bbox: region.bbox.to_array(),
            zoom: [region.zoom.min, region.zoom.max],
        }
    }
}

/// Parses a JSON region list, preserving order.
pub fn parse_regions(json: &str) -> Result<Vec<Region>, serde_json::Error> {
    let entries: Vec<RegionEntry> = serde_json::from_str(json)?;
    // Validation errors are reported through serde so callers see one error type.
    entries
        .into_iter()
        .map(|entry| {
            Region::try_from(entry).map_err(<serde_json::Error as serde::de::Error>::custom)
        })
        .collect()
}

/// Loads and validates the region list at `path`.
pub fn load_regions(path: &Path) -> Result<Vec<Region>, RegionError> {
    let content = std::fs::read_to_string(path).map_err(|source| RegionError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let entries: Vec<RegionEntry> =
        serde_json::from_str(&content).map_err(|source| RegionError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let regions = entries
        .into_iter()
        .map(Region::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    for region in &regions {
        debug!(region = %region.descriptor(), "Loaded region");
    }

    Ok(regions)
}

/// Sorted, de-duplicated region identifiers joined with `", "`.
pub fn region_names(regions: &[Region]) -> String {
    let names: BTreeSet<&str> = regions.iter().map(Region::id).collect();
    names.into_iter().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn swiss() -> Region {
        Region::new(
            "LS",
            BoundingBox::from_array([5.96, 45.82, 10.49, 47.81]),
            ZoomRange::new(7, 12),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_region() {
        let region = swiss();
        assert_eq!(region.id(), "LS");
        assert_eq!(region.zooms().collect::<Vec<_>>(), (7..=12).collect::<Vec<_>>());
    }

    #[test]
    fn test_antimeridian_box_rejected() {
        let result = Region::new(
            "NZ",
            BoundingBox::from_array([170.0, -50.0, -170.0, -30.0]),
            ZoomRange::new(5, 6),
        );
        assert!(matches!(result, Err(RegionError::InvalidRegion { .. })));
    }

    #[test]
    fn test_inverted_latitude_rejected() {
        let result = Region::new(
            "X",
            BoundingBox::from_array([0.0, 10.0, 1.0, 5.0]),
            ZoomRange::new(5, 6),
        );
        assert!(matches!(result, Err(RegionError::InvalidRegion { .. })));
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        for bbox in [
            [-181.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 181.0, 1.0],
            [0.0, -91.0, 1.0, 1.0],
            [0.0, 0.0, 1.0, f64::NAN],
        ] {
            let result = Region::new("X", BoundingBox::from_array(bbox), ZoomRange::new(1, 2));
            assert!(result.is_err(), "bbox {:?} should be rejected", bbox);
        }
    }

    #[test]
    fn test_inverted_zoom_rejected() {
        let result = Region::new(
            "X",
            BoundingBox::from_array([0.0, 0.0, 1.0, 1.0]),
            ZoomRange::new(9, 7),
        );
        assert!(matches!(result, Err(RegionError::InvalidRegion { .. })));
    }

    #[test]
    fn test_zoom_above_max_rejected() {
        let result = Region::new(
            "X",
            BoundingBox::from_array([0.0, 0.0, 1.0, 1.0]),
            ZoomRange::new(7, MAX_ZOOM + 1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_descriptor_roundtrip() {
        let region = swiss();
        assert_eq!(region.descriptor(), "LS:5.96,45.82,10.49,47.81:7,12");
        assert_eq!(Region::parse_descriptor(&region.descriptor()).unwrap(), region);
    }

    #[test]
    fn test_parse_descriptor_rejects_garbage() {
        assert!(Region::parse_descriptor("LS:1,2,3:7,12").is_err());
        assert!(Region::parse_descriptor("LS").is_err());
        assert!(Region::parse_descriptor("LS:1,2,3,4:7,x").is_err());
    }

    #[test]
    fn test_load_regions_preserves_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"oaci_prefix": "LS", "bbox": [5.96, 45.82, 10.49, 47.81], "zoom": [7, 12]}},
                {{"oaci_prefix": "ED", "bbox": [5.8, 47.2, 15.1, 55.1], "zoom": [7, 11]}},
                {{"oaci_prefix": "LF", "bbox": [-5.2, 41.3, 9.6, 51.1], "zoom": [7, 11]}}
            ]"#
        )
        .unwrap();

        let regions = load_regions(file.path()).unwrap();
        let ids: Vec<_> = regions.iter().map(Region::id).collect();
        assert_eq!(ids, vec!["LS", "ED", "LF"]);
        assert_eq!(region_names(&regions), "ED, LF, LS");
    }

    #[test]
    fn test_load_regions_reports_invalid_entry() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"oaci_prefix": "LS", "bbox": [10.0, 45.0, 5.0, 47.0], "zoom": [7, 12]}}]"#
        )
        .unwrap();

        assert!(matches!(
            load_regions(file.path()),
            Err(RegionError::InvalidRegion { .. })
        ));
    }

    #[test]
    fn test_load_regions_missing_file() {
        let result = load_regions(Path::new("/nonexistent/regions.json"));
        assert!(matches!(result, Err(RegionError::Io { .. })));
    }

    #[test]
    fn test_parse_regions_from_str() {
        let regions =
            parse_regions(r#"[{"oaci_prefix": "EB", "bbox": [2.5, 49.5, 6.4, 51.5], "zoom": [8, 8]}]"#)
                .unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(RegionEntry::from(&regions[0]).zoom, [8, 8]);
    }

    #[test]
    fn test_region_names_deduplicates() {
        let a = swiss();
        let b = swiss();
        assert_eq!(region_names(&[a, b]), "LS");
    }
}
