//! Tile addresses and grid limits

use std::fmt;

use thiserror::Error;

/// Latitude beyond which Web Mercator is undefined; also the edge of the
/// top and bottom tile rows.
pub const MERCATOR_LAT_LIMIT: f64 = 85.0511;

/// Largest absolute longitude.
pub const LON_LIMIT: f64 = 180.0;

/// Deepest zoom the tile grid supports.
pub const MAX_ZOOM: u8 = 22;

/// One tile of the XYZ grid. `row` counts from the north edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub zoom: u8,
    pub col: u32,
    pub row: u32,
}

impl TileCoord {
    /// Checked constructor.
    pub fn new(zoom: u8, col: u32, row: u32) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }
        let side = grid_size(zoom);
        if u64::from(col) >= side || u64::from(row) >= side {
            return Err(CoordError::OutOfGrid { zoom, col, row });
        }
        Ok(Self { zoom, col, row })
    }

    /// Same row counted from the south edge, as stored in MBTiles.
    #[inline]
    pub fn tms_row(&self) -> u32 {
        (grid_size(self.zoom) - 1 - u64::from(self.row)) as u32
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.col, self.row)
    }
}

/// Tiles per side of the grid at `zoom`.
#[inline]
pub fn grid_size(zoom: u8) -> u64 {
    1u64 << zoom
}

/// Rejected coordinate input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("latitude {0} outside +/-{}", MERCATOR_LAT_LIMIT)]
    InvalidLatitude(f64),
    #[error("longitude {0} outside +/-{}", LON_LIMIT)]
    InvalidLongitude(f64),
    #[error("zoom {0} above {}", MAX_ZOOM)]
    InvalidZoom(u8),
    #[error("tile {zoom}/{col}/{row} is off the grid")]
    OutOfGrid { zoom: u8, col: u32, row: u32 },
}
