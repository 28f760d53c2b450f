//! Web Mercator tile math
//!
//! Maps geographic points onto the XYZ tile grid and lists the tiles a
//! region covers at each of its zoom levels. Everything here works in the
//! north-up row convention; [`TileCoord::tms_row`] converts at the archive
//! boundary.

mod types;

pub use types::{grid_size, CoordError, TileCoord, LON_LIMIT, MAX_ZOOM, MERCATOR_LAT_LIMIT};

use std::f64::consts::PI;

use crate::region::Region;

/// Fractional grid position `(x, y)` of a point at `zoom`.
///
/// Latitude is clamped to [`MERCATOR_LAT_LIMIT`] first. The result is not
/// clamped to the grid; `y` grows southwards.
#[inline]
pub fn project(lat: f64, lon: f64, zoom: u8) -> (f64, f64) {
    let side = grid_size(zoom) as f64;
    let phi = lat.clamp(-MERCATOR_LAT_LIMIT, MERCATOR_LAT_LIMIT).to_radians();

    let x = side * (lon + 180.0) / 360.0;
    let y = side * (1.0 - phi.tan().asinh() / PI) / 2.0;
    (x, y)
}

#[inline]
fn cell(position: f64, zoom: u8) -> u32 {
    let last = (grid_size(zoom) - 1) as f64;
    position.floor().clamp(0.0, last) as u32
}

/// Tile containing the point `(lat, lon)` at `zoom`.
///
/// Points on the east edge or the bottom edge land in the last column or
/// row.
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(lat.abs() <= MERCATOR_LAT_LIMIT) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(lon.abs() <= LON_LIMIT) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let (x, y) = project(lat, lon, zoom);
    Ok(TileCoord {
        zoom,
        col: cell(x, zoom),
        row: cell(y, zoom),
    })
}

/// North-west corner of `tile` as `(lat, lon)`.
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    let side = grid_size(tile.zoom) as f64;
    let lon = 360.0 * f64::from(tile.col) / side - 180.0;
    let lat = (PI * (1.0 - 2.0 * f64::from(tile.row) / side))
        .sinh()
        .atan()
        .to_degrees();
    (lat, lon)
}

/// Tiles whose footprint meets the region's bounding box at `zoom`.
///
/// The north-west corner gives the first column and row, the south-east
/// corner the last, both floored and clamped onto the grid. A box that
/// collapses to a point still covers one tile.
pub fn enumerate(region: &Region, zoom: u8) -> Result<TileRange, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let bbox = region.bbox();
    let (west, north) = project(bbox.max_lat, bbox.min_lon, zoom);
    let (east, south) = project(bbox.min_lat, bbox.max_lon, zoom);

    Ok(TileRange {
        zoom,
        cols: (cell(west, zoom), cell(east, zoom)),
        rows: (cell(north, zoom), cell(south, zoom)),
        cursor: 0,
    })
}

/// All of the region's tiles, lowest zoom first.
pub fn enumerate_region(region: &Region) -> impl Iterator<Item = TileCoord> + '_ {
    region
        .zooms()
        .filter_map(move |zoom| enumerate(region, zoom).ok())
        .flatten()
}

/// Number of tiles [`enumerate_region`] would yield, computed from the
/// range bounds alone.
pub fn count_region(region: &Region) -> u64 {
    region
        .zooms()
        .filter_map(|zoom| enumerate(region, zoom).ok())
        .map(|range| range.tile_count())
        .sum()
}

/// Rectangle of tiles at one zoom, iterated row by row from the north.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRange {
    zoom: u8,
    cols: (u32, u32),
    rows: (u32, u32),
    cursor: u64,
}

impl TileRange {
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// First and last column, inclusive.
    pub fn cols(&self) -> (u32, u32) {
        self.cols
    }

    /// First and last north-up row, inclusive.
    pub fn rows(&self) -> (u32, u32) {
        self.rows
    }

    fn width(&self) -> u64 {
        u64::from(self.cols.1 - self.cols.0) + 1
    }

    fn height(&self) -> u64 {
        u64::from(self.rows.1 - self.rows.0) + 1
    }

    /// Size of the whole rectangle, however far iteration has advanced.
    pub fn tile_count(&self) -> u64 {
        self.width() * self.height()
    }
}

impl Iterator for TileRange {
    type Item = TileCoord;

    fn next(&mut self) -> Option<TileCoord> {
        if self.cursor == self.tile_count() {
            return None;
        }
        let width = self.width();
        let tile = TileCoord {
            zoom: self.zoom,
            col: self.cols.0 + (self.cursor % width) as u32,
            row: self.rows.0 + (self.cursor / width) as u32,
        };
        self.cursor += 1;
        Some(tile)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.tile_count() - self.cursor) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for TileRange {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{BoundingBox, ZoomRange};

    const SWITZERLAND: [f64; 4] = [5.96, 45.82, 10.49, 47.81];

    fn region(bbox: [f64; 4], min_zoom: u8, max_zoom: u8) -> Region {
        Region::new(
            "LS",
            BoundingBox::from_array(bbox),
            ZoomRange::new(min_zoom, max_zoom),
        )
        .unwrap()
    }

    #[test]
    fn test_quadrants_at_zoom_one() {
        let tile = |lat, lon| {
            let t = to_tile_coords(lat, lon, 1).unwrap();
            (t.col, t.row)
        };
        assert_eq!(tile(10.0, -10.0), (0, 0));
        assert_eq!(tile(10.0, 10.0), (1, 0));
        assert_eq!(tile(-10.0, -10.0), (0, 1));
        // the origin sits on both split lines and floors east/south
        assert_eq!(tile(0.0, 0.0), (1, 1));
    }

    #[test]
    fn test_zurich_inside_swiss_range() {
        let zurich = to_tile_coords(47.37, 8.54, 7).unwrap();
        assert_eq!(zurich, TileCoord::new(7, 67, 44).unwrap());
    }

    #[test]
    fn test_rejects_out_of_range_input() {
        assert_eq!(
            to_tile_coords(86.0, 0.0, 3),
            Err(CoordError::InvalidLatitude(86.0))
        );
        assert!(matches!(
            to_tile_coords(0.0, f64::NAN, 3),
            Err(CoordError::InvalidLongitude(_))
        ));
        assert_eq!(to_tile_coords(0.0, 0.0, 23), Err(CoordError::InvalidZoom(23)));
    }

    #[test]
    fn test_antimeridian_east_edge_stays_on_grid() {
        assert_eq!(to_tile_coords(0.0, 180.0, 3).unwrap().col, 7);
    }

    #[test]
    fn test_corner_of_origin_tile() {
        let (lat, lon) = tile_to_lat_lon(&TileCoord::new(4, 0, 0).unwrap());
        assert_eq!(lon, -180.0);
        assert!((lat - MERCATOR_LAT_LIMIT).abs() < 1e-3);

        let (lat, lon) = tile_to_lat_lon(&TileCoord::new(1, 1, 1).unwrap());
        assert!(lat.abs() < 1e-12);
        assert_eq!(lon, 0.0);
    }

    #[test]
    fn test_tms_row_flips_grid() {
        assert_eq!(TileCoord::new(3, 2, 0).unwrap().tms_row(), 7);
        assert_eq!(TileCoord::new(7, 66, 44).unwrap().tms_row(), 83);
        assert_eq!(TileCoord::new(0, 0, 0).unwrap().tms_row(), 0);
    }

    #[test]
    fn test_checked_constructor() {
        assert_eq!(
            TileCoord::new(2, 4, 0),
            Err(CoordError::OutOfGrid {
                zoom: 2,
                col: 4,
                row: 0
            })
        );
        assert_eq!(TileCoord::new(23, 0, 0), Err(CoordError::InvalidZoom(23)));
        assert_eq!(
            CoordError::OutOfGrid {
                zoom: 2,
                col: 4,
                row: 0
            }
            .to_string(),
            "tile 2/4/0 is off the grid"
        );
    }

    #[test]
    fn test_switzerland_zoom_7() {
        let range = enumerate(&region(SWITZERLAND, 7, 7), 7).unwrap();
        assert_eq!(range.cols(), (66, 67));
        assert_eq!(range.rows(), (44, 45));

        let order: Vec<_> = range.map(|t| (t.col, t.row)).collect();
        assert_eq!(order, vec![(66, 44), (67, 44), (66, 45), (67, 45)]);
    }

    #[test]
    fn test_switzerland_counts_per_zoom() {
        let swiss = region(SWITZERLAND, 7, 8);
        let z8 = enumerate(&swiss, 8).unwrap();
        assert_eq!((z8.cols(), z8.rows()), ((132, 135), (89, 91)));
        assert_eq!(z8.tile_count(), 12);
        assert_eq!(count_region(&swiss), 16);
        assert_eq!(enumerate_region(&swiss).count(), 16);
    }

    #[test]
    fn test_point_box_covers_one_tile() {
        let point = region([8.5, 47.3, 8.5, 47.3], 0, 12);
        assert!((0..=12).all(|z| enumerate(&point, z).unwrap().len() == 1));
        assert_eq!(count_region(&point), 13);
    }

    #[test]
    fn test_whole_world_is_whole_grid() {
        let range = enumerate(&region([-180.0, -90.0, 180.0, 90.0], 2, 2), 2).unwrap();
        assert_eq!((range.cols(), range.rows()), ((0, 3), (0, 3)));
    }

    #[test]
    fn test_region_tiles_ascend_by_zoom() {
        let zooms: Vec<u8> = enumerate_region(&region(SWITZERLAND, 5, 8))
            .map(|t| t.zoom)
            .collect();
        assert!(zooms.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!((zooms[0], zooms[zooms.len() - 1]), (5, 8));
    }

    #[test]
    fn test_len_shrinks_while_count_does_not() {
        let mut range = enumerate(&region(SWITZERLAND, 8, 8), 8).unwrap();
        range.nth(1);
        assert_eq!(range.len(), 10);
        assert_eq!(range.tile_count(), 12);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn tile_encloses_its_point(
                lat in -85.0..85.0_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=18
            ) {
                let tile = to_tile_coords(lat, lon, zoom)?;
                let (north, west) = tile_to_lat_lon(&tile);
                let (south, east) = tile_to_lat_lon(&TileCoord {
                    zoom,
                    col: tile.col + 1,
                    row: tile.row + 1,
                });
                prop_assert!(west <= lon + 1e-9 && lon <= east + 1e-9);
                prop_assert!(south <= lat + 1e-9 && lat <= north + 1e-9);
            }

            #[test]
            fn count_is_width_times_height(
                west in -179.0..179.0_f64,
                width in 0.0..20.0_f64,
                south in -80.0..70.0_f64,
                height in 0.0..10.0_f64,
                zoom in 0u8..=12
            ) {
                let east = (west + width).min(180.0);
                let north = south + height;
                let range = enumerate(&region([west, south, east, north], zoom, zoom), zoom)?;

                let first = to_tile_coords(north, west, zoom)?;
                let last = to_tile_coords(south, east, zoom)?;
                let expected = u64::from(last.col - first.col + 1)
                    * u64::from(last.row - first.row + 1);

                prop_assert_eq!(range.tile_count(), expected);
                prop_assert_eq!(range.count() as u64, expected);
            }

            #[test]
            fn enumerated_tiles_are_distinct_and_valid(
                west in -179.0..170.0_f64,
                width in 0.0..5.0_f64,
                south in -60.0..60.0_f64,
                height in 0.0..5.0_f64,
                zoom in 0u8..=10
            ) {
                let r = region([west, south, west + width, south + height], zoom, zoom);
                let tiles: Vec<_> = enumerate(&r, zoom)?.collect();
                let distinct: std::collections::HashSet<_> = tiles.iter().collect();
                prop_assert!(!tiles.is_empty());
                prop_assert_eq!(distinct.len(), tiles.len());
                for t in &tiles {
                    prop_assert!(TileCoord::new(t.zoom, t.col, t.row).is_ok());
                }
            }

            #[test]
            fn tms_flip_twice_is_identity(row in 0u32..65536, zoom in 0u8..=16) {
                let row = row % (1u32 << zoom);
                let flipped = TileCoord::new(zoom, 0, row)?.tms_row();
                prop_assert_eq!(TileCoord::new(zoom, 0, flipped)?.tms_row(), row);
            }
        }
    }
}
