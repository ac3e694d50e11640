//! Uniform lat/lon grid used as the search space for both planners.

use crate::models::{Coordinate, GeoBounds, GridCell};
use serde::{Deserialize, Serialize};

/// Default cell size, roughly 500 m at Chennai's latitude.
pub const DEFAULT_CELL_SIZE_DEG: f64 = 0.005;

/// Moore neighbourhood offsets in fixed order: NW, N, NE, W, E, SW, S, SE.
///
/// Rows grow northwards, so "north" is `+1` row.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (1, -1),
    (1, 0),
    (1, 1),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Maps coordinates inside [`GeoBounds`] to grid cells and back.
///
/// The representative point of a cell is its geometric centre, in both
/// directions, so `to_cell(to_coordinate(c)) == c` for every cell.
///
/// Serialized as bounds plus cell size; row and column counts are always
/// recomputed, never read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GridSpec", into = "GridSpec")]
pub struct GridIndex {
    bounds: GeoBounds,
    cell_size_deg: f64,
    rows: usize,
    cols: usize,
}

impl GridIndex {
    /// Build a grid over `bounds`. A non-positive or non-finite cell size
    /// falls back to [`DEFAULT_CELL_SIZE_DEG`].
    pub fn new(bounds: GeoBounds, cell_size_deg: f64) -> Self {
        let cell_size_deg = if cell_size_deg.is_finite() && cell_size_deg > 0.0 {
            cell_size_deg
        } else {
            DEFAULT_CELL_SIZE_DEG
        };
        let rows = cell_count(bounds.max_lat - bounds.min_lat, cell_size_deg);
        let cols = cell_count(bounds.max_lon - bounds.min_lon, cell_size_deg);
        Self {
            bounds,
            cell_size_deg,
            rows,
            cols,
        }
    }

    pub fn bounds(&self) -> &GeoBounds {
        &self.bounds
    }

    pub fn cell_size_deg(&self) -> f64 {
        self.cell_size_deg
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Snap a coordinate to its cell; out-of-bounds coordinates are clamped.
    pub fn to_cell(&self, coord: &Coordinate) -> GridCell {
        GridCell {
            row: clamp_index(
                (coord.lat - self.bounds.min_lat) / self.cell_size_deg,
                self.rows,
            ),
            col: clamp_index(
                (coord.lon - self.bounds.min_lon) / self.cell_size_deg,
                self.cols,
            ),
        }
    }

    /// Centre of `cell`.
    pub fn to_coordinate(&self, cell: &GridCell) -> Coordinate {
        Coordinate {
            lat: self.bounds.min_lat + (cell.row as f64 + 0.5) * self.cell_size_deg,
            lon: self.bounds.min_lon + (cell.col as f64 + 0.5) * self.cell_size_deg,
        }
    }

    /// In-bounds Moore neighbours in NW, N, NE, W, E, SW, S, SE order.
    pub fn neighbors(&self, cell: &GridCell) -> impl Iterator<Item = GridCell> + '_ {
        let row = cell.row as isize;
        let col = cell.col as isize;
        NEIGHBOR_OFFSETS.iter().filter_map(move |(dr, dc)| {
            let r = row + dr;
            let c = col + dc;
            if r < 0 || c < 0 || r as usize >= self.rows || c as usize >= self.cols {
                return None;
            }
            Some(GridCell {
                row: r as usize,
                col: c as usize,
            })
        })
    }

    /// Dense index for per-cell tables (`row * cols + col`).
    pub fn flat_index(&self, cell: &GridCell) -> usize {
        cell.row * self.cols + cell.col
    }

    pub fn cell_at(&self, index: usize) -> GridCell {
        GridCell {
            row: index / self.cols,
            col: index % self.cols,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GridSpec {
    bounds: GeoBounds,
    #[serde(default = "default_cell_size")]
    cell_size_deg: f64,
}

fn default_cell_size() -> f64 {
    DEFAULT_CELL_SIZE_DEG
}

impl From<GridSpec> for GridIndex {
    fn from(spec: GridSpec) -> Self {
        GridIndex::new(spec.bounds, spec.cell_size_deg)
    }
}

impl From<GridIndex> for GridSpec {
    fn from(grid: GridIndex) -> Self {
        GridSpec {
            bounds: grid.bounds,
            cell_size_deg: grid.cell_size_deg,
        }
    }
}

impl Default for GridIndex {
    fn default() -> Self {
        Self::new(GeoBounds::CHENNAI, DEFAULT_CELL_SIZE_DEG)
    }
}

fn cell_count(span_deg: f64, cell_size_deg: f64) -> usize {
    // Absorb representation error so an exact multiple does not add a sliver row.
    let cells = (span_deg / cell_size_deg - 1e-9).ceil();
    if cells.is_finite() && cells >= 1.0 {
        cells as usize
    } else {
        1
    }
}

fn clamp_index(value: f64, len: usize) -> usize {
    let max = len.saturating_sub(1);
    let idx = value.floor();
    if idx.is_nan() || idx <= 0.0 {
        return 0;
    }
    (idx as usize).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn chennai_grid_dimensions() {
        let grid = GridIndex::default();
        assert_eq!(grid.rows(), 60);
        assert_eq!(grid.cols(), 44);
    }

    #[test]
    fn deserialized_grid_recomputes_dimensions() {
        let text = r#"{
            "bounds": {"min_lat": 12.9, "max_lat": 13.2, "min_lon": 80.1, "max_lon": 80.32},
            "cell_size_deg": 0.005,
            "rows": 0,
            "cols": 0
        }"#;
        let grid: GridIndex = serde_json::from_str(text).unwrap();
        assert_eq!(grid, GridIndex::default());
        assert_eq!(grid.cell_at(0), GridCell { row: 0, col: 0 });
        let corner = grid.to_cell(&Coordinate::new(13.5, 80.5));
        assert_eq!(corner, GridCell { row: 59, col: 43 });

        let bad_size = r#"{"bounds": {"min_lat": 12.9, "max_lat": 13.2, "min_lon": 80.1, "max_lon": 80.32}, "cell_size_deg": 0.0}"#;
        let grid: GridIndex = serde_json::from_str(bad_size).unwrap();
        assert_eq!(grid.cell_size_deg(), DEFAULT_CELL_SIZE_DEG);
        assert!(grid.rows() > 0 && grid.cols() > 0);

        let json = serde_json::to_value(&grid).unwrap();
        assert!(json.get("rows").is_none());
    }

    #[test]
    fn to_cell_floors_relative_offset() {
        let grid = GridIndex::default();
        let cell = grid.to_cell(&Coordinate::new(13.0827, 80.2707));
        assert_eq!(cell, GridCell { row: 36, col: 34 });
    }

    #[test]
    fn out_of_bounds_coordinates_clamp() {
        let grid = GridIndex::default();
        assert_eq!(
            grid.to_cell(&Coordinate::new(0.0, 0.0)),
            GridCell { row: 0, col: 0 }
        );
        assert_eq!(
            grid.to_cell(&Coordinate::new(45.0, 120.0)),
            GridCell { row: 59, col: 43 }
        );
        assert_eq!(
            grid.to_cell(&Coordinate::new(f64::NAN, 80.2)).row,
            0,
            "NaN must still land on a valid row"
        );
    }

    #[test]
    fn round_trip_stays_within_one_cell() {
        let grid = GridIndex::default();
        let bounds = *grid.bounds();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let coord = Coordinate::new(
                rng.random_range(bounds.min_lat..bounds.max_lat),
                rng.random_range(bounds.min_lon..bounds.max_lon),
            );
            let snapped = grid.to_coordinate(&grid.to_cell(&coord));
            assert!((snapped.lat - coord.lat).abs() <= grid.cell_size_deg());
            assert!((snapped.lon - coord.lon).abs() <= grid.cell_size_deg());
        }
    }

    #[test]
    fn cell_centre_maps_back_to_same_cell() {
        let grid = GridIndex::default();
        for index in [0, 1, 43, 44, 1000, grid.cell_count() - 1] {
            let cell = grid.cell_at(index);
            assert_eq!(grid.to_cell(&grid.to_coordinate(&cell)), cell);
            assert_eq!(grid.flat_index(&cell), index);
        }
    }

    #[test]
    fn interior_cell_has_eight_neighbors_in_fixed_order() {
        let grid = GridIndex::default();
        let cell = GridCell { row: 10, col: 10 };
        let neighbors: Vec<GridCell> = grid.neighbors(&cell).collect();
        assert_eq!(
            neighbors,
            vec![
                GridCell { row: 11, col: 9 },
                GridCell { row: 11, col: 10 },
                GridCell { row: 11, col: 11 },
                GridCell { row: 10, col: 9 },
                GridCell { row: 10, col: 11 },
                GridCell { row: 9, col: 9 },
                GridCell { row: 9, col: 10 },
                GridCell { row: 9, col: 11 },
            ]
        );
    }

    #[test]
    fn corner_cell_has_three_neighbors() {
        let grid = GridIndex::default();
        assert_eq!(grid.neighbors(&GridCell { row: 0, col: 0 }).count(), 3);
        let last = GridCell {
            row: grid.rows() - 1,
            col: grid.cols() - 1,
        };
        assert_eq!(grid.neighbors(&last).count(), 3);
    }

    #[test]
    fn invalid_cell_size_falls_back_to_default() {
        let grid = GridIndex::new(GeoBounds::CHENNAI, 0.0);
        assert_eq!(grid.cell_size_deg(), DEFAULT_CELL_SIZE_DEG);
    }
}
