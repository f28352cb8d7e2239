use glam::Vec3;
use std::str::FromStr;

/// A cell coordinate in the tile grid: `x` is the column, `z` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: usize,
    pub z: usize,
}

impl CellCoord {
    pub fn new(x: usize, z: usize) -> Self {
        Self { x, z }
    }
}

/// Errors from building a tile grid out of raw rows.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GridError {
    #[error("tile grid has no cells")]
    Empty,
    #[error("row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid tile code {token:?} at row {row}")]
    BadCode { row: usize, token: String },
}

/// Static 2D array of tile codes, stored row-major. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl TileGrid {
    /// Build from fixed-width rows. Rows of a const-sized array cannot be ragged.
    pub fn from_rows<const N: usize>(rows: &[[u8; N]]) -> Self {
        Self {
            rows: rows.len(),
            cols: N,
            cells: rows.iter().flatten().copied().collect(),
        }
    }

    /// Build from rows of arbitrary length, rejecting ragged or empty input.
    pub fn try_from_rows(rows: &[Vec<u8>]) -> Result<Self, GridError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if cols == 0 {
            return Err(GridError::Empty);
        }
        for (row, r) in rows.iter().enumerate() {
            if r.len() != cols {
                return Err(GridError::Ragged {
                    row,
                    expected: cols,
                    found: r.len(),
                });
            }
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            cells: rows.concat(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Tile code at column `x`, row `z`. Panics when out of range.
    pub fn get(&self, x: usize, z: usize) -> u8 {
        assert!(x < self.cols && z < self.rows, "cell ({x}, {z}) outside grid");
        self.cells[z * self.cols + x]
    }

    /// All cells in row-major scan order as `(x, z, code)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &code)| (i % self.cols, i / self.cols, code))
    }

    /// World-space XZ centre of a cell. The grid is centred on the origin.
    pub fn cell_center(&self, cell: CellCoord, spacing: f32) -> Vec3 {
        Vec3::new(
            (cell.x as f32 - self.cols as f32 / 2.0) * spacing,
            0.0,
            (cell.z as f32 - self.rows as f32 / 2.0) * spacing,
        )
    }

    /// World-space extent of the whole grid on X and Z.
    pub fn world_size(&self, spacing: f32) -> (f32, f32) {
        (self.cols as f32 * spacing, self.rows as f32 * spacing)
    }
}

impl FromStr for TileGrid {
    type Err = GridError;

    /// Whitespace-separated codes, one row per non-blank line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rows = Vec::new();
        for (row, line) in s.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            let parsed = line
                .split_whitespace()
                .map(|token| {
                    token.parse::<u8>().map_err(|_| GridError::BadCode {
                        row,
                        token: token.to_string(),
                    })
                })
                .collect::<Result<Vec<u8>, _>>()?;
            rows.push(parsed);
        }
        Self::try_from_rows(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_grid() {
        let grid: TileGrid = "1 1 1\n0 10 0\n".parse().unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.get(1, 1), 10);
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = "1 1 1\n0 0\n".parse::<TileGrid>().unwrap_err();
        assert_eq!(
            err,
            GridError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn empty_grid_rejected() {
        assert_eq!("".parse::<TileGrid>().unwrap_err(), GridError::Empty);
    }

    #[test]
    fn bad_code_rejected() {
        assert!(matches!(
            "1 x 1".parse::<TileGrid>(),
            Err(GridError::BadCode { row: 0, .. })
        ));
    }

    #[test]
    fn cells_iterate_in_scan_order() {
        let grid = TileGrid::from_rows(&[[1, 2], [3, 4]]);
        let codes: Vec<(usize, usize, u8)> = grid.cells().collect();
        assert_eq!(codes, vec![(0, 0, 1), (1, 0, 2), (0, 1, 3), (1, 1, 4)]);
    }

    #[test]
    fn cell_center_is_origin_relative() {
        let grid = TileGrid::from_rows(&[[0u8; 4]; 2]);
        let c = grid.cell_center(CellCoord::new(0, 0), 2.0);
        assert_eq!(c, Vec3::new(-4.0, 0.0, -2.0));
        let c = grid.cell_center(CellCoord::new(2, 1), 2.0);
        assert_eq!(c, Vec3::ZERO);
    }
}
