//! Grid packing of points that share a leaf.
//!
//! Points fill a fixed-width grid row-major in arrival order. The grid is centered on
//! the leaf position and grows downwards as rows are added.

use crate::domain::entities::Position;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub columns: usize,
    /// Edge length of one grid cell (equals the point size)
    pub cell_size: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            cell_size: 20.0,
        }
    }
}

/// Offset of the `index`-th arrival (0-based) when the leaf holds `count` points.
///
/// Depends only on the occupancy at call time; callers recompute after every reset.
pub fn pack_offset(center: Position, index: usize, count: usize, grid: &GridConfig) -> Position {
    let columns = grid.columns.max(1);
    let count = count.max(index + 1);
    let cell = grid.cell_size;

    let rows = count.div_ceil(columns);
    let grid_width = columns as f64 * cell;
    let grid_height = rows as f64 * cell;
    let start_x = center.x - grid_width / 2.0 + cell / 2.0;
    let start_y = center.y - grid_height / 2.0 + cell / 2.0;

    let col = index % columns;
    let row = index / columns;
    Position::new(start_x + col as f64 * cell, start_y + row as f64 * cell)
}

/// Offsets of all `count` points of one leaf at that occupancy.
pub fn grid_offsets(center: Position, count: usize, grid: &GridConfig) -> Vec<Position> {
    (0..count)
        .map(|index| pack_offset(center, index, count, grid))
        .collect()
}
