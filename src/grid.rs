/*!
 * Uniform grid construction over a field's extent.
 *
 * This is a standalone primitive meant to feed a future spatial aggregation step: it tiles the
 * axis aligned extent of a field (or the whole field set) with square cells of a configured side
 * length. Cells are not clipped to the field polygon, the tiling covers the full bounding
 * rectangle and the last row and column may extend past it.
 */

use crate::geo::{BoundingBox, Coord};

/// One square tile of the grid, held as its four corner vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    /// The corners in order: origin, across from origin, across and below, below. The cell
    /// extends in +x (latitude) and -y (longitude) from its origin, so the origin is the cell's
    /// top left when rows are iterated top first.
    pub corners: [Coord; 4],
}

impl GridCell {
    fn new(x: f64, y: f64, size: f64) -> Self {
        GridCell {
            corners: [
                Coord { lat: x, lon: y },
                Coord {
                    lat: x + size,
                    lon: y,
                },
                Coord {
                    lat: x + size,
                    lon: y - size,
                },
                Coord {
                    lat: x,
                    lon: y - size,
                },
            ],
        }
    }
}

/**
 * Tile the bounding box with square cells.
 *
 * #Arguments
 * bbox - the extent to tile, x being latitude and y longitude as everywhere in this crate.
 * cell_size - the side length of each square cell, in degrees.
 *
 * #Returns
 * The cells in row major order, top row (largest y) first, columns ascending within a row. The
 * ordering is part of the contract, downstream presentation relies on it.
 *
 * Column origins start at floor(xmin) and step by `cell_size` for as long as they are below
 * ceil(xmax); each cell extends rightward from its column origin. Row origins start one step
 * above floor(ymin) and step upward until a row at or above ceil(ymax) has been produced; each
 * cell extends downward from its row origin. The outermost row and column may overhang the box,
 * nothing is trimmed.
 *
 * This is a total function: a degenerate box or a non-positive or non-finite cell size produces
 * an empty grid rather than an error.
 */
pub fn build_grid(bbox: BoundingBox, cell_size: f64) -> Vec<GridCell> {
    if !(cell_size > 0.0) || !cell_size.is_finite() {
        return Vec::new();
    }

    if !bbox.ll.is_finite() || !bbox.ur.is_finite() {
        return Vec::new();
    }

    let x_start = bbox.ll.lat.floor();
    let x_stop = bbox.ur.lat.ceil();
    let y_start = bbox.ll.lon.floor();
    let y_stop = bbox.ur.lon.ceil();

    let mut columns = Vec::new();
    let mut x = x_start;
    while x < x_stop {
        columns.push(x);
        x += cell_size;
    }

    let mut rows = Vec::new();
    let mut y = y_start;
    while y < y_stop {
        y += cell_size;
        rows.push(y);
    }
    // Top row first.
    rows.reverse();

    let mut cells = Vec::with_capacity(rows.len() * columns.len());
    for &y in &rows {
        for &x in &columns {
            cells.push(GridCell::new(x, y, cell_size));
        }
    }

    cells
}
