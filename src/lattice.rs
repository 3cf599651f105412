//! Staggered lattice: grid cell ↔ pixel mapping and six-neighbour adjacency.
//!
//! Rows alternate a half-cell horizontal shift so that circles pack like a hex grid
//! while still being addressed with plain `(column, row)` indices. Which rows are
//! shifted depends on `row + row_offset`, where `row_offset` counts rows injected at
//! the top; injecting a row bumps both, so every existing bubble keeps its parity.

/// Pixel geometry of the lattice. Pure data; every method is a pure function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    /// Centre x of column 0 in an unshifted row.
    pub origin_x: f32,
    /// Centre y of row 0.
    pub origin_y: f32,
    pub cell_width: f32,
    pub cell_height: f32,
}

impl Lattice {
    /// Lattice for bubbles of `radius` pixels, with row 0 touching the ceiling at y = 0.
    pub fn new(radius: f32) -> Self {
        let d = radius * 2.0;
        Self {
            origin_x: radius,
            origin_y: radius,
            cell_width: d,
            cell_height: d,
        }
    }

    /// Vertical distance between row centres (8/9 of a cell, rows overlap slightly).
    #[inline]
    pub fn row_step(&self) -> f32 {
        self.cell_height - self.cell_height / 9.0
    }

    /// Width in pixels needed for `columns` cells including the half-cell stagger.
    pub fn arena_width(&self, columns: usize) -> f32 {
        columns as f32 * self.cell_width + self.cell_width / 2.0
    }

    /// Centre pixel of `(column, row)`.
    pub fn cell_to_pixel(&self, column: usize, row: usize, row_offset: u32) -> (f32, f32) {
        let mut x = self.origin_x + column as f32 * self.cell_width;
        if is_shifted(row as i32, row_offset) {
            x += self.cell_width / 2.0;
        }
        let y = row as f32 * self.row_step() + self.origin_y;
        (x, y)
    }

    /// Cell whose centre is nearest to `(x, y)`. Row is resolved first since the
    /// column depends on that row's shift. May be out of range; callers clamp.
    pub fn pixel_to_cell(&self, x: f32, y: f32, row_offset: u32) -> (i32, i32) {
        let row = ((y - self.origin_y) / self.row_step()).round() as i32;
        let shift = if is_shifted(row, row_offset) {
            self.cell_width / 2.0
        } else {
            0.0
        };
        let column = ((x - shift - self.origin_x) / self.cell_width).round() as i32;
        (column, row)
    }
}

/// True when `row` is drawn half a cell to the right.
#[inline]
pub fn is_shifted(row: i32, row_offset: u32) -> bool {
    (i64::from(row) + i64::from(row_offset)).rem_euclid(2) == 1
}

/// The six lattice neighbours of `(x, y)`: up pair, down pair, left, right.
/// Diagonals lean right on shifted rows and left otherwise.
pub fn neighbours(x: i32, y: i32, row_offset: u32) -> [(i32, i32); 6] {
    let dx = if is_shifted(y, row_offset) { 1 } else { -1 };
    [
        (x, y - 1),
        (x + dx, y - 1),
        (x, y + 1),
        (x + dx, y + 1),
        (x - 1, y),
        (x + 1, y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_cells() {
        let lattice = Lattice::new(3.0);
        for offset in 0..3u32 {
            for row in 0..20usize {
                for column in 0..12usize {
                    let (x, y) = lattice.cell_to_pixel(column, row, offset);
                    assert_eq!(
                        lattice.pixel_to_cell(x, y, offset),
                        (column as i32, row as i32),
                        "offset {offset} cell ({column}, {row})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_shifted_rows_offset_by_half_cell() {
        let lattice = Lattice::new(3.0);
        let (x0, y0) = lattice.cell_to_pixel(2, 0, 0);
        let (x1, y1) = lattice.cell_to_pixel(2, 1, 0);
        assert_eq!(x1 - x0, 3.0);
        assert!((y1 - y0 - 6.0 * 8.0 / 9.0).abs() < 1e-5);
        // bumping the offset flips which rows are shifted
        let (x0b, _) = lattice.cell_to_pixel(2, 0, 1);
        assert_eq!(x0b, x1);
    }

    #[test]
    fn test_pixel_to_cell_can_leave_range() {
        let lattice = Lattice::new(3.0);
        let (c, r) = lattice.pixel_to_cell(-20.0, -20.0, 0);
        assert!(c < 0 && r < 0);
    }

    #[test]
    fn test_neighbours_are_symmetric() {
        for offset in 0..2u32 {
            for y in 0..6 {
                for x in 0..6 {
                    for (nx, ny) in neighbours(x, y, offset) {
                        assert!(
                            neighbours(nx, ny, offset).contains(&(x, y)),
                            "({x},{y}) -> ({nx},{ny}) offset {offset}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_neighbours_are_nearly_touching() {
        let lattice = Lattice::new(3.0);
        let (cx, cy) = lattice.cell_to_pixel(3, 3, 0);
        for (nx, ny) in neighbours(3, 3, 0) {
            let (px, py) = lattice.cell_to_pixel(nx as usize, ny as usize, 0);
            let dist = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
            assert!(dist <= lattice.cell_width * 1.05, "neighbour too far: {dist}");
        }
    }
}
