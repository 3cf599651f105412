//! Bubble grid and its connectivity passes.
//!
//! Four traversals share the staggered six-neighbour adjacency:
//! colour fill (same-colour cluster + non-matching boundary), wildcard fill,
//! ceiling reachability and gravity detachment. Each pass marks `visited` on the
//! bubbles it enters and clears every mark it made before returning, so flags are
//! always false between passes. Pass results are returned by value.

use crate::entity::{Bubble, BubbleColor};
use crate::lattice::{Lattice, neighbours};
use rand::Rng;
use std::collections::VecDeque;

/// Clusters must be strictly larger than this to pop.
pub const POP_THRESHOLD: usize = 2;

/// `(column, row)`.
pub type CellPos = (usize, usize);

/// Outcome of a colour or wildcard fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fill {
    /// Cells absorbed into the cluster, in visit order.
    pub cluster: Vec<CellPos>,
    /// Occupied boundary cells that did not match; candidates for detachment.
    pub remnants: Vec<CellPos>,
    /// Size used for the pop threshold and scoring.
    pub size: usize,
}

impl Fill {
    #[inline]
    pub fn pops(&self) -> bool {
        self.size > POP_THRESHOLD
    }
}

/// Sparse grid. `rows[0]` is the ceiling row; rows are appended toward the player.
#[derive(Debug, Clone)]
pub struct Grid {
    columns: usize,
    rows: VecDeque<Vec<Option<Bubble>>>,
    /// Number of rows injected at the top so far; drives stagger parity.
    row_offset: u32,
}

impl Grid {
    pub fn new(columns: usize) -> Self {
        Self {
            columns,
            rows: VecDeque::new(),
            row_offset: 0,
        }
    }

    /// `rows` full rows of random colours.
    pub fn filled<R: Rng + ?Sized>(columns: usize, rows: usize, rng: &mut R) -> Self {
        let mut grid = Self::new(columns);
        for _ in 0..rows {
            grid.rows.push_back(Self::random_row(columns, rng));
        }
        grid
    }

    pub fn random_row<R: Rng + ?Sized>(columns: usize, rng: &mut R) -> Vec<Option<Bubble>> {
        (0..columns)
            .map(|_| Some(Bubble::new(BubbleColor::random(rng))))
            .collect()
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn row_offset(&self) -> u32 {
        self.row_offset
    }

    /// Column in range and row non-negative. Rows past `row_count` are in range but empty.
    #[inline]
    pub fn in_range(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as usize) < self.columns && y >= 0
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Bubble> {
        if !self.in_range(x, y) {
            return None;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .and_then(Option::as_ref)
    }

    fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Bubble> {
        if !self.in_range(x, y) {
            return None;
        }
        self.rows
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
            .and_then(Option::as_mut)
    }

    #[inline]
    pub fn is_occupied(&self, column: usize, row: usize) -> bool {
        self.get(column as i32, row as i32).is_some()
    }

    /// Put `bubble` into an empty cell, growing `row_count` if `row` lies beyond it.
    /// Returns false (and leaves the grid alone) if the cell is occupied or the
    /// column is out of range.
    pub fn place(&mut self, column: usize, row: usize, bubble: Bubble) -> bool {
        if column >= self.columns || self.is_occupied(column, row) {
            return false;
        }
        while self.rows.len() <= row {
            self.rows.push_back(vec![None; self.columns]);
        }
        self.rows[row][column] = Some(bubble);
        true
    }

    /// Empty the cell, returning its bubble with the visited mark cleared.
    pub fn take(&mut self, column: usize, row: usize) -> Option<Bubble> {
        let mut bubble = self.rows.get_mut(row)?.get_mut(column)?.take()?;
        bubble.visited = false;
        Some(bubble)
    }

    /// Insert a row at the top. Existing rows move one index down and the offset
    /// bump keeps their stagger unchanged.
    pub fn push_row_top(&mut self, mut row: Vec<Option<Bubble>>) {
        row.resize(self.columns, None);
        self.rows.push_front(row);
        self.row_offset = self.row_offset.wrapping_add(1);
    }

    /// Index of the lowest row holding at least one bubble.
    pub fn lowest_occupied_row(&self) -> Option<usize> {
        self.rows
            .iter()
            .rposition(|row| row.iter().any(Option::is_some))
    }

    /// Every occupied cell, row by row.
    pub fn occupied(&self) -> impl Iterator<Item = (CellPos, &Bubble)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(x, cell)| cell.as_ref().map(|b| ((x, y), b)))
        })
    }

    pub fn bubble_count(&self) -> usize {
        self.occupied().count()
    }

    /// True if any bubble still carries a visited mark (should never be observed).
    #[cfg(test)]
    pub fn any_visited(&self) -> bool {
        self.occupied().any(|(_, b)| b.visited)
    }

    /// First occupied cell whose centre lies closer than `reach` to `(x, y)`.
    pub fn first_contact(&self, lattice: &Lattice, x: f32, y: f32, reach: f32) -> Option<CellPos> {
        self.occupied().map(|(pos, _)| pos).find(|&(cx, cy)| {
            let (px, py) = lattice.cell_to_pixel(cx, cy, self.row_offset);
            let (dx, dy) = (px - x, py - y);
            (dx * dx + dy * dy).sqrt() < reach
        })
    }

    fn unmark(&mut self, marked: &[CellPos]) {
        for &(x, y) in marked {
            if let Some(b) = self.get_mut(x as i32, y as i32) {
                b.visited = false;
            }
        }
    }

    /// Depth-first same-colour fill from `start`, accumulating into `fill`.
    /// Marks are recorded in `marked` for the caller to clear.
    fn color_fill_into(
        &mut self,
        start: (i32, i32),
        color: BubbleColor,
        fill: &mut Fill,
        marked: &mut Vec<CellPos>,
    ) {
        let offset = self.row_offset;
        let mut stack = vec![start];
        while let Some((x, y)) = stack.pop() {
            let Some(bubble) = self.get_mut(x, y) else {
                continue;
            };
            if bubble.visited {
                continue;
            }
            let pos = (x as usize, y as usize);
            if bubble.color != color {
                if !fill.remnants.contains(&pos) {
                    fill.remnants.push(pos);
                }
                continue;
            }
            bubble.visited = true;
            marked.push(pos);
            fill.cluster.push(pos);
            stack.extend(neighbours(x, y, offset));
        }
    }

    /// Same-colour cluster containing `(x, y)` plus its non-matching boundary.
    /// Empty result if the cell is empty or out of range.
    pub fn color_fill(&mut self, x: usize, y: usize) -> Fill {
        let mut fill = Fill::default();
        let Some(color) = self.get(x as i32, y as i32).map(|b| b.color) else {
            return fill;
        };
        let mut marked = Vec::new();
        self.color_fill_into((x as i32, y as i32), color, &mut fill, &mut marked);
        self.unmark(&marked);
        fill.size = fill.cluster.len();
        fill
    }

    /// Wildcard cluster: the wildcard at `(x, y)`, every occupied neighbour whatever
    /// its colour, and each neighbour's own same-colour cluster. Size is at least
    /// one more than the pop threshold, so a wildcard always pops.
    pub fn wild_fill(&mut self, x: usize, y: usize) -> Fill {
        let mut fill = Fill::default();
        let (sx, sy) = (x as i32, y as i32);
        let Some(start) = self.get_mut(sx, sy) else {
            return fill;
        };
        start.visited = true;
        let mut marked = vec![(x, y)];
        fill.cluster.push((x, y));
        for (nx, ny) in neighbours(sx, sy, self.row_offset) {
            let color = match self.get(nx, ny) {
                Some(b) if !b.visited => b.color,
                _ => continue,
            };
            self.color_fill_into((nx, ny), color, &mut fill, &mut marked);
        }
        self.unmark(&marked);
        fill.size = fill.cluster.len().max(POP_THRESHOLD + 1);
        fill
    }

    /// Whether `(x, y)` is connected to row 0 through occupied cells.
    pub fn reaches_ceiling(&mut self, x: usize, y: usize) -> bool {
        let offset = self.row_offset;
        let mut marked = Vec::new();
        let mut stack = vec![(x as i32, y as i32)];
        let mut reached = false;
        while let Some((cx, cy)) = stack.pop() {
            let Some(bubble) = self.get_mut(cx, cy) else {
                continue;
            };
            if bubble.visited {
                continue;
            }
            bubble.visited = true;
            marked.push((cx as usize, cy as usize));
            if cy == 0 {
                reached = true;
                break;
            }
            stack.extend(neighbours(cx, cy, offset));
        }
        self.unmark(&marked);
        reached
    }

    /// Evacuate the whole connected group containing `(x, y)`, returning each
    /// removed bubble with the cell it came from.
    pub fn detach(&mut self, x: usize, y: usize) -> Vec<(CellPos, Bubble)> {
        let offset = self.row_offset;
        let mut group = Vec::new();
        let mut stack = vec![(x as i32, y as i32)];
        while let Some((cx, cy)) = stack.pop() {
            let Some(bubble) = self.get_mut(cx, cy) else {
                continue;
            };
            if bubble.visited {
                continue;
            }
            bubble.visited = true;
            group.push((cx as usize, cy as usize));
            stack.extend(neighbours(cx, cy, offset));
        }
        group
            .into_iter()
            .filter_map(|(gx, gy)| self.take(gx, gy).map(|b| ((gx, gy), b)))
            .collect()
    }

    /// Build a grid from a picture: one line per row, one character per column.
    /// `.` empty, `a`..`d` palette colours, `w` wildcard.
    #[cfg(test)]
    pub(crate) fn parse(picture: &str) -> Self {
        let lines: Vec<Vec<char>> = picture
            .lines()
            .map(|l| l.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|l| !l.is_empty())
            .collect();
        let columns = lines.iter().map(Vec::len).max().unwrap_or(0);
        let mut grid = Self::new(columns);
        for line in lines {
            let mut row: Vec<Option<Bubble>> = line
                .iter()
                .map(|c| {
                    let color = match c {
                        'a' => BubbleColor::Slate,
                        'b' => BubbleColor::Plum,
                        'c' => BubbleColor::Coral,
                        'd' => BubbleColor::Peach,
                        'w' => BubbleColor::Wild,
                        _ => return None,
                    };
                    Some(Bubble::new(color))
                })
                .collect();
            row.resize(columns, None);
            grid.rows.push_back(row);
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sorted(mut cells: Vec<CellPos>) -> Vec<CellPos> {
        cells.sort_unstable();
        cells
    }

    #[test]
    fn test_pair_does_not_pop_triple_does() {
        let mut grid = Grid::parse("aa..\n....");
        let fill = grid.color_fill(0, 0);
        assert_eq!(fill.size, 2);
        assert!(!fill.pops());
        assert!(!grid.any_visited());

        let mut grid = Grid::parse("aaa.\n....");
        let fill = grid.color_fill(1, 0);
        assert_eq!(sorted(fill.cluster.clone()), vec![(0, 0), (1, 0), (2, 0)]);
        assert!(fill.pops());
        assert!(!grid.any_visited());
    }

    #[test]
    fn test_fill_follows_staggered_diagonals() {
        // row 1 is shifted right: (1,1) touches (1,0) and (2,0), not (0,0)
        let mut grid = Grid::parse(
            "a.a.
             .a..",
        );
        let fill = grid.color_fill(1, 1);
        assert_eq!(sorted(fill.cluster), vec![(1, 1), (2, 0)]);
    }

    #[test]
    fn test_remnants_are_non_matching_boundary() {
        let mut grid = Grid::parse("aab.\nc...");
        let fill = grid.color_fill(0, 0);
        assert_eq!(fill.size, 2);
        assert_eq!(sorted(fill.remnants), vec![(0, 1), (2, 0)]);
        assert!(!grid.any_visited());
    }

    #[test]
    fn test_fill_on_empty_or_out_of_range_is_noop() {
        let mut grid = Grid::parse("a.");
        assert_eq!(grid.color_fill(1, 0), Fill::default());
        assert_eq!(grid.color_fill(5, 9), Fill::default());
        assert!(!grid.reaches_ceiling(7, 7));
        assert!(grid.detach(1, 0).is_empty());
    }

    #[test]
    fn test_wild_absorbs_mixed_neighbours_and_their_clusters() {
        let mut grid = Grid::parse(
            "abcd
             aw..",
        );
        let fill = grid.wild_fill(1, 1);
        assert_eq!(
            sorted(fill.cluster.clone()),
            vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0)]
        );
        assert_eq!(fill.size, 5);
        assert!(fill.remnants.contains(&(3, 0)));
        assert!(!fill.cluster.contains(&(3, 0)));
        assert!(!grid.any_visited());
    }

    #[test]
    fn test_lone_wild_still_pops() {
        let mut grid = Grid::parse("....\n.w..");
        let fill = grid.wild_fill(1, 1);
        assert_eq!(fill.cluster, vec![(1, 1)]);
        assert!(fill.pops());
    }

    #[test]
    fn test_ceiling_reachability() {
        let mut grid = Grid::parse(
            "a...
             b...
             c...",
        );
        assert!(grid.reaches_ceiling(0, 0));
        assert!(grid.reaches_ceiling(0, 2));
        assert!(!grid.any_visited());

        grid.take(0, 1);
        assert!(!grid.reaches_ceiling(0, 2));
        assert!(!grid.any_visited());
    }

    #[test]
    fn test_detach_removes_whole_group() {
        let mut grid = Grid::parse(
            "a...
             ....
             c...
             d...",
        );
        let fallen = grid.detach(0, 2);
        assert_eq!(fallen.len(), 2);
        assert!(!grid.is_occupied(0, 2));
        assert!(!grid.is_occupied(0, 3));
        assert!(grid.is_occupied(0, 0));
        assert!(fallen.iter().all(|(_, b)| !b.visited));
        assert_eq!(grid.bubble_count(), 1);
    }

    #[test]
    fn test_place_grows_rows_and_refuses_occupied() {
        let mut grid = Grid::parse("a.");
        assert_eq!(grid.row_count(), 1);
        assert!(grid.place(1, 3, Bubble::new(BubbleColor::Plum)));
        assert_eq!(grid.row_count(), 4);
        assert!(!grid.place(0, 0, Bubble::new(BubbleColor::Plum)));
        assert!(!grid.place(2, 0, Bubble::new(BubbleColor::Plum)));
        assert_eq!(grid.lowest_occupied_row(), Some(3));
    }

    #[test]
    fn test_push_row_top_keeps_existing_positions_staggered() {
        let lattice = Lattice::new(3.0);
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = Grid::filled(6, 3, &mut rng);
        let before = grid.get(2, 1).copied();
        let (x_before, _) = lattice.cell_to_pixel(2, 1, grid.row_offset());
        grid.push_row_top(Grid::random_row(6, &mut rng));
        assert_eq!(grid.row_count(), 4);
        assert_eq!(grid.get(2, 2).copied(), before);
        let (x_after, _) = lattice.cell_to_pixel(2, 2, grid.row_offset());
        assert_eq!(x_before, x_after);
    }

    #[test]
    fn test_first_contact() {
        let lattice = Lattice::new(3.0);
        let grid = Grid::parse("a...");
        let (cx, cy) = lattice.cell_to_pixel(0, 0, 0);
        assert_eq!(grid.first_contact(&lattice, cx + 5.0, cy, 6.0), Some((0, 0)));
        assert_eq!(grid.first_contact(&lattice, cx + 7.0, cy, 6.0), None);
    }
}
