//! Snapping a projectile into the grid, then popping its cluster and dropping
//! whatever lost its hold on the ceiling.

use crate::entity::{Bubble, BubbleColor, Projectile};
use crate::grid::{CellPos, Fill, Grid};
use crate::lattice::Lattice;

/// Grid changes caused by one placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub cell: CellPos,
    pub color: BubbleColor,
    pub fill: Fill,
    /// Cluster cells removed by the pop, with their colours.
    pub popped: Vec<(CellPos, BubbleColor)>,
    /// Bubbles cut off from the ceiling and removed.
    pub dropped: Vec<(CellPos, Bubble)>,
}

impl Placement {
    #[inline]
    pub fn popped_any(&self) -> bool {
        !self.popped.is_empty()
    }
}

/// Cell under pixel `(x, y)`, clamped to existing columns and rows.
pub fn target_cell(grid: &Grid, lattice: &Lattice, x: f32, y: f32) -> CellPos {
    let (column, row) = lattice.pixel_to_cell(x, y, grid.row_offset());
    let max_column = grid.columns().saturating_sub(1) as i32;
    let max_row = grid.row_count().saturating_sub(1) as i32;
    (
        column.clamp(0, max_column) as usize,
        row.clamp(0, max_row) as usize,
    )
}

/// First free cell for a bubble aimed at `target`. An occupied target is resolved by
/// walking down the rows below it, trying the same column, then one to the right,
/// then one to the left. Row `row_count` is always empty, so the walk always ends.
pub fn resolve_cell(grid: &Grid, target: CellPos) -> CellPos {
    let (column, row) = target;
    if !grid.is_occupied(column, row) {
        return target;
    }
    for candidate_row in row + 1..=grid.row_count() {
        let candidates = [Some(column), column.checked_add(1), column.checked_sub(1)];
        for candidate in candidates.into_iter().flatten() {
            if candidate < grid.columns() && !grid.is_occupied(candidate, candidate_row) {
                return (candidate, candidate_row);
            }
        }
    }
    (column, grid.row_count())
}

/// Stick `projectile` into the grid and resolve the consequences: pop the cluster
/// if it is big enough, then drop every remnant group no longer reaching row 0.
pub fn place_projectile(grid: &mut Grid, lattice: &Lattice, projectile: Projectile) -> Placement {
    let target = target_cell(grid, lattice, projectile.x, projectile.y);
    let cell = resolve_cell(grid, target);
    let bubble = projectile.into_bubble();
    let color = bubble.color;
    if !grid.place(cell.0, cell.1, bubble) {
        log::warn!("placement cell {:?} unexpectedly taken", cell);
    }

    let fill = if color.is_wild() {
        grid.wild_fill(cell.0, cell.1)
    } else {
        grid.color_fill(cell.0, cell.1)
    };

    let mut placement = Placement {
        cell,
        color,
        fill,
        popped: Vec::new(),
        dropped: Vec::new(),
    };
    if !placement.fill.pops() {
        return placement;
    }

    placement.popped = placement
        .fill
        .cluster
        .iter()
        .filter_map(|&(x, y)| grid.take(x, y).map(|b| ((x, y), b.color)))
        .collect();
    placement.dropped = drop_unanchored(grid, &placement.fill.remnants);
    placement
}

/// Detach every remnant group that can no longer reach the ceiling.
pub fn drop_unanchored(grid: &mut Grid, remnants: &[CellPos]) -> Vec<(CellPos, Bubble)> {
    let mut dropped = Vec::new();
    for &(x, y) in remnants {
        if y == 0 || !grid.is_occupied(x, y) || grid.reaches_ceiling(x, y) {
            continue;
        }
        dropped.extend(grid.detach(x, y));
    }
    dropped
}
