//! Divergence removal.
//!
//! Gauss-Seidel style over-relaxation: each fluid cell spreads its net outflow
//! evenly over the faces it shares with fluid neighbours, scaled by the
//! relaxation factor. No pressure field is formed. A fixed number of sweeps
//! leaves some residual divergence; more sweeps leave less.
//!
//! The sweep updates faces in place, so neighbouring cells of one sweep depend
//! on each other. It must stay sequential unless reordered (e.g. red-black).

use crate::grid::Grid;

/// Run `iterations` relaxation sweeps over the grid
pub fn project(grid: &mut Grid, iterations: u32, relaxation: f32) {
    for _ in 0..iterations {
        sweep(grid, relaxation);
    }
}

/// A single row-major pass over all interior cells
pub fn sweep(grid: &mut Grid, relaxation: f32) {
    let mask = &grid.mask;
    let u = &mut grid.read.u;
    let v = &mut grid.read.v;

    for y in 1..mask.height().saturating_sub(1) {
        for x in 1..mask.width().saturating_sub(1) {
            if mask.is_solid(x, y) {
                continue;
            }

            let open_sides = mask.open_sides(x, y);
            if open_sides == 0 {
                continue;
            }

            let d = u[(x + 1, y)] - u[(x, y)] + v[(x, y + 1)] - v[(x, y)];
            let c = relaxation * d / open_sides as f32;

            // Faces shared with solid cells are left alone
            u[(x, y)] += c * mask.weight(x - 1, y);
            u[(x + 1, y)] -= c * mask.weight(x + 1, y);
            v[(x, y)] += c * mask.weight(x, y - 1);
            v[(x, y + 1)] -= c * mask.weight(x, y + 1);
        }
    }
}

/// Sum of |divergence| over every cell the sweep would correct
pub fn divergence_residual(grid: &Grid) -> f32 {
    let mask = grid.mask();
    let mut total = 0.;
    for y in 1..grid.height().saturating_sub(1) {
        for x in 1..grid.width().saturating_sub(1) {
            if mask.is_fluid(x, y) && mask.open_sides(x, y) > 0 {
                total += grid.divergence(x, y).abs();
            }
        }
    }
    total
}
