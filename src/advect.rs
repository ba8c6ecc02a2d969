//! Semi-Lagrangian transport.
//!
//! Each sample looks one step upstream along the current velocity and takes
//! the bilinearly interpolated pre-step value found there. Reads come from the
//! read buffers only; results go to the write buffers, which are swapped in
//! once the whole field has been visited.

use crate::grid::{Field, Grid};
use crate::interp::{sample, Stagger};

/// Advect both velocity components along themselves
pub fn advect_velocity(grid: &mut Grid, dt: f32) {
    let cell = grid.cell_size();
    let (w, h) = (grid.width(), grid.height());

    // Samples that are not visited keep their value
    grid.write.u.copy_from(&grid.read.u);
    grid.write.v.copy_from(&grid.read.v);

    let mask = &grid.mask;
    let (u, v) = (&grid.read.u, &grid.read.v);

    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            if mask.is_solid(x, y) {
                continue;
            }

            // Horizontal velocity on the left face; skipped against a solid neighbour
            if mask.is_fluid(x - 1, y) {
                let here = u[(x, y)];
                let across = (v[(x - 1, y)] + v[(x, y)] + v[(x - 1, y + 1)] + v[(x, y + 1)]) / 4.;
                let origin = trace_back(cell.sample_pos(x, y, Stagger::U), (here, across), dt);
                grid.write.u[(x, y)] = sample(u, origin, Stagger::U, cell);
            }

            // Vertical velocity on the top face
            if mask.is_fluid(x, y - 1) {
                let across = (u[(x, y - 1)] + u[(x + 1, y - 1)] + u[(x, y)] + u[(x + 1, y)]) / 4.;
                let here = v[(x, y)];
                let origin = trace_back(cell.sample_pos(x, y, Stagger::V), (across, here), dt);
                grid.write.v[(x, y)] = sample(v, origin, Stagger::V, cell);
            }
        }
    }

    // Swap the written buffers back into read again
    std::mem::swap(&mut grid.read.u, &mut grid.write.u);
    std::mem::swap(&mut grid.read.v, &mut grid.write.v);

    grid.zero_solids();
}

/// Advect the dye along the (already advected) velocity field
pub fn advect_dye(grid: &mut Grid, dt: f32) {
    let cell = grid.cell_size();
    let (w, h) = (grid.width(), grid.height());

    grid.write.dye.copy_from(&grid.read.dye);

    let mask = &grid.mask;
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            if mask.is_solid(x, y) {
                continue;
            }

            let vel = cell_velocity(&grid.read.u, &grid.read.v, x, y);
            let origin = trace_back(cell.sample_pos(x, y, Stagger::CENTER), vel, dt);
            grid.write.dye[(x, y)] = sample(&grid.read.dye, origin, Stagger::CENTER, cell);
        }
    }

    std::mem::swap(&mut grid.read.dye, &mut grid.write.dye);

    grid.zero_solids();
}

/// Velocity at the center of cell (x, y), averaged from its bordering faces.
/// Needs x + 1 and y + 1 inside the grid.
pub fn cell_velocity(u: &Field, v: &Field, x: usize, y: usize) -> (f32, f32) {
    (
        (u[(x, y)] + u[(x + 1, y)]) / 2.,
        (v[(x, y)] + v[(x, y + 1)]) / 2.,
    )
}

/// Where a parcel now at `pos` was one step `dt` ago
pub fn trace_back((x, y): (f32, f32), (vx, vy): (f32, f32), dt: f32) -> (f32, f32) {
    (x - vx * dt, y - vy * dt)
}
