//! External momentum and dye sources, applied before the projection of a step.

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::grid::Grid;

/// A full column (sets horizontal velocity) or row (sets vertical velocity)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Line {
    Column(usize),
    Row(usize),
}

/// Steady current held at a fixed value every step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Inflow {
    pub at: Line,
    pub velocity: f32,
    /// Dye written into the same cells
    #[serde(default)]
    pub dye: Option<f32>,
    /// Only every n-th cell along the line gets dye, which draws streaklines
    #[serde(default = "default_stride")]
    pub dye_stride: usize,
}

fn default_stride() -> usize {
    1
}

impl Inflow {
    pub fn column(i: usize, velocity: f32) -> Self {
        Self {
            at: Line::Column(i),
            velocity,
            dye: None,
            dye_stride: 1,
        }
    }

    pub fn row(j: usize, velocity: f32) -> Self {
        Self {
            at: Line::Row(j),
            ..Self::column(0, velocity)
        }
    }

    pub fn with_dye(mut self, dye: f32, stride: usize) -> Self {
        self.dye = Some(dye);
        self.dye_stride = stride;
        self
    }

    /// Write the current into every fluid cell on the line
    pub fn apply(&self, grid: &mut Grid) {
        let (w, h) = (grid.width(), grid.height());
        let stride = self.dye_stride.max(1);
        let cells: Vec<(usize, usize, usize)> = match self.at {
            Line::Column(i) if i < w => (0..h).map(|j| (i, j, j)).collect(),
            Line::Row(j) if j < h => (0..w).map(|i| (i, j, i)).collect(),
            _ => return,
        };

        for (i, j, along) in cells {
            if grid.mask.is_solid(i, j) {
                continue;
            }
            match self.at {
                Line::Column(_) => grid.read.u[(i, j)] = self.velocity,
                Line::Row(_) => grid.read.v[(i, j)] = self.velocity,
            }
            if let Some(dye) = self.dye {
                if along % stride == 0 {
                    grid.read.dye[(i, j)] = dye;
                }
            }
        }
    }

    pub fn in_range(&self, width: usize, height: usize) -> bool {
        match self.at {
            Line::Column(i) => i < width,
            Line::Row(j) => j < height,
        }
    }
}

/// Accelerate the vertical velocity on every top face between two fluid cells
pub fn apply_gravity(grid: &mut Grid, gravity: f32, dt: f32) {
    if gravity == 0. {
        return;
    }
    for y in 1..grid.height().saturating_sub(1) {
        for x in 1..grid.width().saturating_sub(1) {
            if grid.mask.is_fluid(x, y) && grid.mask.is_fluid(x, y - 1) {
                grid.read.v[(x, y)] += gravity * dt;
            }
        }
    }
}

/// Circular brush: every offset (di, dj) with di² + dj² < radius²
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Brush {
    pub radius: i32,
}

impl Brush {
    /// Radii beyond `i32::MAX` saturate
    pub fn new(radius: u32) -> Self {
        Self {
            radius: i32::try_from(radius).unwrap_or(i32::MAX),
        }
    }

    pub fn offsets(&self) -> impl Iterator<Item = Coord<i32>> {
        plot_fill_circle(self.radius)
    }

    /// Grid cells under the brush centered on (i, j), with their offsets. Clipped to the grid.
    fn cover(&self, grid: &Grid, (i, j): Coord<usize>) -> Covered {
        let dims = (grid.width(), grid.height());
        self.offsets()
            .filter_map(|(di, dj)| {
                box_coord(dims, (i as i32 + di, j as i32 + dj)).map(|c| (c, (di, dj)))
            })
            .filter(|&((x, y), _)| grid.mask.is_fluid(x, y))
            .collect()
    }

    /// Fail on an out of range center, `Ok(None)` on a solid one
    fn target(&self, grid: &Grid, i: usize, j: usize) -> Result<Option<Covered>, SimError> {
        if i >= grid.width() || j >= grid.height() {
            return Err(SimError::OutOfRange {
                i,
                j,
                width: grid.width(),
                height: grid.height(),
            });
        }
        if grid.mask.is_solid(i, j) {
            log::debug!("Dropped injection at solid cell ({}, {})", i, j);
            return Ok(None);
        }
        Ok(Some(self.cover(grid, (i, j))))
    }

    /// Set the dye of every fluid cell under the brush to `amount`
    pub fn paint_dye(&self, grid: &mut Grid, i: usize, j: usize, amount: f32) -> Result<bool, SimError> {
        let Some(cells) = self.target(grid, i, j)? else {
            return Ok(false);
        };
        for ((x, y), _) in &cells {
            grid.read.dye[(*x, *y)] = amount;
        }
        Ok(!cells.is_empty())
    }

    /// Add momentum to the faces of every fluid cell under the brush.
    /// A face shared with a solid cell is left alone.
    pub fn push(&self, grid: &mut Grid, i: usize, j: usize, horizontal: f32, vertical: f32) -> Result<bool, SimError> {
        let Some(cells) = self.target(grid, i, j)? else {
            return Ok(false);
        };
        for &((x, y), _) in &cells {
            if x > 0 && grid.mask.is_fluid(x - 1, y) {
                grid.read.u[(x, y)] += horizontal;
            }
            if y > 0 && grid.mask.is_fluid(x, y - 1) {
                grid.read.v[(x, y)] += vertical;
            }
        }
        Ok(!cells.is_empty())
    }

    /// Outward (positive `strength`) or inward (negative) flow pairs around (i, j)
    pub fn burst(&self, grid: &mut Grid, i: usize, j: usize, strength: f32) -> Result<bool, SimError> {
        let Some(cells) = self.target(grid, i, j)? else {
            return Ok(false);
        };
        let mut changed = false;
        for &((x, y), (di, dj)) in &cells {
            if di != 0 && x > 0 && grid.mask.is_fluid(x - 1, y) {
                grid.read.u[(x, y)] = strength * di.signum() as f32;
                changed = true;
            }
            if dj != 0 && y > 0 && grid.mask.is_fluid(x, y - 1) {
                grid.read.v[(x, y)] = strength * dj.signum() as f32;
                changed = true;
            }
        }
        Ok(changed)
    }
}

pub type Coord<T> = (T, T);

type Covered = Vec<(Coord<usize>, Coord<i32>)>;

fn box_coord((width, height): Coord<usize>, (x, y): Coord<i32>) -> Option<Coord<usize>> {
    let f = |v: i32, len: usize| (v >= 0).then(|| v as usize).filter(|&v| v < len);
    f(x, width).zip(f(y, height))
}

fn plot_fill_circle(radius: i32) -> impl Iterator<Item = Coord<i32>> {
    let r2 = i64::from(radius).pow(2);
    (-radius..=radius).flat_map(move |y| {
        (-radius..=radius).filter_map(move |x| {
            let d2 = i64::from(x).pow(2) + i64::from(y).pow(2);
            (d2 < r2).then(|| (x, y))
        })
    })
}
