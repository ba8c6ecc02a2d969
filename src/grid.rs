//! Staggered (MAC) grid storage.
//!
//! All fields are `width × height`. `u[(i, j)]` is the horizontal velocity on
//! the left face of cell `(i, j)`, `v[(i, j)]` the vertical velocity on its top
//! face, `dye[(i, j)]` the scalar at its center. Each field has a read and a
//! write buffer; transport writes into the second and swaps.

use crate::array2d::Array2D;
use crate::boundary::{Cell, Edges, Mask};
use crate::error::SimError;
use crate::interp::CellSize;

pub type Field = Array2D<f32>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Horizontal,
    Vertical,
}

#[derive(Clone, Debug)]
pub struct FluidState {
    pub u: Field,
    pub v: Field,
    pub dye: Field,
}

impl FluidState {
    fn new(width: usize, height: usize) -> Self {
        Self {
            u: Field::new(width, height),
            v: Field::new(width, height),
            dye: Field::new(width, height),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Grid {
    cell: CellSize,
    pub(crate) read: FluidState,
    pub(crate) write: FluidState,
    pub(crate) mask: Mask,
}

impl Grid {
    /// Zero velocity and dye, edges walled according to `edges`
    pub fn new(width: usize, height: usize, cell: CellSize, edges: Edges) -> Self {
        let empty = FluidState::new(width, height);
        Self {
            cell,
            read: empty.clone(),
            write: empty,
            mask: Mask::new(width, height, edges),
        }
    }

    pub fn width(&self) -> usize {
        self.mask.width()
    }

    pub fn height(&self) -> usize {
        self.mask.height()
    }

    pub fn cell_size(&self) -> CellSize {
        self.cell
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn uv(&self) -> (&Field, &Field) {
        (&self.read.u, &self.read.v)
    }

    pub fn uv_mut(&mut self) -> (&mut Field, &mut Field) {
        (&mut self.read.u, &mut self.read.v)
    }

    pub fn dye(&self) -> &Field {
        &self.read.dye
    }

    pub fn dye_mut(&mut self) -> &mut Field {
        &mut self.read.dye
    }

    fn check(&self, i: usize, j: usize) -> Result<(), SimError> {
        if i < self.width() && j < self.height() {
            Ok(())
        } else {
            Err(SimError::OutOfRange {
                i,
                j,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    fn component(&self, component: Component) -> &Field {
        match component {
            Component::Horizontal => &self.read.u,
            Component::Vertical => &self.read.v,
        }
    }

    fn component_mut(&mut self, component: Component) -> &mut Field {
        match component {
            Component::Horizontal => &mut self.read.u,
            Component::Vertical => &mut self.read.v,
        }
    }

    pub fn velocity(&self, component: Component, i: usize, j: usize) -> Result<f32, SimError> {
        self.check(i, j)?;
        Ok(self.component(component)[(i, j)])
    }

    pub fn set_velocity(
        &mut self,
        component: Component,
        i: usize,
        j: usize,
        value: f32,
    ) -> Result<(), SimError> {
        self.check(i, j)?;
        self.component_mut(component)[(i, j)] = value;
        Ok(())
    }

    pub fn dye_at(&self, i: usize, j: usize) -> Result<f32, SimError> {
        self.check(i, j)?;
        Ok(self.read.dye[(i, j)])
    }

    pub fn set_dye(&mut self, i: usize, j: usize, value: f32) -> Result<(), SimError> {
        self.check(i, j)?;
        self.read.dye[(i, j)] = value;
        Ok(())
    }

    pub fn cell(&self, i: usize, j: usize) -> Result<Cell, SimError> {
        self.check(i, j)?;
        Ok(self.mask.cells()[(i, j)])
    }

    /// Changes the mask. A cell turning solid loses its dye and all four faces.
    pub fn set_cell(&mut self, i: usize, j: usize, cell: Cell) -> Result<(), SimError> {
        self.check(i, j)?;
        let was_fluid = self.mask.is_fluid(i, j);
        self.mask.set(i, j, cell);
        if cell == Cell::Solid && was_fluid {
            self.seal_cell(i, j);
        }
        Ok(())
    }

    pub fn carve_circle(&mut self, x: f32, y: f32, radius: f32) -> usize {
        let before = self.mask.clone();
        let changed = self.mask.carve_circle(x, y, radius);
        self.seal_carved(&before);
        changed
    }

    pub fn carve_rect(&mut self, x: usize, y: usize, width: usize, height: usize) -> usize {
        let before = self.mask.clone();
        let changed = self.mask.carve_rect(x, y, width, height);
        self.seal_carved(&before);
        changed
    }

    /// Seal every cell that was fluid in `before` and is solid now
    fn seal_carved(&mut self, before: &Mask) {
        for j in 0..self.height() {
            for i in 0..self.width() {
                if before.is_fluid(i, j) && self.mask.is_solid(i, j) {
                    self.seal_cell(i, j);
                }
            }
        }
    }

    fn clear_cell(&mut self, i: usize, j: usize) {
        self.read.u[(i, j)] = 0.;
        self.read.v[(i, j)] = 0.;
        self.read.dye[(i, j)] = 0.;
    }

    /// Clear the cell and the right and bottom faces its neighbours store.
    /// Nothing rewrites a face shared with a solid cell, so these stay closed.
    fn seal_cell(&mut self, i: usize, j: usize) {
        self.clear_cell(i, j);
        if i + 1 < self.width() {
            self.read.u[(i + 1, j)] = 0.;
        }
        if j + 1 < self.height() {
            self.read.v[(i, j + 1)] = 0.;
        }
    }

    /// Force velocity and dye stored in solid cells to zero
    pub fn zero_solids(&mut self) {
        for j in 0..self.height() {
            for i in 0..self.width() {
                if self.mask.is_solid(i, j) {
                    self.clear_cell(i, j);
                }
            }
        }
    }

    /// Net outflow of cell (i, j). Zero for edge cells, which have no right/bottom faces.
    pub fn divergence(&self, i: usize, j: usize) -> f32 {
        if i + 1 >= self.width() || j + 1 >= self.height() {
            return 0.;
        }
        let (u, v) = self.uv();
        u[(i + 1, j)] - u[(i, j)] + v[(i, j + 1)] - v[(i, j)]
    }

    /// Largest velocity magnitude, estimated from the faces of each cell
    pub fn max_speed(&self) -> f32 {
        let (u, v) = self.uv();
        u.data()
            .iter()
            .zip(v.data())
            .map(|(u, v)| u.hypot(*v))
            .fold(0., f32::max)
    }

    pub fn kinetic_energy(&self) -> f32 {
        let (u, v) = self.uv();
        u.data().iter().chain(v.data()).map(|x| x * x).sum()
    }

    pub fn total_dye(&self) -> f32 {
        self.read.dye.data().iter().sum()
    }

    /// Name of the first field holding a NaN or infinity, if any
    pub fn first_non_finite(&self) -> Option<&'static str> {
        [
            ("u", &self.read.u),
            ("v", &self.read.v),
            ("dye", &self.read.dye),
        ]
        .into_iter()
        .find(|(_, field)| field.data().iter().any(|x| !x.is_finite()))
        .map(|(name, _)| name)
    }
}
