//! Obstacle mask and domain edges.
//!
//! Every question the solver asks about walls goes through [`Mask`]: whether a
//! cell holds fluid, how many of its axis neighbours do, and the 0/1 weight that
//! keeps corrections from pushing flow into a solid face.

use serde::{Deserialize, Serialize};

use crate::array2d::Array2D;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Fluid,
    Solid,
}

/// Which sides of the domain are walled off
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Edges {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Edges {
    pub const CLOSED: Self = Self {
        left: true,
        right: true,
        top: true,
        bottom: true,
    };

    /// Top and bottom walls only, flow may leave through the sides
    pub const TUNNEL: Self = Self {
        left: false,
        right: false,
        top: true,
        bottom: true,
    };
}

impl Default for Edges {
    fn default() -> Self {
        Self::CLOSED
    }
}

#[derive(Clone, Debug)]
pub struct Mask {
    cells: Array2D<Cell>,
}

impl Mask {
    pub fn new(width: usize, height: usize, edges: Edges) -> Self {
        let mut cells = Array2D::new(width, height);

        for x in 0..width {
            if edges.top {
                cells[(x, 0)] = Cell::Solid;
            }
            if edges.bottom {
                cells[(x, height - 1)] = Cell::Solid;
            }
        }

        for y in 0..height {
            if edges.left {
                cells[(0, y)] = Cell::Solid;
            }
            if edges.right {
                cells[(width - 1, y)] = Cell::Solid;
            }
        }

        Self { cells }
    }

    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }

    pub fn cells(&self) -> &Array2D<Cell> {
        &self.cells
    }

    pub fn cell(&self, i: usize, j: usize) -> Option<Cell> {
        self.cells.get(i, j).copied()
    }

    /// Returns false (and changes nothing) outside the grid
    pub fn set(&mut self, i: usize, j: usize, cell: Cell) -> bool {
        match self.cells.get_mut(i, j) {
            Some(c) => {
                *c = cell;
                true
            }
            None => false,
        }
    }

    /// Out of range counts as solid
    pub fn is_fluid(&self, i: usize, j: usize) -> bool {
        self.cell(i, j) == Some(Cell::Fluid)
    }

    pub fn is_solid(&self, i: usize, j: usize) -> bool {
        !self.is_fluid(i, j)
    }

    fn neighbour_is_fluid(&self, i: usize, j: usize, di: isize, dj: isize) -> bool {
        match (i.checked_add_signed(di), j.checked_add_signed(dj)) {
            (Some(i), Some(j)) => self.is_fluid(i, j),
            _ => false,
        }
    }

    /// 1.0 for fluid, 0.0 for solid or out of range
    pub fn weight(&self, i: usize, j: usize) -> f32 {
        if self.is_fluid(i, j) {
            1.
        } else {
            0.
        }
    }

    /// Number of the four axis neighbours holding fluid
    pub fn open_sides(&self, i: usize, j: usize) -> u8 {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .filter(|&(di, dj)| self.neighbour_is_fluid(i, j, di, dj))
            .count() as u8
    }

    /// Mark every cell whose offset from `(x, y)` lies within `radius` as solid.
    /// Coordinates are in cells. Returns how many cells changed from fluid.
    pub fn carve_circle(&mut self, x: f32, y: f32, radius: f32) -> usize {
        let r2 = radius * radius;
        self.carve_where(|i, j| {
            let dx = i as f32 - x;
            let dy = j as f32 - y;
            dx * dx + dy * dy <= r2
        })
    }

    /// Solidify the cells in `[x, x + width) × [y, y + height)`, clipped to the grid
    pub fn carve_rect(&mut self, x: usize, y: usize, width: usize, height: usize) -> usize {
        self.carve_where(|i, j| i >= x && i < x + width && j >= y && j < y + height)
    }

    fn carve_where(&mut self, inside: impl Fn(usize, usize) -> bool) -> usize {
        let mut changed = 0;
        for j in 0..self.height() {
            for i in 0..self.width() {
                if inside(i, j) && self.cells[(i, j)] == Cell::Fluid {
                    self.cells[(i, j)] = Cell::Solid;
                    changed += 1;
                }
            }
        }
        changed
    }

    pub fn solid_count(&self) -> usize {
        self.cells.data().iter().filter(|&&c| c == Cell::Solid).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_edges_are_solid() {
        let mask = Mask::new(6, 5, Edges::CLOSED);
        for i in 0..6 {
            assert!(mask.is_solid(i, 0));
            assert!(mask.is_solid(i, 4));
        }
        for j in 0..5 {
            assert!(mask.is_solid(0, j));
            assert!(mask.is_solid(5, j));
        }
        assert!(mask.is_fluid(1, 1));
        assert!(mask.is_fluid(4, 3));
    }

    #[test]
    fn test_tunnel_leaves_sides_open() {
        let mask = Mask::new(6, 5, Edges::TUNNEL);
        assert!(mask.is_fluid(0, 2));
        assert!(mask.is_fluid(5, 2));
        assert!(mask.is_solid(3, 0));
    }

    #[test]
    fn test_out_of_range_is_not_fluid() {
        let mask = Mask::new(4, 4, Edges::TUNNEL);
        assert!(!mask.is_fluid(4, 1));
        assert!(!mask.is_fluid(1, 100));
        assert_eq!(mask.weight(9, 9), 0.);
    }

    #[test]
    fn test_open_sides() {
        let mut mask = Mask::new(5, 5, Edges::CLOSED);
        // Corner of the interior touches two walls
        assert_eq!(mask.open_sides(1, 1), 2);
        assert_eq!(mask.open_sides(2, 2), 4);

        // Edge cell in an open tunnel has no neighbour past the domain
        let tunnel = Mask::new(5, 5, Edges::TUNNEL);
        assert_eq!(tunnel.open_sides(0, 2), 3);

        // Isolated pocket
        for (i, j) in [(1, 2), (3, 2), (2, 1), (2, 3)] {
            mask.set(i, j, Cell::Solid);
        }
        assert_eq!(mask.open_sides(2, 2), 0);
    }

    #[test]
    fn test_carve_circle() {
        let mut mask = Mask::new(11, 11, Edges::CLOSED);
        let changed = mask.carve_circle(5., 5., 1.);
        // Center plus its four axis neighbours
        assert_eq!(changed, 5);
        assert!(mask.is_solid(5, 5));
        assert!(mask.is_solid(4, 5));
        assert!(mask.is_fluid(4, 4));

        // Carving again changes nothing
        assert_eq!(mask.carve_circle(5., 5., 1.), 0);
    }

    #[test]
    fn test_carve_rect_clips() {
        let mut mask = Mask::new(4, 4, Edges::TUNNEL);
        let before = mask.solid_count();
        mask.carve_rect(2, 1, 10, 2);
        assert_eq!(mask.solid_count(), before + 4);
        assert!(!mask.set(4, 0, Cell::Fluid));
    }
}
