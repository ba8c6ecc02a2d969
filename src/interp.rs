use crate::array2d::Array2D;

/// Physical size of one cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSize {
    pub width: f32,
    pub height: f32,
}

/// Where a field's samples sit inside their cell, as a fraction of the cell size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stagger {
    pub x: f32,
    pub y: f32,
}

impl Stagger {
    /// Horizontal velocity lives on the left face
    pub const U: Self = Self { x: 0., y: 0.5 };
    /// Vertical velocity lives on the top face
    pub const V: Self = Self { x: 0.5, y: 0. };
    /// Cell centered scalars (dye)
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };
}

impl CellSize {
    /// Physical location of sample (i, j) of a field with the given stagger
    pub fn sample_pos(&self, i: usize, j: usize, stagger: Stagger) -> (f32, f32) {
        (
            (i as f32 + stagger.x) * self.width,
            (j as f32 + stagger.y) * self.height,
        )
    }
}

/// Linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Bilinear interpolation of `field` at the physical position `(x, y)`
pub fn sample(field: &Array2D<f32>, (x, y): (f32, f32), stagger: Stagger, cell: CellSize) -> f32 {
    sample_with(
        (field.width(), field.height()),
        (x, y),
        stagger,
        cell,
        |i, j| field[(i, j)],
    )
}

/// Bilinear interpolation over any `(i, j) -> value` accessor of the given extent.
/// Positions past the outermost samples are pinned to them; nothing is extrapolated.
pub fn sample_with(
    (width, height): (usize, usize),
    (x, y): (f32, f32),
    stagger: Stagger,
    cell: CellSize,
    at: impl Fn(usize, usize) -> f32,
) -> f32 {
    let (x0, x1, tx) = axis(x, stagger.x, cell.width, width);
    let (y0, y1, ty) = axis(y, stagger.y, cell.height, height);

    // Get corners
    let tl = at(x0, y0);
    let tr = at(x1, y0);
    let bl = at(x0, y1);
    let br = at(x1, y1);

    lerp(
        lerp(tl, tr, tx), // Top row
        lerp(bl, br, tx), // Bottom row
        ty,
    )
}

/// Floor sample, its forward neighbour and the fraction between them along one axis
fn axis(pos: f32, stagger: f32, size: f32, n: usize) -> (usize, usize, f32) {
    let last = n.saturating_sub(1);
    let g = (pos / size - stagger).clamp(0., last as f32);
    let i0 = (g.floor() as usize).min(last);
    let i1 = (i0 + 1).min(last);
    (i0, i1, g - i0 as f32)
}
