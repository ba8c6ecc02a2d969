//! Real-time grid fluid ("stable fluids" family) on a staggered grid.
//!
//! Each [`Simulation::step`] applies, in order: external forces and inflows,
//! a fixed number of over-relaxed divergence removal sweeps, semi-Lagrangian
//! advection of velocity, then of dye.
//!
//! ```
//! use dyeflow::{SimConfig, Simulation};
//!
//! let mut sim = Simulation::new(SimConfig::wind_tunnel(64, 32)).unwrap();
//! sim.inject_dye(20, 16, 1.0).unwrap();
//! for _ in 0..10 {
//!     sim.step();
//! }
//! assert!(sim.instability().is_none());
//! ```

pub mod advect;
pub mod array2d;
pub mod boundary;
pub mod config;
pub mod error;
pub mod forces;
pub mod grid;
pub mod interp;
pub mod project;

pub use array2d::Array2D;
pub use boundary::{Cell, Edges, Mask};
pub use config::{Obstacle, SimConfig};
pub use error::{ConfigLoadError, SimError};
pub use forces::{Brush, Inflow, Line};
pub use grid::{Component, Field, Grid};
pub use interp::{CellSize, Stagger};

pub struct Simulation {
    config: SimConfig,
    grid: Grid,
    brush: Brush,
    steps: u64,
    last_dt: f32,
    instability: Option<SimError>,
}

impl Simulation {
    /// Allocate a zeroed grid, wall off the configured edges and carve the obstacles
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;

        let mut grid = Grid::new(config.width, config.height, config.cell_size(), config.edges);
        for obstacle in &config.obstacles {
            match *obstacle {
                Obstacle::Circle { x, y, radius } => grid.carve_circle(x, y, radius),
                Obstacle::Rect {
                    x,
                    y,
                    width,
                    height,
                } => grid.carve_rect(x, y, width, height),
            };
        }

        log::debug!(
            "Created {}x{} fluid grid ({} solid cells, {} sweeps, relaxation {})",
            config.width,
            config.height,
            grid.mask().solid_count(),
            config.iterations,
            config.relaxation,
        );

        Ok(Self {
            brush: Brush::new(config.brush_radius),
            last_dt: config.dt,
            config,
            grid,
            steps: 0,
            instability: None,
        })
    }

    /// Shorthand for a closed box with default parameters
    pub fn create(width: usize, height: usize, iterations: u32, cell_size: f32) -> Result<Self, SimError> {
        Self::new(SimConfig::new(width, height, iterations, cell_size))
    }

    /// Advance by one time step
    pub fn step(&mut self) {
        let dt = self.stable_dt();

        // External forces
        for inflow in &self.config.inflows {
            inflow.apply(&mut self.grid);
        }
        forces::apply_gravity(&mut self.grid, self.config.gravity, dt);

        // Force incompressibility
        project::project(&mut self.grid, self.config.iterations, self.config.relaxation);

        // Transport
        advect::advect_velocity(&mut self.grid, dt);
        advect::advect_dye(&mut self.grid, dt);

        self.steps += 1;
        self.last_dt = dt;
        log::trace!("Step {} done, dt = {}", self.steps, dt);

        if self.config.check_finite && self.instability.is_none() {
            if let Err(err) = self.check_finite() {
                log::warn!("{}", err);
                self.instability = Some(err);
            }
        }
    }

    /// The configured step, shortened so no sample travels more than `cfl_limit` cells
    pub fn stable_dt(&self) -> f32 {
        let Some(cfl) = self.config.cfl_limit else {
            return self.config.dt;
        };

        let inflow_speed = self
            .config
            .inflows
            .iter()
            .map(|inflow| inflow.velocity.abs())
            .fold(0., f32::max);
        let speed = self.grid.max_speed().max(inflow_speed);
        if !(speed.is_finite() && speed > 0.) {
            return self.config.dt;
        }

        let cell = self.config.cell_width.min(self.config.cell_height);
        self.config.dt.min(cfl * cell / speed)
    }

    /// Add momentum at (i, j) through the configured brush. `Ok(false)` when nothing changed.
    pub fn inject_velocity(&mut self, i: usize, j: usize, horizontal: f32, vertical: f32) -> Result<bool, SimError> {
        self.brush.push(&mut self.grid, i, j, horizontal, vertical)
    }

    /// Set dye to `amount` at (i, j) through the configured brush. `Ok(false)` when nothing changed.
    pub fn inject_dye(&mut self, i: usize, j: usize, amount: f32) -> Result<bool, SimError> {
        self.brush.paint_dye(&mut self.grid, i, j, amount)
    }

    /// Outward (or, for negative `strength`, inward) flow around (i, j)
    pub fn burst(&mut self, i: usize, j: usize, strength: f32) -> Result<bool, SimError> {
        self.brush.burst(&mut self.grid, i, j, strength)
    }

    pub fn set_solid(&mut self, i: usize, j: usize, solid: bool) -> Result<(), SimError> {
        let cell = if solid { Cell::Solid } else { Cell::Fluid };
        self.grid.set_cell(i, j, cell)
    }

    pub fn carve_circle(&mut self, x: f32, y: f32, radius: f32) -> usize {
        self.grid.carve_circle(x, y, radius)
    }

    pub fn read_dye(&self) -> &Field {
        self.grid.dye()
    }

    pub fn read_velocity(&self) -> (&Field, &Field) {
        self.grid.uv()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn last_dt(&self) -> f32 {
        self.last_dt
    }

    pub fn divergence_residual(&self) -> f32 {
        project::divergence_residual(&self.grid)
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.grid.kinetic_energy()
    }

    pub fn total_dye(&self) -> f32 {
        self.grid.total_dye()
    }

    /// First instability the guard has seen, if any
    pub fn instability(&self) -> Option<&SimError> {
        self.instability.as_ref()
    }

    pub fn check_finite(&self) -> Result<(), SimError> {
        match self.grid.first_non_finite() {
            Some(field) => Err(SimError::NumericInstability {
                field,
                step: self.steps,
            }),
            None => Ok(()),
        }
    }
}
