//! Simulation parameters and scene files.
//!
//! Scenes are RON documents; any field left out takes its default.
//!
//! ```ron
//! (
//!     width: 120,
//!     height: 60,
//!     edges: (left: false, right: false),
//!     inflows: [(at: Column(1), velocity: 2.0, dye: Some(1.0), dye_stride: 4)],
//!     obstacles: [Circle(x: 30.0, y: 30.0, radius: 6.0)],
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::boundary::Edges;
use crate::error::{ConfigLoadError, SimError};
use crate::forces::Inflow;
use crate::interp::CellSize;

/// Bodies carved out of the mask at construction. Cell units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Obstacle {
    Circle { x: f32, y: f32, radius: f32 },
    Rect { x: usize, y: usize, width: usize, height: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub width: usize,
    pub height: usize,
    pub cell_width: f32,
    pub cell_height: f32,
    /// Relaxation sweeps per step
    pub iterations: u32,
    /// Over-relaxation factor, in (0, 2)
    pub relaxation: f32,
    /// Nominal time step
    pub dt: f32,
    /// Largest distance, in cells, a sample may travel in one step. When set, a fast flow
    /// shortens the step below `dt`. `None` (the default) keeps every step at exactly `dt`.
    pub cfl_limit: Option<f32>,
    /// Added to vertical velocity every step (positive is downward)
    pub gravity: f32,
    pub edges: Edges,
    pub obstacles: Vec<Obstacle>,
    pub inflows: Vec<Inflow>,
    /// Injection brush covers offsets with di² + dj² < brush_radius².
    /// At most `width + height`, which already reaches every cell from any center.
    pub brush_radius: u32,
    /// Look for NaN/inf after every step
    pub check_finite: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 135,
            cell_width: 0.01,
            cell_height: 0.01,
            iterations: 50,
            relaxation: 1.9,
            dt: 1. / 200.,
            cfl_limit: None,
            gravity: 0.,
            edges: Edges::CLOSED,
            obstacles: vec![],
            inflows: vec![],
            brush_radius: 1,
            check_finite: true,
        }
    }
}

impl SimConfig {
    pub fn new(width: usize, height: usize, iterations: u32, cell_size: f32) -> Self {
        Self {
            width,
            height,
            iterations,
            cell_width: cell_size,
            cell_height: cell_size,
            ..Default::default()
        }
    }

    /// Wind tunnel: open sides, a dyed current entering on the left, one round body
    pub fn wind_tunnel(width: usize, height: usize) -> Self {
        let stride = (height / 12).max(2);
        Self {
            width,
            height,
            edges: Edges::TUNNEL,
            inflows: vec![Inflow::column(1, 1.).with_dye(1., stride)],
            obstacles: vec![Obstacle::Circle {
                x: width as f32 / 4.,
                y: height as f32 / 2.,
                radius: height as f32 / 10.,
            }],
            ..Default::default()
        }
    }

    pub fn cell_size(&self) -> CellSize {
        CellSize {
            width: self.cell_width,
            height: self.cell_height,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let fail = |msg: String| Err(SimError::Configuration(msg));

        if self.width == 0 || self.height == 0 {
            return fail(format!("grid must be at least 1x1, got {}x{}", self.width, self.height));
        }
        for (name, value) in [("cell_width", self.cell_width), ("cell_height", self.cell_height), ("dt", self.dt)] {
            if !(value.is_finite() && value > 0.) {
                return fail(format!("{} must be positive and finite, got {}", name, value));
            }
        }
        if !(self.relaxation > 0. && self.relaxation < 2.) {
            return fail(format!("relaxation must lie in (0, 2), got {}", self.relaxation));
        }
        if let Some(cfl) = self.cfl_limit {
            if !(cfl.is_finite() && cfl > 0.) {
                return fail(format!("cfl_limit must be positive, got {}", cfl));
            }
        }
        if !self.gravity.is_finite() {
            return fail(format!("gravity must be finite, got {}", self.gravity));
        }
        let reach = self.width.saturating_add(self.height);
        if usize::try_from(self.brush_radius).map_or(true, |r| r > reach) {
            return fail(format!(
                "brush_radius must be at most {} for a {}x{} grid, got {}",
                reach, self.width, self.height, self.brush_radius
            ));
        }
        if let Some(inflow) = self
            .inflows
            .iter()
            .find(|inflow| !inflow.in_range(self.width, self.height))
        {
            return fail(format!("inflow {:?} lies outside the grid", inflow.at));
        }
        Ok(())
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forces::Line;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
        assert_eq!(SimConfig::wind_tunnel(64, 32).validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let bad = [
            SimConfig::new(0, 10, 10, 0.1),
            SimConfig::new(10, 0, 10, 0.1),
            SimConfig::new(10, 10, 10, 0.),
            SimConfig::new(10, 10, 10, -1.),
            SimConfig {
                relaxation: 2.,
                ..SimConfig::new(10, 10, 10, 0.1)
            },
            SimConfig {
                dt: f32::NAN,
                ..SimConfig::new(10, 10, 10, 0.1)
            },
            SimConfig {
                cfl_limit: Some(0.),
                ..SimConfig::new(10, 10, 10, 0.1)
            },
            SimConfig {
                inflows: vec![Inflow::column(10, 1.)],
                ..SimConfig::new(10, 10, 10, 0.1)
            },
            SimConfig {
                brush_radius: 50_000,
                ..SimConfig::new(10, 10, 10, 0.1)
            },
            SimConfig {
                brush_radius: u32::MAX,
                ..SimConfig::new(10, 10, 10, 0.1)
            },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(SimError::Configuration(_))), "{:?}", config);
        }
    }

    #[test]
    fn test_brush_may_span_the_grid() {
        let config = SimConfig {
            brush_radius: 20,
            ..SimConfig::new(10, 10, 10, 0.1)
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_parse_scene() {
        let text = r#"(
            width: 40,
            height: 20,
            gravity: 9.8,
            edges: (left: false),
            inflows: [(at: Column(2), velocity: 3.0, dye: Some(255.0))],
            obstacles: [Circle(x: 10.0, y: 10.0, radius: 3.0), Rect(x: 30, y: 5, width: 2, height: 10)],
        )"#;
        let config = SimConfig::from_ron_str(text).unwrap();
        assert_eq!((config.width, config.height), (40, 20));
        assert_eq!(config.gravity, 9.8);
        assert!(!config.edges.left);
        assert!(config.edges.right);
        assert_eq!(config.inflows[0].at, Line::Column(2));
        assert_eq!(config.inflows[0].dye_stride, 1);
        assert_eq!(config.obstacles.len(), 2);
        assert_eq!(config.relaxation, 1.9);
    }

    #[test]
    fn test_parse_rejects_invalid_scene() {
        let err = SimConfig::from_ron_str("(width: 0)").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Invalid(SimError::Configuration(_))));

        let err = SimConfig::from_ron_str("(width: \"wide\")").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Ron(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SimConfig::load("/nonexistent/scene.ron").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Io(_)));
    }
}
