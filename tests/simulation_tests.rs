//! Integration tests for the public simulation API
//!
//! These drive whole steps and check:
//! - a still, closed box never gains energy or dye
//! - injections only touch fluid cells inside the grid
//! - inflows and projection behave as configured

use dyeflow::{Component, Inflow, SimConfig, SimError, Simulation};

fn closed_box(width: usize, height: usize, iterations: u32) -> Simulation {
    Simulation::create(width, height, iterations, 0.01).unwrap()
}

fn interior(sim: &Simulation) -> impl Iterator<Item = (usize, usize)> {
    let (w, h) = (sim.width(), sim.height());
    (1..h - 1).flat_map(move |j| (1..w - 1).map(move |i| (i, j)))
}

#[test]
fn test_still_box_stays_still() {
    let mut sim = closed_box(16, 12, 50);
    for _ in 0..100 {
        sim.step();
    }

    let (u, v) = sim.read_velocity();
    assert!(u.data().iter().all(|&x| x == 0.));
    assert!(v.data().iter().all(|&x| x == 0.));
    assert!(sim.read_dye().data().iter().all(|&x| x == 0.));
    assert_eq!(sim.steps(), 100);
}

#[test]
fn test_rejects_bad_construction() {
    assert!(matches!(
        Simulation::create(0, 10, 10, 0.01),
        Err(SimError::Configuration(_))
    ));
    assert!(matches!(
        Simulation::create(10, 10, 10, 0.),
        Err(SimError::Configuration(_))
    ));
}

#[test]
fn test_inflow_without_projection() {
    let config = SimConfig {
        inflows: vec![Inflow::column(1, 5.)],
        ..SimConfig::new(10, 10, 0, 0.01)
    };
    let mut sim = Simulation::new(config).unwrap();
    sim.step();

    let (u, v) = sim.read_velocity();
    for (i, j) in interior(&sim) {
        let expected = if i == 1 { 5. } else { 0. };
        assert_eq!(u[(i, j)], expected, "u at ({}, {})", i, j);
        assert_eq!(v[(i, j)], 0., "v at ({}, {})", i, j);
    }
}

#[test]
fn test_single_cell_dye_injection() {
    let mut sim = closed_box(11, 11, 20);
    assert_eq!(sim.inject_dye(5, 5, 15.), Ok(true));

    let dye = sim.read_dye();
    for j in 0..11 {
        for i in 0..11 {
            let expected = if (i, j) == (5, 5) { 15. } else { 0. };
            assert_eq!(dye[(i, j)], expected);
        }
    }
}

#[test]
fn test_injection_at_solid_cell_changes_nothing() {
    let mut sim = closed_box(12, 12, 20);
    sim.carve_circle(6., 6., 2.);
    sim.inject_dye(3, 3, 1.).unwrap();
    sim.inject_velocity(8, 3, 1., -1.).unwrap();

    let before = sim.grid().clone();
    assert_eq!(sim.inject_dye(6, 6, 9.), Ok(false));
    assert_eq!(sim.inject_dye(0, 4, 9.), Ok(false));
    assert_eq!(sim.inject_velocity(6, 6, 3., 3.), Ok(false));

    assert_eq!(sim.read_dye(), before.dye());
    assert_eq!(sim.read_velocity(), before.uv());
}

#[test]
fn test_out_of_range_injection_is_reported() {
    let mut sim = closed_box(8, 8, 20);
    let err = sim.inject_dye(8, 2, 1.).unwrap_err();
    assert_eq!(
        err,
        SimError::OutOfRange {
            i: 8,
            j: 2,
            width: 8,
            height: 8
        }
    );
    assert!(sim.inject_velocity(1, 100, 1., 1.).is_err());
    assert_eq!(sim.total_dye(), 0.);
    assert_eq!(sim.kinetic_energy(), 0.);

    // Stepping afterwards just carries on
    sim.step();
    assert_eq!(sim.steps(), 1);
}

#[test]
fn test_projection_reduces_divergence() {
    let run = |iterations| {
        let mut sim = closed_box(24, 24, iterations);
        let config = sim.config().clone();
        assert_eq!(config.iterations, iterations);
        sim.inject_velocity(12, 12, 1., 0.5).unwrap();
        sim.step();
        sim.divergence_residual()
    };

    let without = run(0);
    let with = run(80);
    assert!(without > 0.);
    assert!(with < without * 0.5, "with {with}, without {without}");
}

#[test]
fn test_wind_tunnel_carries_dye_downstream() {
    let mut sim = Simulation::new(SimConfig::wind_tunnel(64, 32)).unwrap();
    for _ in 0..60 {
        sim.step();
    }

    let dye = sim.read_dye();
    let downstream: f32 = (0..sim.height())
        .flat_map(|j| (4..sim.width()).map(move |i| (i, j)))
        .map(|pos| dye[pos])
        .sum();
    assert!(downstream > 0.);
    assert!(sim.instability().is_none());
    assert!(sim.last_dt() <= sim.config().dt);
}

#[test]
fn test_solid_cells_stay_empty() {
    let mut sim = Simulation::new(SimConfig::wind_tunnel(48, 24)).unwrap();
    for _ in 0..30 {
        sim.step();
    }
    sim.set_solid(20, 12, true).unwrap();

    let mask = sim.grid().mask().clone();
    let (u, v) = sim.read_velocity();
    let dye = sim.read_dye();
    for j in 0..sim.height() {
        for i in 0..sim.width() {
            if mask.is_solid(i, j) {
                assert_eq!((u[(i, j)], v[(i, j)], dye[(i, j)]), (0., 0., 0.));
            }
        }
    }
}

#[test]
fn test_wall_added_mid_flow_blocks_its_faces() {
    let mut sim = Simulation::new(SimConfig::wind_tunnel(48, 24)).unwrap();
    for _ in 0..30 {
        sim.step();
    }
    sim.set_solid(20, 12, true).unwrap();

    let faces = |sim: &Simulation| {
        let (u, v) = sim.read_velocity();
        [u[(20, 12)], u[(21, 12)], v[(20, 12)], v[(20, 13)]]
    };
    assert_eq!(faces(&sim), [0.; 4]);
    for _ in 0..50 {
        sim.step();
    }
    assert_eq!(faces(&sim), [0.; 4]);
    assert!(sim.instability().is_none());
}

#[test]
fn test_stable_dt_caps_fast_flow() {
    let config = SimConfig {
        inflows: vec![Inflow::column(1, 1000.)],
        cfl_limit: Some(1.),
        ..SimConfig::new(20, 20, 10, 0.01)
    };
    let sim = Simulation::new(config.clone()).unwrap();
    assert!((sim.stable_dt() - 0.01 / 1000.).abs() < 1e-9);

    let uncapped = Simulation::new(SimConfig {
        cfl_limit: None,
        ..config
    })
    .unwrap();
    assert_eq!(uncapped.stable_dt(), 1. / 200.);
}

#[test]
fn test_default_step_is_fixed() {
    let config = SimConfig {
        inflows: vec![Inflow::column(1, 1000.)],
        ..SimConfig::new(20, 20, 10, 0.01)
    };
    assert_eq!(config.cfl_limit, None);
    let mut sim = Simulation::new(config).unwrap();
    sim.step();
    assert_eq!(sim.last_dt(), 1. / 200.);
}

#[test]
fn test_guard_flags_non_finite_values() {
    let mut sim = closed_box(10, 10, 10);
    sim.grid_mut()
        .set_velocity(Component::Horizontal, 4, 4, f32::NAN)
        .unwrap();
    sim.step();
    assert!(matches!(
        sim.instability(),
        Some(SimError::NumericInstability { step: 1, .. })
    ));

    let mut quiet = Simulation::new(SimConfig {
        check_finite: false,
        ..SimConfig::new(10, 10, 10, 0.01)
    })
    .unwrap();
    quiet
        .grid_mut()
        .set_velocity(Component::Horizontal, 4, 4, f32::NAN)
        .unwrap();
    quiet.step();
    assert!(quiet.instability().is_none());
    assert!(quiet.check_finite().is_err());
}

#[test]
fn test_bundled_scene_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/scenes/wind_tunnel.ron");
    let config = SimConfig::load(path).unwrap();
    let mut sim = Simulation::new(config).unwrap();
    assert!(sim.grid().mask().is_solid(50, 45));
    assert_eq!(sim.inject_dye(150, 30, 1.), Ok(true));
    sim.step();
    assert!(sim.instability().is_none());
}
