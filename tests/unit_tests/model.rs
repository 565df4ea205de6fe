use crate::{gridded_values, square_mesh_4x4, write_json};
use fenics_ice::config::Config;
use fenics_ice::error::Error;
use fenics_ice::input::{InputData, InputDataField, VelocityObservations};
use fenics_ice::model::{beta_to_bglen, bglen_to_beta, surface_elevation, Model};
use fenics_ice::scattered::ScatteredPointSet;
use fenics_ice::space::SpaceKind;
use matrixcompare::assert_scalar_eq;
use nalgebra::Point2;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use util::unit_test_output_dir;

const GRID: [f64; 5] = [0.0, 1.0, 2.0, 3.0, 4.0];

fn thickness(x: f64, y: f64) -> f64 {
    100.0 * x + 10.0 * y
}

fn bed(x: f64, y: f64) -> f64 {
    -500.0 + x - y
}

/// Writes a data file with bed, thickness and a Bglen mask that is zero on the line `x = 0`.
fn write_input_file(path: &Path) {
    write_json(
        path,
        &json!({
            "x": GRID,
            "y": GRID,
            "bed": gridded_values(&GRID, &GRID, bed),
            "thick": gridded_values(&GRID, &GRID, thickness),
            "Bglen": gridded_values(&GRID, &GRID, |_, _| 600.0),
            "Bglenmask": gridded_values(&GRID, &GRID, |x, _| if x < 0.5 { 0.0 } else { 1.0 }),
        }),
    );
}

fn input_data(path: &Path, names: &[&str]) -> InputData {
    InputData::from_fields(
        names
            .iter()
            .map(|&name| (name.to_string(), InputDataField::read(path, name).unwrap().unwrap())),
    )
}

/// Composite observations on a lattice enclosing the mesh, with `u = 2x + y` and `v = -x`.
fn linear_observations() -> VelocityObservations {
    let points: Vec<_> = (0..7)
        .flat_map(|j| (0..7).map(move |i| Point2::new(-1.0 + i as f64 * 1.0, -1.0 + j as f64 * 1.0)))
        .collect();
    let array = |f: fn(&Point2<f64>) -> f64| points.iter().map(f).collect::<Vec<_>>();
    let composite = ScatteredPointSet::from_points(points.clone())
        .with_values("u_obs", array(|p| 2.0 * p.x + p.y))
        .unwrap()
        .with_values("v_obs", array(|p| -p.x))
        .unwrap()
        .with_values("u_std", array(|_| 1.0))
        .unwrap()
        .with_values("v_std", array(|_| 2.0))
        .unwrap()
        .with_values("mask_vel", array(|_| 1.0))
        .unwrap();
    VelocityObservations::from_point_sets(composite.clone(), composite)
}

#[test]
fn model_spaces_are_built_on_the_mesh() {
    let model = Model::new(Arc::new(square_mesh_4x4()), InputData::default(), Config::default());
    assert_eq!(model.q().kind(), SpaceKind::Lagrange1);
    assert_eq!(model.m().kind(), SpaceKind::Dg0);
    assert_eq!(model.q().dim(), 25);
    assert_eq!(model.m().dim(), 32);
    assert!(Arc::ptr_eq(model.space(SpaceKind::Dg0), model.m()));
    assert!(Arc::ptr_eq(model.q().mesh(), model.mesh()));
    assert!(model.geometry().is_none());
    assert!(model.vel_obs_fields().is_none());
}

#[test]
fn geometry_fields_are_loaded_with_defaults_and_minimum_thickness() {
    let dir = unit_test_output_dir("model/init_fields");
    let path = dir.join("data.json");
    write_input_file(&path);

    let mut config = Config::default();
    config.ice_dynamics.min_thickness = 50.0;
    let mut model = Model::new(Arc::new(square_mesh_4x4()), input_data(&path, &["bed", "thick"]), config);
    let geometry = model.init_fields_from_data().unwrap().clone();

    for (p, value) in model.q().tabulate_dof_coordinates().iter().zip(geometry.bed.values()) {
        assert_scalar_eq!(*value, bed(p.x, p.y), comp = abs, tol = 1e-10);
    }
    assert!(geometry.bmelt.values().iter().all(|&v| v == 0.0));
    assert!(geometry.smb.values().iter().all(|&v| v == 0.0));
    assert_eq!(geometry.thick.space().kind(), SpaceKind::Dg0);
    for (p, value) in model.m().tabulate_dof_coordinates().iter().zip(geometry.thick.values()) {
        assert_scalar_eq!(*value, thickness(p.x, p.y).max(50.0), comp = abs, tol = 1e-10);
    }
    assert!(model.geometry().is_some());
}

#[test]
fn surface_elevation_follows_flotation() {
    // Grounded: thickness exceeds the flotation thickness 1000 / 917 * 100
    assert_scalar_eq!(surface_elevation(-100.0, 200.0, 917.0, 1000.0), 100.0, comp = abs, tol = 1e-12);
    // Floating: freeboard is the fraction 1 - rhoi / rhow of the thickness
    assert_scalar_eq!(surface_elevation(-100.0, 100.0, 917.0, 1000.0), 8.3, comp = abs, tol = 1e-12);
    // Ice on a bed above sea level is always grounded
    assert_scalar_eq!(surface_elevation(20.0, 0.0, 917.0, 1000.0), 20.0, comp = abs, tol = 1e-12);
}

#[test]
fn surface_is_computed_on_q_for_grounded_and_floating_ice() {
    let dir = unit_test_output_dir("model/surface");
    let path = dir.join("data.json");
    write_json(
        &path,
        &json!({
            "x": GRID,
            "y": GRID,
            "bed": gridded_values(&GRID, &GRID, |_, _| -100.0),
            "thick": gridded_values(&GRID, &GRID, thickness),
        }),
    );

    let mut config = Config::default();
    config.ice_dynamics.min_thickness = 5.0;
    config.constants.rhoi = 900.0;
    config.constants.rhow = 1000.0;
    let mut model = Model::new(Arc::new(square_mesh_4x4()), input_data(&path, &["bed", "thick"]), config);
    let geometry = model.init_fields_from_data().unwrap().clone();

    assert_eq!(geometry.surf.space().kind(), SpaceKind::Lagrange1);
    assert_eq!(geometry.surf.name(), "surf");

    let (mut grounded, mut floating) = (0, 0);
    for (p, value) in model.q().tabulate_dof_coordinates().iter().zip(geometry.surf.values()) {
        let thick = thickness(p.x, p.y).max(5.0);
        // Flotation thickness is 1000 / 900 * 100
        let expected = if thick <= 1000.0 / 9.0 {
            floating += 1;
            0.1 * thick
        } else {
            grounded += 1;
            thick - 100.0
        };
        assert_scalar_eq!(*value, expected, comp = abs, tol = 1e-9);
    }
    assert!(grounded > 0 && floating > 0);
}

#[test]
fn geometry_requires_bed_data() {
    let mut model = Model::new(Arc::new(square_mesh_4x4()), InputData::default(), Config::default());
    let result = model.init_fields_from_data().map(|_| ());
    assert!(matches!(result, Err(Error::MissingField { name }) if name == "bed"));
}

#[test]
fn bglen_mask_excludes_cells_touching_masked_vertices() {
    let dir = unit_test_output_dir("model/bglen");
    let path = dir.join("data.json");
    write_input_file(&path);

    let mut model = Model::new(
        Arc::new(square_mesh_4x4()),
        input_data(&path, &["Bglen", "Bglenmask"]),
        Config::default(),
    );
    model.bglen_from_data(false).unwrap();

    assert!(model.bglen().unwrap().values().iter().all(|&v| (v - 600.0).abs() < 1e-10));
    let mask = model.bglen_mask().unwrap();
    assert_eq!(mask.name(), "bglen_mask");
    // Only the cells in the first column of squares touch the line x = 0
    for (p, &value) in model.m().tabulate_dof_coordinates().iter().zip(mask.values()) {
        let expected = if p.x < 1.0 { 0.0 } else { 1.0 };
        assert_eq!(value, expected);
    }
    assert_eq!(mask.values().iter().sum::<f64>(), 24.0);
}

#[test]
fn bglen_mask_defaults_to_unmasked() {
    let mut model = Model::new(Arc::new(square_mesh_4x4()), InputData::default(), Config::default());

    let result = model.bglen_from_data(false);
    assert!(matches!(result, Err(Error::MissingField { name }) if name == "Bglen"));

    model.bglen_from_data(true).unwrap();
    assert!(model.bglen().is_none());
    assert!(model.bglen_mask().unwrap().values().iter().all(|&v| v == 1.0));
}

#[test]
fn alpha_is_required() {
    let mut model = Model::new(Arc::new(square_mesh_4x4()), InputData::default(), Config::default());
    assert!(matches!(model.alpha_from_data(), Err(Error::MissingField { .. })));
}

#[test]
fn velocity_observations_are_interpolated_onto_both_spaces() {
    let mut model = Model::new(Arc::new(square_mesh_4x4()), InputData::default(), Config::default());
    let fields = model.vel_obs_from_observations(linear_observations()).unwrap().clone();

    for (p, value) in model.q().tabulate_dof_coordinates().iter().zip(fields.u_obs_q.values()) {
        assert_scalar_eq!(*value, 2.0 * p.x + p.y, comp = abs, tol = 1e-10);
    }
    for (p, value) in model.m().tabulate_dof_coordinates().iter().zip(fields.v_obs_m.values()) {
        assert_scalar_eq!(*value, -p.x, comp = abs, tol = 1e-10);
    }
    assert!(fields.v_std_q.values().iter().all(|&v| (v - 2.0).abs() < 1e-12));
    assert!(fields.mask_vel_m.values().iter().all(|&v| (v - 1.0).abs() < 1e-12));
    assert_eq!(fields.u_obs_m.name(), "u_obs");
    assert_eq!(fields.u_obs_m.space().kind(), SpaceKind::Dg0);
    assert!(model.vel_obs().is_some());
}

#[test]
fn velocity_observations_without_mask_are_rejected() {
    let observations = linear_observations();
    let cloud = observations.cloud().clone();
    let composite = ScatteredPointSet::from_points(cloud.points().to_vec())
        .with_values("u_obs", cloud.values("u_obs").unwrap().to_vec())
        .unwrap();

    let mut model = Model::new(Arc::new(square_mesh_4x4()), InputData::default(), Config::default());
    let result = model
        .vel_obs_from_observations(VelocityObservations::from_point_sets(cloud, composite))
        .map(|_| ());
    assert!(matches!(result, Err(Error::MissingField { .. })));
}

#[test]
fn velocity_observations_are_read_from_configured_file() {
    let dir = unit_test_output_dir("model/vel_obs");
    let x: Vec<f64> = (0..5).flat_map(|_| GRID).collect();
    let y: Vec<f64> = GRID.iter().flat_map(|&y| [y; 5]).collect();
    let u: Vec<f64> = x.iter().map(|x| 3.0 * x).collect();
    write_json(
        dir.join("vel.json"),
        &json!({
            "x": x,
            "y": y,
            "u_obs": u,
            "v_obs": vec![0.0; 25],
            "u_std": vec![1.0; 25],
            "v_std": vec![1.0; 25],
            "mask_vel": vec![1.0; 25],
        }),
    );

    let mut config = Config::default();
    config.io.input_dir = dir.clone();
    config.obs.vel_file = Some("vel.json".to_string());
    let mut model = Model::new(Arc::new(square_mesh_4x4()), InputData::default(), config);
    let fields = model.vel_obs_from_data().unwrap();
    for (p, value) in fields.u_obs_q.space().tabulate_dof_coordinates().iter().zip(fields.u_obs_q.values()) {
        assert_scalar_eq!(*value, 3.0 * p.x, comp = abs, tol = 1e-10);
    }

    let mut unconfigured = Model::new(Arc::new(square_mesh_4x4()), InputData::default(), Config::default());
    assert!(unconfigured.vel_obs_from_data().is_err());
}

#[test]
fn initialize_loads_geometry_and_observations() {
    let dir = unit_test_output_dir("model/initialize");
    write_input_file(&dir.join("data.json"));

    let mut config = Config::default();
    config.io.input_dir = dir.clone();
    config.obs.vel_file = Some("missing_vel.json".to_string());
    let result = Model::initialize(
        Arc::new(square_mesh_4x4()),
        input_data(&dir.join("data.json"), &["bed", "thick"]),
        config,
    );
    let error = result.unwrap_err();
    assert!(format!("{error:?}").contains("Couldn't find velocity observations file"));
}

#[test]
fn beta_is_square_root_of_bglen() {
    assert_eq!(bglen_to_beta(900.0), 30.0);
    assert_eq!(beta_to_bglen(30.0), 900.0);
    assert_scalar_eq!(beta_to_bglen(bglen_to_beta(2.0)), 2.0, comp = abs, tol = 1e-14);
}
