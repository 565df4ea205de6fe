use super::data_output_path;
use fenics_ice::config::Config;
use fenics_ice::input::InputData;
use fenics_ice::io::diagnostics::{dict_to_csv, write_inversion_info, write_qval, INVERSION_INFO_HEADER};
use fenics_ice::io::msh::load_msh_from_file;
use fenics_ice::io::writer::{write_variable, JsonFunctionFile};
use fenics_ice::logging::{log_preamble, setup_logging};
use fenics_ice::model::{bglen_to_beta, Model};
use fenics_ice::space::Function;
use matrixcompare::assert_scalar_eq;
use serde_json::json;
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

const N: usize = 8;
const L: f64 = 4000.0;

/// Gmsh mesh of `[0, L]^2` with `N x N` squares split into triangles.
fn write_square_msh(path: &Path) {
    let h = L / N as f64;
    let num_nodes = (N + 1) * (N + 1);
    let num_elements = 2 * N * N;

    let mut msh = String::new();
    writeln!(msh, "$MeshFormat\n4.1 0 8\n$EndMeshFormat").unwrap();
    writeln!(msh, "$Nodes\n1 {num_nodes} 1 {num_nodes}\n2 1 0 {num_nodes}").unwrap();
    for tag in 1..=num_nodes {
        writeln!(msh, "{tag}").unwrap();
    }
    for j in 0..=N {
        for i in 0..=N {
            writeln!(msh, "{} {} 0", i as f64 * h, j as f64 * h).unwrap();
        }
    }
    writeln!(msh, "$EndNodes").unwrap();
    writeln!(msh, "$Elements\n1 {num_elements} 1 {num_elements}\n2 1 2 {num_elements}").unwrap();
    let node = |i: usize, j: usize| (N + 1) * j + i + 1;
    let mut tag = 1;
    for j in 0..N {
        for i in 0..N {
            writeln!(msh, "{} {} {} {}", tag, node(i, j), node(i + 1, j), node(i + 1, j + 1)).unwrap();
            writeln!(msh, "{} {} {} {}", tag + 1, node(i, j), node(i + 1, j + 1), node(i, j + 1)).unwrap();
            tag += 2;
        }
    }
    writeln!(msh, "$EndElements").unwrap();
    std::fs::write(path, msh).unwrap();
}

fn surface_slope(x: f64, y: f64) -> f64 {
    1000.0 - 0.1 * x + 0.05 * y
}

/// Gridded geometry on a grid extending beyond the mesh, stored `[y][x]` with decreasing y.
fn write_geometry(path: &Path) {
    let x: Vec<f64> = (0..=10).map(|i| -500.0 + 500.0 * i as f64).collect();
    let y: Vec<f64> = (0..=10).rev().map(|j| -500.0 + 500.0 * j as f64).collect();
    let grid = |f: &dyn Fn(f64, f64) -> f64| -> Vec<Vec<f64>> {
        y.iter().map(|&y| x.iter().map(|&x| f(x, y)).collect()).collect()
    };
    let data = json!({
        "x": x,
        "y": y,
        "bed": grid(&|x, y| -surface_slope(x, y)),
        "thick": grid(&surface_slope),
        "alpha": grid(&|_, _| 20.0),
        "Bglen": grid(&|_, _| 1.0e4),
    });
    std::fs::write(path, serde_json::to_string(&data).unwrap()).unwrap();
}

/// Scattered velocity observations with `u = 100 + 0.01 x`, `v = 0`.
fn write_velocity(path: &Path) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for j in 0..=12 {
        for i in 0..=12 {
            // Shift alternate rows to avoid a regular lattice
            let shift = if j % 2 == 0 { 0.0 } else { 150.0 };
            x.push(-300.0 + shift + 380.0 * i as f64);
            y.push(-300.0 + 380.0 * j as f64);
        }
    }
    let n = x.len();
    let u: Vec<f64> = x.iter().map(|x| 100.0 + 0.01 * x).collect();
    let data = json!({
        "x": x,
        "y": y,
        "u_obs": u,
        "v_obs": vec![0.0; n],
        "u_std": vec![1.0; n],
        "v_std": vec![1.0; n],
        "mask_vel": vec![1.0; n],
    });
    std::fs::write(path, serde_json::to_string(&data).unwrap()).unwrap();
}

#[test]
fn model_is_loaded_from_files_and_written_out() {
    let dir = data_output_path("pipeline");
    write_square_msh(&dir.join("mesh.msh"));
    write_geometry(&dir.join("geometry.json"));
    write_velocity(&dir.join("velocity.json"));

    let config_path = dir.join("config.toml");
    let output_dir = dir.join("output");
    std::fs::write(
        &config_path,
        format!(
            r#"
[io]
input_dir = "{input_dir}"
output_dir = "{output_dir}"
run_name = "square"
data_file = "geometry.json"
output_var_format = "all"
log_level = "warning"

[obs]
vel_file = "velocity.json"

[mesh]
mesh_filename = "mesh.msh"

[ice_dynamics]
min_thickness = 10.0

[time]
run_length = 2.0
total_steps = 4
"#,
            input_dir = dir.display(),
            output_dir = output_dir.display()
        ),
    )
    .unwrap();

    let config = Config::from_file(&config_path).unwrap();
    setup_logging(&config.io.log_level).unwrap();
    log_preamble("inversion", &config).unwrap();

    let mesh = load_msh_from_file(config.mesh_path().unwrap()).unwrap();
    assert_eq!(mesh.num_vertices(), (N + 1) * (N + 1));
    assert_eq!(mesh.num_cells(), 2 * N * N);

    let input_data = InputData::from_config(&config).unwrap();
    assert!(input_data.has_field("Bglen"));
    assert!(!input_data.has_field("smb"));

    let mut model = Model::initialize(Arc::new(mesh), input_data, config.clone()).unwrap();
    model.alpha_from_data().unwrap();
    model.bglen_from_data(false).unwrap();

    let geometry = model.geometry().unwrap();
    for (p, value) in model.m().tabulate_dof_coordinates().iter().zip(geometry.thick.values()) {
        assert_scalar_eq!(*value, surface_slope(p.x, p.y), comp = abs, tol = 1e-8);
    }
    assert!(geometry.smb.values().iter().all(|&v| v == 0.0));
    assert!(model.bglen_mask().unwrap().values().iter().all(|&v| v == 1.0));

    let vel = model.vel_obs_fields().unwrap();
    for (p, value) in model.q().tabulate_dof_coordinates().iter().zip(vel.u_obs_q.values()) {
        assert_scalar_eq!(*value, 100.0 + 0.01 * p.x, comp = abs, tol = 1e-8);
    }

    let beta_values = model.bglen().unwrap().values().iter().map(|&b| bglen_to_beta(b)).collect();
    let beta = Function::from_values(Arc::clone(model.q()), "beta", beta_values).unwrap();
    let paths = write_variable(&beta, &config, None, &output_dir, "inversion", "").unwrap();
    assert_eq!(paths.len(), 3);
    assert!(paths.iter().all(|path| path.exists()));

    let json = JsonFunctionFile::read(&paths[2]).unwrap();
    assert_eq!(json.steps.len(), 1);
    assert!(json.steps[0].values.iter().all(|&v| (v - 100.0).abs() < 1e-8));

    let thick_paths = write_variable(&geometry.thick, &config, None, &output_dir, "inversion", "").unwrap();
    assert!(thick_paths[0].ends_with("square_thick.pvd"));

    let info = write_inversion_info(&config, &[[1.0, 0.1, 0.01, 0.001]], INVERSION_INFO_HEADER).unwrap();
    assert!(info.exists());
    let csv = dict_to_csv([("alpha_mean", 20.0)], "summary", &config).unwrap();
    assert!(csv.exists());
    let qval = write_qval(&[0.0, 1.0, 2.0, 3.0, 4.0], &config).unwrap();
    assert_eq!(qval, output_dir.join("forward").join("Qval_ts.json"));
}
