use fenics_ice::config::{merge_tables, Config, OutputFormat};
use std::path::{Path, PathBuf};

#[test]
fn empty_document_gives_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.io.input_dir, PathBuf::from("input"));
    assert_eq!(config.io.output_dir, PathBuf::from("output"));
    assert_eq!(config.io.run_name, "fenics_ice");
    assert_eq!(config.io.log_level, "info");
    assert_eq!(config.io.output_var_format, OutputFormat::Pvd);
    assert_eq!(config.inversion.phase_name, "inversion");
    assert_eq!(config.time.phase_name, "forward");
    assert!(!config.inversion.use_cloud_point_velocities);
    assert_eq!((config.constants.rhoi, config.constants.rhow), (917.0, 1000.0));
    assert_eq!(config.mesh_path(), None);
    assert_eq!(config.vel_file_path(), None);
}

#[test]
fn partial_document_overrides_named_settings_only() {
    let config = Config::from_toml_str(
        r#"
        [io]
        input_dir = "data/ismipc"
        data_file = "ismipc_input.json"
        output_var_format = "all"

        [io.fields.bglen]
        data_file = "bglen.json"
        field_name = "B"

        [obs]
        vel_file = "ismipc_U_obs.json"

        [mesh]
        mesh_filename = "ismip_mesh.msh"

        [ice_dynamics]
        min_thickness = 10.0

        [constants]
        rhoi = 910.0

        [solver]
        tolerance = 1e-6
        "#,
    )
    .unwrap();

    assert_eq!(config.io.data_file.as_deref(), Some("ismipc_input.json"));
    assert_eq!(config.io.output_var_format, OutputFormat::All);
    assert_eq!(config.io.run_name, "fenics_ice");
    assert_eq!(config.io.fields["bglen"].field_name.as_deref(), Some("B"));
    assert_eq!(config.ice_dynamics.min_thickness, 10.0);
    assert_eq!(config.constants.rhoi, 910.0);
    assert_eq!(config.constants.rhow, 1000.0);
    assert_eq!(config.mesh_path(), Some(Path::new("data/ismipc/ismip_mesh.msh").to_path_buf()));
    assert_eq!(config.vel_file_path(), Some(Path::new("data/ismipc/ismipc_U_obs.json").to_path_buf()));
}

#[test]
fn invalid_values_are_reported() {
    assert!(Config::from_toml_str("[io]\noutput_var_format = \"hdf5\"").is_err());
    assert!(Config::from_toml_str("[time]\ntotal_steps = -1").is_err());
    assert!(Config::from_file("this/file/does/not/exist.toml").is_err());
}

#[test]
fn overrides_merge_nested_tables() {
    let config = Config::from_toml_str("[io]\nrun_name = \"base\"\ndata_file = \"a.json\"").unwrap();
    let overridden = config
        .with_overrides("[io]\nrun_name = \"override\"\n[time]\ntotal_steps = 10")
        .unwrap();

    assert_eq!(overridden.io.run_name, "override");
    assert_eq!(overridden.io.data_file.as_deref(), Some("a.json"));
    assert_eq!(overridden.time.total_steps, 10);
    assert_eq!(overridden.time.run_length, 1.0);
    assert_eq!(config.io.run_name, "base");

    assert!(config.with_overrides("[time]\ntotal_steps = \"many\"").is_err());
}

#[test]
fn configuration_survives_toml_round_trip() {
    let config = Config::from_toml_str("[inversion]\nphase_suffix = \"_it1\"\n[io.fields.smb]\nfield_name = \"acc\"").unwrap();
    let reparsed = Config::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
    assert_eq!(reparsed, config);
}

#[test]
fn merge_tables_replaces_leaves_and_recurses_into_tables() {
    let mut base: toml::Table = "a = 1\n[t]\nx = 1\ny = 2".parse().unwrap();
    let overrides: toml::Table = "b = 2\n[t]\ny = 3\nz = 4".parse().unwrap();
    merge_tables(&mut base, overrides);

    let expected: toml::Table = "a = 1\nb = 2\n[t]\nx = 1\ny = 3\nz = 4".parse().unwrap();
    assert_eq!(base, expected);
}

#[test]
fn output_format_parses_from_str() {
    assert_eq!("XDMF".parse::<OutputFormat>().unwrap(), OutputFormat::Xdmf);
    assert!("vtu".parse::<OutputFormat>().is_err());
    assert_eq!(OutputFormat::All.suffixes(), &[".pvd", ".xdmf", ".json"]);
    assert_eq!(OutputFormat::Json.to_string(), "json");
}
