//! Run configuration read from TOML files.
//!
//! Every field has a default, so a configuration file only needs to name the settings it
//! changes. Sections that are not recognised (for example solver settings consumed by other
//! tools) are ignored.
use eyre::{eyre, WrapErr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub io: IoConfig,
    pub obs: ObsConfig,
    pub inversion: InversionConfig,
    pub time: TimeConfig,
    pub ice_dynamics: IceDynamicsConfig,
    pub constants: ConstantsConfig,
    pub mesh: MeshConfig,
}

/// Output formats for function files.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pvd,
    Xdmf,
    Json,
    All,
}

impl OutputFormat {
    /// File suffixes (including the leading dot) written for this format.
    pub fn suffixes(&self) -> &'static [&'static str] {
        match self {
            OutputFormat::Pvd => &[".pvd"],
            OutputFormat::Xdmf => &[".xdmf"],
            OutputFormat::Json => &[".json"],
            OutputFormat::All => &[".pvd", ".xdmf", ".json"],
        }
    }
}

impl FromStr for OutputFormat {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pvd" => Ok(Self::Pvd),
            "xdmf" => Ok(Self::Xdmf),
            "json" => Ok(Self::Json),
            "all" => Ok(Self::All),
            _ => Err(eyre!("unrecognised output format `{}`", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Pvd => "pvd",
            OutputFormat::Xdmf => "xdmf",
            OutputFormat::Json => "json",
            OutputFormat::All => "all",
        };
        write!(f, "{name}")
    }
}

/// Where a single input field is read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSourceConfig {
    /// Data file relative to `io.input_dir`. Falls back to `io.data_file`.
    pub data_file: Option<String>,
    /// Dataset name inside the file. Defaults to the field name.
    pub field_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub diagnostics_dir: PathBuf,
    pub run_name: String,
    pub data_file: Option<String>,
    pub log_level: String,
    pub output_var_format: OutputFormat,
    pub qoi_file: String,
    pub inversion_file: Option<String>,
    /// Per-field data sources, keyed by lower case field name.
    pub fields: BTreeMap<String, FieldSourceConfig>,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            diagnostics_dir: PathBuf::from("diagnostics"),
            run_name: "fenics_ice".to_string(),
            data_file: None,
            log_level: "info".to_string(),
            output_var_format: OutputFormat::default(),
            qoi_file: "Qval_ts.json".to_string(),
            inversion_file: None,
            fields: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObsConfig {
    /// Velocity observation file relative to `io.input_dir`.
    pub vel_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InversionConfig {
    pub use_cloud_point_velocities: bool,
    pub phase_name: String,
    pub phase_suffix: String,
}

impl Default for InversionConfig {
    fn default() -> Self {
        Self {
            use_cloud_point_velocities: false,
            phase_name: "inversion".to_string(),
            phase_suffix: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub run_length: f64,
    pub total_steps: usize,
    pub phase_name: String,
    pub phase_suffix: String,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            run_length: 1.0,
            total_steps: 1,
            phase_name: "forward".to_string(),
            phase_suffix: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IceDynamicsConfig {
    pub min_thickness: f64,
}

/// Physical constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantsConfig {
    /// Ice density (kg m^-3).
    pub rhoi: f64,
    /// Sea water density (kg m^-3).
    pub rhow: f64,
}

impl Default for ConstantsConfig {
    fn default() -> Self {
        Self {
            rhoi: 917.0,
            rhow: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Mesh file relative to `io.input_dir`.
    pub mesh_filename: Option<String>,
    pub periodic_bc: bool,
}

impl Config {
    pub fn from_toml_str(toml_str: &str) -> eyre::Result<Self> {
        toml::from_str(toml_str).wrap_err("failed to parse configuration")
    }

    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read configuration file {}", path.display()))?;
        Self::from_toml_str(&contents).wrap_err_with(|| format!("invalid configuration file {}", path.display()))
    }

    /// Returns a copy of the configuration with the given TOML document merged on top.
    ///
    /// Tables are merged recursively, all other values in `overrides` replace those in `self`.
    pub fn with_overrides(&self, overrides: &str) -> eyre::Result<Self> {
        let overrides: toml::Table = overrides.parse().wrap_err("failed to parse configuration overrides")?;
        let mut merged = match toml::Value::try_from(self)? {
            toml::Value::Table(table) => table,
            _ => return Err(eyre!("configuration did not serialize to a table")),
        };
        merge_tables(&mut merged, overrides);
        toml::Value::Table(merged)
            .try_into()
            .wrap_err("configuration overrides are invalid")
    }

    pub fn to_toml_string(&self) -> eyre::Result<String> {
        toml::to_string_pretty(self).wrap_err("failed to serialize configuration")
    }

    pub fn mesh_path(&self) -> Option<PathBuf> {
        self.mesh.mesh_filename.as_ref().map(|name| self.io.input_dir.join(name))
    }

    pub fn vel_file_path(&self) -> Option<PathBuf> {
        self.obs.vel_file.as_ref().map(|name| self.io.input_dir.join(name))
    }
}

/// Recursively merges `overrides` into `base`.
pub fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(override_table)) => {
                merge_tables(base_table, override_table)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
