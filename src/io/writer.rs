//! Writers that store functions in files, optionally as a series of time steps.
use super::vtk::MeshDataSetBuilder;
use super::xdmf::XdmfWriter;
use crate::config::Config;
use crate::space::{Function, SpaceKind};
use eyre::{eyre, WrapErr};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Violations of the step history of an output file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error("attempting to write unstepped function to timestepping output file")]
    UnsteppedInSteppedFile,
    #[error("attempting to write stepped function to unstepping output file")]
    SteppedInUnsteppedFile,
    #[error("trying to write to existing time step {step:?}")]
    DuplicateStep { step: Option<f64> },
}

/// Steps written to a file so far.
///
/// The first write decides whether the file is stepped. All later writes must agree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepHistory {
    stepped: Option<bool>,
    steps: Vec<Option<f64>>,
}

impl StepHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the file is stepped, or `None` before the first write.
    pub fn is_stepped(&self) -> Option<bool> {
        self.stepped
    }

    pub fn steps(&self) -> &[Option<f64>] {
        &self.steps
    }

    pub fn contains(&self, step: Option<f64>) -> bool {
        self.steps.contains(&step)
    }

    /// Checks that the step is consistent with previous writes and records it.
    pub fn check_step(&mut self, step: Option<f64>) -> Result<(), StepError> {
        match (self.stepped, step) {
            (None, _) => self.stepped = Some(step.is_some()),
            (Some(true), None) => return Err(StepError::UnsteppedInSteppedFile),
            (Some(false), Some(_)) => return Err(StepError::SteppedInUnsteppedFile),
            _ => {}
        }
        self.steps.push(step);
        Ok(())
    }
}

/// A file that functions are written to.
pub trait VariableWriter {
    fn path(&self) -> &Path;

    fn history(&self) -> &StepHistory;

    /// Writes the function under `name` (or its own name) at the given step.
    ///
    /// Fails if the function has an automatic name and no name is given, or if the step
    /// does not fit the steps written before.
    fn write(&mut self, variable: &Function<f64>, name: Option<&str>, step: Option<f64>) -> eyre::Result<()>;
}

/// The name a function is written under.
pub fn output_name(variable: &Function<f64>, name: Option<&str>) -> eyre::Result<String> {
    match name {
        Some(name) => Ok(name.to_string()),
        None if variable.is_named() => Ok(variable.name().to_string()),
        None => {
            error!("Attempted to write out an unnamed variable {}", variable.name());
            Err(eyre!("cannot write unnamed variable `{}` without a name", variable.name()))
        }
    }
}

pub(crate) fn create_parent_dir(path: &Path) -> eyre::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create output directory {}", parent.display())),
        _ => Ok(()),
    }
}

/// ParaView collection (`.pvd`) referencing one `.vtu` file per write.
///
/// Every step may only be written once.
#[derive(Debug)]
pub struct VtkWriter {
    path: PathBuf,
    history: StepHistory,
    // (time, file name relative to the collection)
    pieces: Vec<(f64, String)>,
}

impl VtkWriter {
    pub const SUFFIX: &'static str = "pvd";

    pub fn new(path: impl Into<PathBuf>) -> eyre::Result<Self> {
        let path = path.into();
        check_suffix(&path, Self::SUFFIX)?;
        Ok(Self {
            path,
            history: StepHistory::new(),
            pieces: Vec::new(),
        })
    }

    fn write_collection(&self) -> eyre::Result<()> {
        let mut pvd = String::new();
        writeln!(pvd, "<?xml version=\"1.0\"?>")?;
        writeln!(pvd, "<VTKFile type=\"Collection\" version=\"0.1\">")?;
        writeln!(pvd, "  <Collection>")?;
        for (time, file) in &self.pieces {
            writeln!(pvd, "    <DataSet timestep=\"{time}\" part=\"0\" file=\"{file}\" />")?;
        }
        writeln!(pvd, "  </Collection>")?;
        writeln!(pvd, "</VTKFile>")?;
        std::fs::write(&self.path, pvd).wrap_err_with(|| format!("failed to write {}", self.path.display()))
    }
}

impl VariableWriter for VtkWriter {
    fn path(&self) -> &Path {
        &self.path
    }

    fn history(&self) -> &StepHistory {
        &self.history
    }

    fn write(&mut self, variable: &Function<f64>, name: Option<&str>, step: Option<f64>) -> eyre::Result<()> {
        let name = output_name(variable, name)?;
        if self.history.contains(step) {
            return Err(StepError::DuplicateStep { step }.into());
        }
        self.history.check_step(step)?;

        create_parent_dir(&self.path)?;
        let stem = self
            .path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let piece = format!("{stem}{:06}.vtu", self.pieces.len());
        let piece_path = self.path.with_file_name(&piece);

        MeshDataSetBuilder::from_mesh(variable.space().mesh())
            .with_title(name.as_str())
            .with_function(variable, &name)?
            .try_export(&piece_path)?;

        self.pieces.push((step.unwrap_or(0.0), piece));
        self.write_collection()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonFunctionStep {
    pub name: String,
    pub step: Option<f64>,
    pub values: Vec<f64>,
}

/// Contents of a function file written by [`JsonWriter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonFunctionFile {
    pub space: SpaceKind,
    pub dof_coordinates: Vec<[f64; 2]>,
    pub steps: Vec<JsonFunctionStep>,
}

impl JsonFunctionFile {
    pub fn read(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).wrap_err_with(|| format!("failed to open {}", path.display()))?;
        serde_json::from_reader(std::io::BufReader::new(file))
            .wrap_err_with(|| format!("failed to parse function file {}", path.display()))
    }
}

/// Function values and degree of freedom coordinates as JSON.
#[derive(Debug)]
pub struct JsonWriter {
    path: PathBuf,
    history: StepHistory,
    contents: Option<JsonFunctionFile>,
}

impl JsonWriter {
    pub const SUFFIX: &'static str = "json";

    pub fn new(path: impl Into<PathBuf>) -> eyre::Result<Self> {
        let path = path.into();
        check_suffix(&path, Self::SUFFIX)?;
        Ok(Self {
            path,
            history: StepHistory::new(),
            contents: None,
        })
    }
}

impl VariableWriter for JsonWriter {
    fn path(&self) -> &Path {
        &self.path
    }

    fn history(&self) -> &StepHistory {
        &self.history
    }

    fn write(&mut self, variable: &Function<f64>, name: Option<&str>, step: Option<f64>) -> eyre::Result<()> {
        let name = output_name(variable, name)?;
        self.history.check_step(step)?;

        let space = variable.space();
        let contents = self.contents.get_or_insert_with(|| JsonFunctionFile {
            space: space.kind(),
            dof_coordinates: space
                .tabulate_dof_coordinates()
                .iter()
                .map(|p| [p.x, p.y])
                .collect(),
            steps: Vec::new(),
        });
        if contents.space != space.kind() || contents.dof_coordinates.len() != space.dim() {
            return Err(eyre!(
                "function `{}` does not match the space of earlier writes to {}",
                name,
                self.path.display()
            ));
        }
        contents.steps.push(JsonFunctionStep {
            name,
            step,
            values: variable.values().to_vec(),
        });

        create_parent_dir(&self.path)?;
        let file = File::create(&self.path).wrap_err_with(|| format!("failed to create {}", self.path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), contents)
            .wrap_err_with(|| format!("failed to write {}", self.path.display()))
    }
}

pub(crate) fn check_suffix(path: &Path, suffix: &str) -> eyre::Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext == suffix => Ok(()),
        _ => Err(eyre!("expected a .{} file, got {}", suffix, path.display())),
    }
}

/// Creates the writer matching the file suffix (`.pvd`, `.xdmf` or `.json`).
pub fn writer_for_path(path: impl Into<PathBuf>) -> eyre::Result<Box<dyn VariableWriter>> {
    let path = path.into();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(VtkWriter::SUFFIX) => Ok(Box::new(VtkWriter::new(path)?)),
        Some(XdmfWriter::SUFFIX) => Ok(Box::new(XdmfWriter::new(path)?)),
        Some(JsonWriter::SUFFIX) => Ok(Box::new(JsonWriter::new(path)?)),
        _ => Err(eyre!("no writer for output file {}", path.display())),
    }
}

/// Writes a function in every format of `io.output_var_format`.
///
/// Files are named `<outdir>/<phase_name>/<phase_suffix>/<run_name><phase_suffix>_<name>`
/// with the suffix of each format. Returns the paths written.
pub fn write_variable(
    variable: &Function<f64>,
    config: &Config,
    name: Option<&str>,
    outdir: &Path,
    phase_name: &str,
    phase_suffix: &str,
) -> eyre::Result<Vec<PathBuf>> {
    let name = output_name(variable, name)?;
    let base = outdir
        .join(phase_name)
        .join(phase_suffix)
        .join(format!("{}{}_{}", config.io.run_name, phase_suffix, name));

    let mut paths = Vec::new();
    for suffix in config.io.output_var_format.suffixes() {
        let mut path = base.clone().into_os_string();
        path.push(suffix);
        let path = PathBuf::from(path);
        writer_for_path(path.clone())?.write(variable, Some(&name), None)?;
        paths.push(path);
    }

    info!("Writing function {} to file {}", name, base.display());
    Ok(paths)
}
