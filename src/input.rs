//! Gridded input data and velocity observations.
use crate::config::Config;
use crate::error::{Error, Result};
use crate::grid::{GridInterpolationMethod, GridInterpolationOptions, RegularGrid2d};
use crate::space::{Function, FunctionSpace};
use eyre::{eyre, WrapErr};
use log::{info, warn};
use nalgebra::{DMatrix, Point2};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod source;
mod velocity;

pub use source::*;
pub use velocity::*;

/// Fields that [`InputData`] looks for in the configured data files.
pub const INPUT_FIELD_NAMES: [&str; 10] = [
    "thick",
    "bed",
    "bmelt",
    "smb",
    "Bglen",
    "Bglenmask",
    "alpha",
    "melt_depth_therm",
    "melt_max",
    "vaf_mask",
];

/// Relative tolerance on the spacing of gridded input data.
const GRID_SPACING_TOLERANCE: f64 = 1e-6;

/// A single gridded field read from a data file.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDataField {
    path: PathBuf,
    field_name: String,
    grid: RegularGrid2d<f64>,
}

impl InputDataField {
    /// Reads the field from the file at `path`. See [`from_source`](Self::from_source).
    pub fn read(path: impl AsRef<Path>, field_name: &str) -> eyre::Result<Option<Self>> {
        let source = open_data_file(path)?;
        Self::from_source(source.as_ref(), field_name)
    }

    /// Reads the field together with the `x` and `y` axes of its grid.
    ///
    /// The field is stored as `[y][x]` in the file. Axes given in decreasing order are flipped.
    /// Returns `None` if any of the three datasets is missing.
    pub fn from_source(source: &dyn DataSource, field_name: &str) -> eyre::Result<Option<Self>> {
        let path = source.path().to_path_buf();
        let (Some(x), Some(y), Some(field)) = (source.read("x")?, source.read("y")?, source.read(field_name)?) else {
            return Ok(None);
        };
        let mut x = x.into_vector("x")?;
        let mut y = y.into_vector("y")?;

        if field.shape() != [y.len(), x.len()] {
            return Err(eyre!(
                "data have wrong shape in {}: field `{}` has shape {:?}, expected [{}, {}]",
                path.display(),
                field_name,
                field.shape(),
                y.len(),
                x.len()
            ));
        }
        // Row-major [y][x] is column-major [x][y]
        let mut values = DMatrix::from_vec(x.len(), y.len(), field.into_data());

        if !x.windows(2).all(|w| w[1] > w[0]) {
            warn!("Field {} has x-decreasing - flipping...", path.display());
            x.reverse();
            values = flip_rows(&values);
        }
        if !y.windows(2).all(|w| w[1] > w[0]) {
            info!("Field {} has y-decreasing - flipping...", path.display());
            y.reverse();
            values = flip_columns(&values);
        }

        let grid = RegularGrid2d::try_new(x, y, values)
            .wrap_err_with(|| format!("invalid grid for field `{}` in {}", field_name, path.display()))?;
        if !grid.is_uniformly_spaced(GRID_SPACING_TOLERANCE) {
            return Err(eyre!("{} not specified on regular grid", path.display()));
        }

        Ok(Some(Self {
            path,
            field_name: field_name.to_string(),
            grid,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn grid(&self) -> &RegularGrid2d<f64> {
        &self.grid
    }
}

fn flip_rows(values: &DMatrix<f64>) -> DMatrix<f64> {
    let nrows = values.nrows();
    DMatrix::from_fn(nrows, values.ncols(), |i, j| values[(nrows - 1 - i, j)])
}

fn flip_columns(values: &DMatrix<f64>) -> DMatrix<f64> {
    let ncols = values.ncols();
    DMatrix::from_fn(values.nrows(), ncols, |i, j| values[(i, ncols - 1 - j)])
}

/// Options for [`InputData::interpolate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldInterpolationOptions {
    /// Uniform value used when the field has no data. Without a default, missing data is an error.
    pub default: Option<f64>,
    pub method: GridInterpolationMethod,
    pub min_val: Option<f64>,
    pub max_val: Option<f64>,
}

impl FieldInterpolationOptions {
    pub fn with_default(self, default: f64) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    pub fn with_method(self, method: GridInterpolationMethod) -> Self {
        Self { method, ..self }
    }

    pub fn with_min_val(self, min_val: f64) -> Self {
        Self {
            min_val: Some(min_val),
            ..self
        }
    }

    pub fn with_max_val(self, max_val: f64) -> Self {
        Self {
            max_val: Some(max_val),
            ..self
        }
    }

    fn grid_options(&self) -> GridInterpolationOptions<f64> {
        GridInterpolationOptions::default()
            .with_method(self.method)
            .with_bounds(self.min_val, self.max_val)
    }
}

/// The gridded input fields of a run.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    fields: BTreeMap<String, InputDataField>,
}

impl InputData {
    /// Loads every field in [`INPUT_FIELD_NAMES`] that the configured data files provide.
    ///
    /// A field is read from `io.fields.<name>.data_file` if given, and from the generic
    /// `io.data_file` otherwise. A configured file that does not exist is an error, whereas
    /// a dataset that is missing from an existing file only leaves the field absent.
    pub fn from_config(config: &Config) -> eyre::Result<Self> {
        let mut sources: HashMap<PathBuf, Box<dyn DataSource>> = HashMap::new();
        let mut fields = BTreeMap::new();

        for name in INPUT_FIELD_NAMES {
            let field = match field_file(config, name)? {
                Some((path, field_name)) => {
                    let source = match sources.entry(path) {
                        std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
                        std::collections::hash_map::Entry::Vacant(entry) => {
                            let source = open_data_file(entry.key())?;
                            entry.insert(source)
                        }
                    };
                    InputDataField::from_source(source.as_ref(), &field_name)?
                }
                None => None,
            };
            match field {
                Some(field) => {
                    fields.insert(name.to_string(), field);
                }
                None => warn!("No data found for {name}, field will be filled with default value if appropriate"),
            }
        }

        Ok(Self { fields })
    }

    pub fn from_fields(fields: impl IntoIterator<Item = (String, InputDataField)>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn insert_field(&mut self, name: impl Into<String>, field: InputDataField) {
        self.fields.insert(name.into(), field);
    }

    pub fn field(&self, name: &str) -> Option<&InputDataField> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Interpolates the named field at the given points.
    pub fn interpolate_at(
        &self,
        name: &str,
        points: &[Point2<f64>],
        options: &FieldInterpolationOptions,
    ) -> Result<Vec<f64>> {
        match (self.fields.get(name), options.default) {
            (Some(field), _) => field.grid.interpolate(points, &options.grid_options()),
            (None, Some(default)) => {
                warn!("No data found for {name}, filling with default value {default}");
                Ok(vec![default; points.len()])
            }
            (None, None) => Err(Error::MissingField { name: name.to_string() }),
        }
    }

    /// Interpolates the named field onto the degrees of freedom of a function space.
    pub fn interpolate(
        &self,
        name: &str,
        space: &Arc<FunctionSpace<f64>>,
        options: &FieldInterpolationOptions,
    ) -> Result<Function<f64>> {
        let values = self.interpolate_at(name, space.tabulate_dof_coordinates(), options)?;
        Function::from_values(Arc::clone(space), name, values)
    }
}

/// The data file and dataset name configured for a field, if any.
pub fn field_file(config: &Config, name: &str) -> eyre::Result<Option<(PathBuf, String)>> {
    let source = config.io.fields.get(&name.to_lowercase());
    let field_name = source
        .and_then(|source| source.field_name.clone())
        .unwrap_or_else(|| name.to_string());
    let file_name = source
        .and_then(|source| source.data_file.as_ref())
        .or(config.io.data_file.as_ref());

    match file_name {
        Some(file_name) => {
            let path = config.io.input_dir.join(file_name);
            if !path.exists() {
                return Err(eyre!("No input file found for field {}: {}", name, path.display()));
            }
            Ok(Some((path, field_name)))
        }
        None => Ok(None),
    }
}
