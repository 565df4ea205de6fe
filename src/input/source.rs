//! Named numeric datasets stored in data files.
use eyre::{eyre, WrapErr};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A dense array in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl RawArray {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> eyre::Result<Self> {
        let len: usize = shape.iter().product();
        if len != data.len() {
            return Err(eyre!(
                "array of shape {:?} needs {} elements, got {}",
                shape,
                len,
                data.len()
            ));
        }
        Ok(Self { shape, data })
    }

    pub fn from_vec(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    /// Flattens an array that has exactly one non-singleton dimension.
    pub fn into_vector(self, name: &str) -> eyre::Result<Vec<f64>> {
        let non_singleton = self.shape.iter().filter(|&&n| n > 1).count();
        if non_singleton != 1 {
            return Err(eyre!(
                "dataset `{}` has shape {:?}, expected exactly one non-singleton dimension",
                name,
                self.shape
            ));
        }
        Ok(self.data)
    }
}

/// A file holding named datasets.
pub trait DataSource {
    fn path(&self) -> &Path;

    fn contains(&self, name: &str) -> bool;

    /// Reads a dataset, returning `None` if the file has no dataset of that name.
    fn read(&self, name: &str) -> eyre::Result<Option<RawArray>>;

    /// Like [`read`](Self::read), but a missing dataset is an error.
    fn read_required(&self, name: &str) -> eyre::Result<RawArray> {
        self.read(name)?
            .ok_or_else(|| eyre!("dataset `{}` not found in {}", name, self.path().display()))
    }
}

/// Datasets stored as a JSON object of (nested) numeric arrays.
///
/// `null` entries read as NaN.
#[derive(Debug, Clone)]
pub struct JsonDataSource {
    path: PathBuf,
    datasets: serde_json::Map<String, Value>,
}

impl JsonDataSource {
    pub fn open(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let contents = std::fs::read_to_string(&path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
        match serde_json::from_str(&contents).wrap_err_with(|| format!("failed to parse {}", path.display()))? {
            Value::Object(datasets) => Ok(Self { path, datasets }),
            _ => Err(eyre!("{} does not contain a JSON object of datasets", path.display())),
        }
    }
}

impl DataSource for JsonDataSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn contains(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    fn read(&self, name: &str) -> eyre::Result<Option<RawArray>> {
        self.datasets
            .get(name)
            .map(|value| array_from_json(value).wrap_err_with(|| format!("invalid dataset `{}`", name)))
            .transpose()
    }
}

fn array_from_json(value: &Value) -> eyre::Result<RawArray> {
    let mut shape = Vec::new();
    let mut level = value;
    while let Value::Array(items) = level {
        shape.push(items.len());
        match items.first() {
            Some(first) => level = first,
            None => break,
        }
    }

    let mut data = Vec::with_capacity(shape.iter().product());
    collect_json_numbers(value, &shape, &mut data)?;
    RawArray::new(shape, data)
}

fn collect_json_numbers(value: &Value, shape: &[usize], data: &mut Vec<f64>) -> eyre::Result<()> {
    match (value, shape.split_first()) {
        (Value::Array(items), Some((&len, rest))) => {
            if items.len() != len {
                return Err(eyre!("ragged array: expected {} entries, got {}", len, items.len()));
            }
            for item in items {
                collect_json_numbers(item, rest, data)?;
            }
            Ok(())
        }
        (Value::Number(number), None) => {
            data.push(
                number
                    .as_f64()
                    .ok_or_else(|| eyre!("number {} is not representable as f64", number))?,
            );
            Ok(())
        }
        (Value::Null, None) => {
            data.push(f64::NAN);
            Ok(())
        }
        (other, _) => Err(eyre!("unexpected JSON value {} in numeric array", other)),
    }
}

#[cfg(feature = "hdf5")]
pub struct Hdf5DataSource {
    path: PathBuf,
    file: hdf5::File,
}

#[cfg(feature = "hdf5")]
impl Hdf5DataSource {
    pub fn open(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = hdf5::File::open(&path).wrap_err_with(|| format!("failed to open HDF5 file {}", path.display()))?;
        Ok(Self { path, file })
    }
}

#[cfg(feature = "hdf5")]
impl DataSource for Hdf5DataSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn contains(&self, name: &str) -> bool {
        self.file.link_exists(name)
    }

    fn read(&self, name: &str) -> eyre::Result<Option<RawArray>> {
        if !self.contains(name) {
            return Ok(None);
        }
        let dataset = self.file.dataset(name)?;
        let shape = dataset.shape();
        let data = dataset.read_raw::<f64>()?;
        RawArray::new(shape, data).map(Some)
    }
}

/// Opens a data file, choosing the reader by file extension.
pub fn open_data_file(path: impl AsRef<Path>) -> eyre::Result<Box<dyn DataSource>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(eyre!("data file {} does not exist", path.display()));
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);
    match extension.as_deref() {
        Some("json") => Ok(Box::new(JsonDataSource::open(path)?)),
        #[cfg(feature = "hdf5")]
        Some("h5") | Some("hdf5") => Ok(Box::new(Hdf5DataSource::open(path)?)),
        #[cfg(not(feature = "hdf5"))]
        Some("h5") | Some("hdf5") => Err(eyre!(
            "cannot read {}: HDF5 input requires the `hdf5` feature",
            path.display()
        )),
        _ => Err(eyre!("unsupported data file format: {}", path.display())),
    }
}
