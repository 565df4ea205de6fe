use super::source::{open_data_file, DataSource};
use crate::scattered::ScatteredPointSet;
use eyre::{eyre, WrapErr};
use std::path::Path;

/// Velocity observations: a gridded composite product and an optional point cloud.
///
/// Both point sets carry the arrays `u_obs`, `v_obs`, `u_std` and `v_std`. The composite data
/// additionally carries `mask_vel`. Without point cloud observations the composite data is
/// used in their place.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityObservations {
    cloud: ScatteredPointSet<f64>,
    composite: ScatteredPointSet<f64>,
}

const COMPOSITE_DATASETS: [(&str, &str); 5] = [
    ("u_obs", "u_obs"),
    ("v_obs", "v_obs"),
    ("u_std", "u_std"),
    ("v_std", "v_std"),
    ("mask_vel", "mask_vel"),
];

const CLOUD_DATASETS: [(&str, &str); 4] = [
    ("u_cloud", "u_obs"),
    ("v_cloud", "v_obs"),
    ("u_cloud_std", "u_std"),
    ("v_cloud_std", "v_std"),
];

impl VelocityObservations {
    pub fn read(path: impl AsRef<Path>, use_cloud_points: bool) -> eyre::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(eyre!("Couldn't find velocity observations file: {}", path.display()));
        }
        let source = open_data_file(path)?;
        Self::from_source(source.as_ref(), use_cloud_points)
            .wrap_err_with(|| format!("failed to read velocity observations from {}", path.display()))
    }

    pub fn from_source(source: &dyn DataSource, use_cloud_points: bool) -> eyre::Result<Self> {
        let composite = read_point_set(source, ("x", "y"), &COMPOSITE_DATASETS)?;
        if !use_cloud_points {
            return Ok(Self {
                cloud: without_mask(&composite)?,
                composite,
            });
        }

        let cloud = read_point_set(source, ("x_cloud", "y_cloud"), &CLOUD_DATASETS)?;
        if cloud.num_points() >= composite.num_points() {
            return Err(eyre!(
                "expected fewer cloud points than composite points, got {} cloud and {} composite points",
                cloud.num_points(),
                composite.num_points()
            ));
        }
        Ok(Self { cloud, composite })
    }

    pub fn from_point_sets(cloud: ScatteredPointSet<f64>, composite: ScatteredPointSet<f64>) -> Self {
        Self { cloud, composite }
    }

    /// Observations used in the cost function.
    pub fn cloud(&self) -> &ScatteredPointSet<f64> {
        &self.cloud
    }

    /// Composite observations used for initialisation and boundary conditions.
    pub fn composite(&self) -> &ScatteredPointSet<f64> {
        &self.composite
    }
}

fn read_point_set(
    source: &dyn DataSource,
    (x_name, y_name): (&str, &str),
    datasets: &[(&str, &str)],
) -> eyre::Result<ScatteredPointSet<f64>> {
    let read_vector = |name: &str| source.read_required(name)?.into_vector(name);
    let x = read_vector(x_name)?;
    let y = read_vector(y_name)?;
    let mut point_set = ScatteredPointSet::from_coordinates(&x, &y)?;
    for &(dataset, array) in datasets {
        point_set = point_set
            .with_values(array, read_vector(dataset)?)
            .wrap_err_with(|| format!("dataset `{}` has the wrong size", dataset))?;
    }
    Ok(point_set)
}

fn without_mask(composite: &ScatteredPointSet<f64>) -> eyre::Result<ScatteredPointSet<f64>> {
    let mut cloud = ScatteredPointSet::from_points(composite.points().to_vec());
    for (_, array) in CLOUD_DATASETS {
        cloud = cloud.with_values(array, composite.try_values(array)?.to_vec())?;
    }
    Ok(cloud)
}
