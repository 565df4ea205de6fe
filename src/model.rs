//! Loading of input data and velocity observations onto the model function spaces.
use crate::config::{Config, ConstantsConfig};
use crate::error::Result;
use crate::input::{FieldInterpolationOptions, InputData, VelocityObservations};
use crate::interpolate::ScatteredDataInterpolator;
use crate::mesh::TriangleMesh2d;
use crate::space::{Function, FunctionSpace, SpaceKind};
use eyre::eyre;
use log::info;
use std::sync::Arc;

/// Mask values below this count as masked out.
const BGLEN_MASK_THRESHOLD: f64 = 1.0 - 1.0e-10;

/// Ice geometry and surface forcing.
#[derive(Debug, Clone)]
pub struct GeometryFields {
    /// Bed elevation on Q.
    pub bed: Function<f64>,
    /// Basal melt rate on M.
    pub bmelt: Function<f64>,
    /// Surface mass balance on M.
    pub smb: Function<f64>,
    /// Ice thickness on M.
    pub thick: Function<f64>,
    /// Surface elevation on Q.
    pub surf: Function<f64>,
}

/// Composite velocity observations interpolated onto the model spaces.
#[derive(Debug, Clone)]
pub struct VelocityObservationFields {
    pub u_obs_q: Function<f64>,
    pub v_obs_q: Function<f64>,
    pub u_std_q: Function<f64>,
    pub v_std_q: Function<f64>,
    pub u_obs_m: Function<f64>,
    pub v_obs_m: Function<f64>,
    pub mask_vel_m: Function<f64>,
}

#[derive(Debug)]
pub struct Model {
    config: Config,
    mesh: Arc<TriangleMesh2d<f64>>,
    q: Arc<FunctionSpace<f64>>,
    m: Arc<FunctionSpace<f64>>,
    input_data: InputData,
    geometry: Option<GeometryFields>,
    alpha: Option<Function<f64>>,
    bglen: Option<Function<f64>>,
    bglen_mask: Option<Function<f64>>,
    vel_obs: Option<VelocityObservations>,
    vel_obs_fields: Option<VelocityObservationFields>,
}

pub fn bglen_to_beta(bglen: f64) -> f64 {
    bglen.sqrt()
}

pub fn beta_to_bglen(beta: f64) -> f64 {
    beta * beta
}

/// Surface elevation of ice with thickness `thick` over a bed at elevation `bed`.
///
/// Ice is afloat where `thick <= -rhow / rhoi * bed`, and then has freeboard `thick * (1 - rhoi / rhow)`.
pub fn surface_elevation(bed: f64, thick: f64, rhoi: f64, rhow: f64) -> f64 {
    let flotation_thickness = -rhow / rhoi * bed;
    if thick <= flotation_thickness {
        thick * (1.0 - rhoi / rhow)
    } else {
        bed + thick
    }
}

impl Model {
    /// Creates the model spaces on the mesh without loading any data.
    pub fn new(mesh: Arc<TriangleMesh2d<f64>>, input_data: InputData, config: Config) -> Self {
        let q = Arc::new(FunctionSpace::lagrange1(Arc::clone(&mesh)));
        let m = Arc::new(FunctionSpace::dg0(Arc::clone(&mesh)));
        Self {
            config,
            mesh,
            q,
            m,
            input_data,
            geometry: None,
            alpha: None,
            bglen: None,
            bglen_mask: None,
            vel_obs: None,
            vel_obs_fields: None,
        }
    }

    /// Creates the model and loads the geometry fields and velocity observations.
    pub fn initialize(mesh: Arc<TriangleMesh2d<f64>>, input_data: InputData, config: Config) -> eyre::Result<Self> {
        let mut model = Self::new(mesh, input_data, config);
        model.init_fields_from_data()?;
        model.vel_obs_from_data()?;
        Ok(model)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mesh(&self) -> &Arc<TriangleMesh2d<f64>> {
        &self.mesh
    }

    /// The continuous piecewise linear space.
    pub fn q(&self) -> &Arc<FunctionSpace<f64>> {
        &self.q
    }

    /// The piecewise constant space.
    pub fn m(&self) -> &Arc<FunctionSpace<f64>> {
        &self.m
    }

    pub fn input_data(&self) -> &InputData {
        &self.input_data
    }

    pub fn geometry(&self) -> Option<&GeometryFields> {
        self.geometry.as_ref()
    }

    pub fn alpha(&self) -> Option<&Function<f64>> {
        self.alpha.as_ref()
    }

    pub fn bglen(&self) -> Option<&Function<f64>> {
        self.bglen.as_ref()
    }

    pub fn bglen_mask(&self) -> Option<&Function<f64>> {
        self.bglen_mask.as_ref()
    }

    pub fn vel_obs(&self) -> Option<&VelocityObservations> {
        self.vel_obs.as_ref()
    }

    pub fn vel_obs_fields(&self) -> Option<&VelocityObservationFields> {
        self.vel_obs_fields.as_ref()
    }

    pub fn space(&self, kind: SpaceKind) -> &Arc<FunctionSpace<f64>> {
        match kind {
            SpaceKind::Lagrange1 => &self.q,
            SpaceKind::Dg0 => &self.m,
        }
    }

    pub fn field_from_data(
        &self,
        name: &str,
        space: &Arc<FunctionSpace<f64>>,
        options: &FieldInterpolationOptions,
    ) -> Result<Function<f64>> {
        self.input_data.interpolate(name, space, options)
    }

    /// Loads bed, basal melt, surface mass balance and thickness, and derives the surface elevation.
    ///
    /// The surface is evaluated at the vertices of Q from the bed and the thickness data there.
    pub fn init_fields_from_data(&mut self) -> Result<&GeometryFields> {
        let min_thickness = self.config.ice_dynamics.min_thickness;
        let defaults = FieldInterpolationOptions::default();
        let thick_options = defaults.clone().with_min_val(min_thickness);

        let bed = self.field_from_data("bed", &self.q, &defaults)?;
        let bmelt = self.field_from_data("bmelt", &self.m, &defaults.clone().with_default(0.0))?;
        let smb = self.field_from_data("smb", &self.m, &defaults.with_default(0.0))?;
        let thick = self.field_from_data("thick", &self.m, &thick_options)?;
        let surf = self.surface_from_data(&bed, &thick_options)?;

        Ok(self.geometry.insert(GeometryFields {
            bed,
            bmelt,
            smb,
            thick,
            surf,
        }))
    }

    fn surface_from_data(
        &self,
        bed: &Function<f64>,
        thick_options: &FieldInterpolationOptions,
    ) -> Result<Function<f64>> {
        let ConstantsConfig { rhoi, rhow } = self.config.constants;
        let thick_q = self.field_from_data("thick", &self.q, thick_options)?;
        let surf = bed
            .values()
            .iter()
            .zip(thick_q.values())
            .map(|(&bed, &thick)| surface_elevation(bed, thick, rhoi, rhow))
            .collect();
        Function::from_values(Arc::clone(&self.q), "surf", surf)
    }

    pub fn alpha_from_data(&mut self) -> Result<&Function<f64>> {
        let alpha = self.field_from_data("alpha", &self.q, &FieldInterpolationOptions::default())?;
        Ok(self.alpha.insert(alpha))
    }

    /// Loads Bglen on Q (unless `mask_only`) and derives the piecewise constant Bglen mask.
    ///
    /// The mask is 1 on cells where all of the P1 mask values (which default to 1) are 1,
    /// and 0 elsewhere.
    pub fn bglen_from_data(&mut self, mask_only: bool) -> Result<()> {
        if !mask_only {
            let bglen = self.field_from_data("Bglen", &self.q, &FieldInterpolationOptions::default())?;
            self.bglen = Some(bglen);
        }

        let mask_p1 = self.field_from_data(
            "Bglenmask",
            &self.q,
            &FieldInterpolationOptions::default().with_default(1.0),
        )?;

        let mut mask = Function::constant(Arc::clone(&self.m), "bglen_mask", 1.0);
        for cell in 0..self.mesh.num_cells() {
            let masked_out = self
                .q
                .cell_dofs(cell)
                .into_iter()
                .any(|dof| mask_p1.values()[dof] < BGLEN_MASK_THRESHOLD);
            if masked_out {
                for dof in self.m.cell_dofs(cell) {
                    mask.values_mut()[dof] = 0.0;
                }
            }
        }
        self.bglen_mask = Some(mask);
        Ok(())
    }

    /// Reads the configured velocity observation file and interpolates it onto the model spaces.
    pub fn vel_obs_from_data(&mut self) -> eyre::Result<&VelocityObservationFields> {
        let path = self
            .config
            .vel_file_path()
            .ok_or_else(|| eyre!("no velocity observation file configured (obs.vel_file)"))?;
        info!("Reading velocity observations from {}", path.display());
        let observations = VelocityObservations::read(&path, self.config.inversion.use_cloud_point_velocities)?;
        Ok(self.vel_obs_from_observations(observations)?)
    }

    /// Interpolates composite velocity observations onto Q and M.
    ///
    /// The triangulation of the observations is built once and interpolation weights are
    /// computed once per space.
    pub fn vel_obs_from_observations(
        &mut self,
        observations: VelocityObservations,
    ) -> Result<&VelocityObservationFields> {
        let mut interpolator = ScatteredDataInterpolator::new(observations.composite().clone())?;

        let mut interpolate = |space: &Arc<FunctionSpace<f64>>, array: &str| -> Result<Function<f64>> {
            let values = interpolator.interpolate(space.kind(), space.tabulate_dof_coordinates(), array)?;
            Function::from_values(Arc::clone(space), array, values)
        };

        let fields = VelocityObservationFields {
            u_obs_q: interpolate(&self.q, "u_obs")?,
            v_obs_q: interpolate(&self.q, "v_obs")?,
            u_std_q: interpolate(&self.q, "u_std")?,
            v_std_q: interpolate(&self.q, "v_std")?,
            u_obs_m: interpolate(&self.m, "u_obs")?,
            v_obs_m: interpolate(&self.m, "v_obs")?,
            mask_vel_m: interpolate(&self.m, "mask_vel")?,
        };

        self.vel_obs = Some(observations);
        Ok(self.vel_obs_fields.insert(fields))
    }
}
