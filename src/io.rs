//! Mesh input, function output and diagnostics files.
use crate::config::Config;
use std::path::PathBuf;

pub mod diagnostics;
pub mod msh;
pub mod vtk;
pub mod writer;
pub mod xdmf;

/// Output path of a named inversion output, e.g. `alpha` becomes
/// `<output_dir>/<phase_name>/<phase_suffix>/<run_name><phase_suffix>_alpha<suffix>`.
///
/// `suffix` includes the leading dot.
pub fn gen_path(config: &Config, name: &str, suffix: &str, phase_suffix: &str) -> PathBuf {
    let dir = config
        .io
        .output_dir
        .join(&config.inversion.phase_name)
        .join(phase_suffix);
    dir.join(format!("{}{}_{}{}", config.io.run_name, phase_suffix, name, suffix))
}
