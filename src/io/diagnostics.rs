//! Small diagnostic outputs: CSV records, inversion progress and quantity of interest series.
use super::gen_path;
use super::writer::create_parent_dir;
use crate::config::Config;
use eyre::WrapErr;
use std::borrow::Cow;
use std::fmt::{Display, Write as _};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

pub const INVERSION_INFO_HEADER: &str = "J, F_crit, G_crit_alpha, G_crit_beta";

/// Writes a single record as a CSV file with a header row of keys and one row of values.
///
/// The file is placed at [`gen_path`] with the inversion phase suffix.
pub fn dict_to_csv<K, V>(record: impl IntoIterator<Item = (K, V)>, name: &str, config: &Config) -> eyre::Result<PathBuf>
where
    K: Display,
    V: Display,
{
    let phase_suffix = &config.inversion.phase_suffix;
    let path = gen_path(config, name, ".csv", phase_suffix);

    let (keys, values): (Vec<_>, Vec<_>) = record
        .into_iter()
        .map(|(key, value)| (csv_field(&key.to_string()).into_owned(), csv_field(&value.to_string()).into_owned()))
        .unzip();
    let contents = format!("{}\r\n{}\r\n", keys.join(","), values.join(","));

    create_parent_dir(&path)?;
    std::fs::write(&path, contents).wrap_err_with(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Quotes a CSV field if it contains a delimiter, quote or line break.
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Writes inversion convergence information, one row per iteration.
///
/// The file starts with the header as a `#` comment line. Values are written in
/// scientific notation with 18 decimal digits, separated by commas.
pub fn write_inversion_info<R: AsRef<[f64]>>(config: &Config, rows: &[R], header: &str) -> eyre::Result<PathBuf> {
    let run_name = format!("{}{}", config.io.run_name, config.inversion.phase_suffix);
    let path = config
        .io
        .output_dir
        .join(&config.inversion.phase_name)
        .join(&config.inversion.phase_suffix)
        .join(format!("{run_name}_inversion_progress.csv"));

    let mut contents = String::new();
    writeln!(contents, "# {header}")?;
    for row in rows {
        let fields: Vec<_> = row.as_ref().iter().map(|&x| format_scientific(x)).collect();
        writeln!(contents, "{}", fields.join(","))?;
    }

    create_parent_dir(&path)?;
    std::fs::write(&path, contents).wrap_err_with(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Formats like C's `%.18e`, e.g. `1.500000000000000000e-03`.
pub fn format_scientific(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    let formatted = format!("{x:.18e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => formatted,
    }
}

/// `n + 1` evenly spaced times from 0 to `run_length`.
pub fn time_steps(run_length: f64, n_steps: usize) -> Vec<f64> {
    if n_steps == 0 {
        return vec![0.0];
    }
    let dt = run_length / n_steps as f64;
    (0..=n_steps)
        .map(|i| if i == n_steps { run_length } else { i as f64 * dt })
        .collect()
}

/// Writes the quantity of interest time series together with the time of each step.
///
/// The file holds the JSON array `[qval, times]`. It is named `io.qoi_file`, or
/// `<run_name><phase_suffix>_Qval_ts.json` when the time phase has a suffix.
pub fn write_qval(qval: &[f64], config: &Config) -> eyre::Result<PathBuf> {
    let phase_suffix = &config.time.phase_suffix;
    let filename = if phase_suffix.is_empty() {
        config.io.qoi_file.clone()
    } else {
        format!("{}{}_Qval_ts.json", config.io.run_name, phase_suffix)
    };
    let path = config
        .io
        .output_dir
        .join(&config.time.phase_name)
        .join(phase_suffix)
        .join(filename);

    let times = time_steps(config.time.run_length, config.time.total_steps);

    create_parent_dir(&path)?;
    let file = File::create(&path).wrap_err_with(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), &(qval, times))
        .wrap_err_with(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
