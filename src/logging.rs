//! Logger set-up with a message format that depends on the severity.
use crate::config::Config;
use eyre::eyre;
use log::{info, LevelFilter, Record};
use std::io::Write;
use std::str::FromStr;

/// Log target that marks an error record as critical.
///
/// ```
/// log::error!(target: fenics_ice::logging::CRITICAL_TARGET, "Mesh file is corrupt");
/// ```
pub const CRITICAL_TARGET: &str = "critical";

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Critical | LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
        }
    }

    fn of_record(record: &Record) -> Self {
        match record.level() {
            log::Level::Error if record.target() == CRITICAL_TARGET => LogLevel::Critical,
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warning,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug | log::Level::Trace => LogLevel::Debug,
        }
    }
}

impl FromStr for LogLevel {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(LogLevel::Critical),
            "error" => Ok(LogLevel::Error),
            "warning" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(eyre!(
                "invalid log level `{}`, expected one of critical, error, warning, info, debug",
                s
            )),
        }
    }
}

pub fn parse_log_level(level: &str) -> eyre::Result<LogLevel> {
    level.parse()
}

/// Formats a message the way the installed logger prints it.
pub fn format_message(level: LogLevel, module: Option<&str>, line: Option<u32>, message: &str) -> String {
    match level {
        LogLevel::Critical => format!("CRITICAL ERROR: {message}"),
        LogLevel::Error => format!("ERROR: {message}"),
        LogLevel::Warning => format!("WARNING: {message}"),
        LogLevel::Info => message.to_string(),
        LogLevel::Debug => format!(
            "DBG: {}: Line {}: {}",
            module.unwrap_or("<unknown>"),
            line.map_or_else(|| "?".to_string(), |l| l.to_string()),
            message
        ),
    }
}

/// Installs the global logger at the given level.
///
/// If a logger is already installed only the maximum level is updated.
pub fn setup_logging(level: &str) -> eyre::Result<()> {
    let level = parse_log_level(level)?;
    let filter = level.to_level_filter();
    let result = env_logger::Builder::new()
        .filter_level(filter)
        .format(|buf, record| {
            let message = format_message(
                LogLevel::of_record(record),
                record.module_path(),
                record.line(),
                &record.args().to_string(),
            );
            writeln!(buf, "{message}")
        })
        .try_init();
    if result.is_err() {
        log::set_max_level(filter);
    }
    Ok(())
}

/// Logs a banner announcing the model phase followed by the full configuration.
pub fn log_preamble(phase: &str, config: &Config) -> eyre::Result<()> {
    let banner = format!("==  RUNNING {} MODEL PHASE ==", phase.to_uppercase());
    let rule = "=".repeat(banner.len());
    info!("{rule}");
    info!("{banner}");
    info!("{rule}");
    info!("========= Configuration ==========");
    info!("{}", config.to_toml_string()?);
    info!("========= End of Configuration ==========");
    Ok(())
}
