use chrono::Utc;
use log::{debug as log_debug, error as log_error, info as log_info, warn as log_warn};
use std::sync::Arc;

/// Domain-level logging port (Hexagonal port).
/// Warehouse code logs through this and never sees a logging failure.
pub trait DomainLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);

    /// Per-tick chatter (throttling, raised transfers). Dropped unless an adapter opts in.
    fn debug(&self, _msg: &str) {}
}

pub type DynLogger = Arc<dyn DomainLogger>;

/// A file-based adapter using `fast_log` for file writing and rotation.
pub struct FileLogger;

impl FileLogger {
    /// Initialize the fast_log file logger at `level` ("debug", "info", "warn", "error").
    pub fn init(path: &str, level: &str) -> Result<(), Box<dyn std::error::Error>> {
        fast_log::init(
            fast_log::config::Config::new()
                .console()
                .file(path)
                .level(parse_level(level)),
        )?;
        Ok(())
    }
}

fn parse_level(level: &str) -> log::LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        "off" => log::LevelFilter::Off,
        _ => log::LevelFilter::Info,
    }
}

impl DomainLogger for FileLogger {
    fn info(&self, msg: &str) {
        log_info!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn warn(&self, msg: &str) {
        log_warn!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn error(&self, msg: &str) {
        log_error!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn debug(&self, msg: &str) {
        log_debug!("{} - {}", Utc::now().to_rfc3339(), msg);
    }
}
