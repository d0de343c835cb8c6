use crate::domains::logger::{DomainLogger, FileLogger};
use std::sync::Arc;

struct BridgeLogger;

impl DomainLogger for BridgeLogger {
    fn info(&self, msg: &str) {
        log::info!("{}", msg);
    }

    fn warn(&self, msg: &str) {
        log::warn!("{}", msg);
    }

    fn error(&self, msg: &str) {
        log::error!("{}", msg);
    }

    fn debug(&self, msg: &str) {
        log::debug!("{}", msg);
    }
}

/// Initialize the file logger and return a domain logger instance the application can inject.
/// `fast_log` installs a process-wide logger, so only the first call can succeed.
pub fn init_file_logger(path: &str, level: &str) -> Result<Arc<dyn DomainLogger>, String> {
    FileLogger::init(path, level).map_err(|e| format!("Failed to initialize fast_log: {}", e))?;
    Ok(Arc::new(BridgeLogger))
}
