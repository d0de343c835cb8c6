use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Forwards every message to a primary logger and an optional secondary one
/// (typically file + console).
pub struct MultiLogger {
    primary: Arc<dyn DomainLogger>,
    secondary: Option<Arc<dyn DomainLogger>>,
}

impl MultiLogger {
    pub fn new(primary: Arc<dyn DomainLogger>, secondary: Option<Arc<dyn DomainLogger>>) -> Self {
        Self { primary, secondary }
    }

    fn each(&self, f: impl Fn(&dyn DomainLogger)) {
        f(self.primary.as_ref());
        if let Some(sec) = &self.secondary {
            f(sec.as_ref());
        }
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.each(|l| l.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.each(|l| l.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.each(|l| l.error(msg));
    }

    fn debug(&self, msg: &str) {
        self.each(|l| l.debug(msg));
    }
}

/// File logger with the console attached as secondary; console only if the
/// file logger cannot be initialized.
pub fn init_combined_logger(path: &str, level: &str) -> Arc<dyn DomainLogger> {
    let console = crate::adapters::outbound::init_console_logger();
    match crate::adapters::outbound::file_logger::init_file_logger(path, level) {
        Ok(file_logger) => Arc::new(MultiLogger::new(file_logger, Some(console))) as Arc<dyn DomainLogger>,
        Err(_) => console,
    }
}
