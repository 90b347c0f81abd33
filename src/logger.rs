use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use parking_lot::Mutex;
use tracing::Level;

/// Sink for the diagnostics emitted while transforming rows.
///
/// Passed explicitly into the fetcher and transformer so a run (or a test)
/// decides where its log lines go.
pub trait Reporter: Send + Sync {
    fn log(&self, level: Level, message: &str);

    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }
}

/// Forwards every line to the process-wide `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{}", message),
            Level::WARN => tracing::warn!("{}", message),
            Level::INFO => tracing::info!("{}", message),
            Level::DEBUG => tracing::debug!("{}", message),
            _ => tracing::trace!("{}", message),
        }
    }
}

/// Append-only run log. Each line is also forwarded to `tracing`.
pub struct Logger {
    writer: Mutex<BufWriter<std::fs::File>>,
}

impl Logger {
    pub fn new(log_path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Logger {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl Reporter for Logger {
    fn log(&self, level: Level, message: &str) {
        TracingReporter.log(level, message);

        let mut writer = self.writer.lock();
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(writer, "[{}] {:<5} {}", timestamp, level.as_str(), message);
        let _ = writer.flush();
    }
}

/// Keeps every line in memory so tests can assert on exact log content.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<(Level, String)>>,
}

#[cfg(test)]
impl MemoryReporter {
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().clone()
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

#[cfg(test)]
impl Reporter for MemoryReporter {
    fn log(&self, level: Level, message: &str) {
        self.entries.lock().push((level, message.to_string()));
    }
}
