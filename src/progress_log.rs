use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::error::{EtlError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%b-%d-%H:%M:%S";

/// Append-only progress log, one `<timestamp> : <message>` line per entry.
///
/// The file is opened for every entry and closed again before returning, so
/// the log holds exactly the stages that finished if a later stage fails.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `message` stamped with the current local time
    pub fn log(&self, message: &str) -> Result<()> {
        self.append(&format_entry(Local::now().naive_local(), message))
    }

    fn append(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| EtlError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| EtlError::io(&self.path, e))?;
        tracing::debug!("📝 {}", line.trim_end());
        Ok(())
    }
}

fn format_entry(timestamp: NaiveDateTime, message: &str) -> String {
    format!("{} : {}\n", timestamp.format(TIMESTAMP_FORMAT), message)
}
