//! Append-only file call logger.

use super::CallLogger;
use crate::models::CallRecord;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default log file name, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "application.log";

/// Call logger that appends one line per record to a text file.
///
/// The file is opened in append mode for every record, so several handles
/// pointing at the same path interleave whole lines. Write failures are
/// reported through `tracing` and otherwise ignored.
#[derive(Debug, Clone)]
pub struct FileCallLogger {
    path: PathBuf,
}

impl FileCallLogger {
    /// Creates a logger writing to `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl Default for FileCallLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILE)
    }
}

impl CallLogger for FileCallLogger {
    fn record(&self, record: &CallRecord) {
        if let Err(err) = self.append(&record.to_string()) {
            tracing::warn!(
                path = %self.path.display(),
                operation = %record.operation,
                error = %err,
                "Failed to write call log record"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "toolbelt-file-logger-{}-{name}.log",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn test_default_path() {
        let logger = FileCallLogger::default();
        assert_eq!(logger.path(), Path::new("application.log"));
    }

    #[test]
    fn test_appends_one_line_per_record() {
        let path = temp_path("append");
        let logger = FileCallLogger::new(&path);

        logger.record(&CallRecord::success("add", vec![json!(1.0), json!(2.0)], 3.0));
        logger.record(&CallRecord::failure(
            "divide",
            vec![json!(1.0), json!(0.0)],
            "Cannot divide by zero",
        ));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("- add - SUCCESS - Args: [1.0,2.0], Result: 3.0"));
        assert!(lines[1].ends_with("- divide - FAILURE - Args: [1.0,0.0], Error: Cannot divide by zero"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_existing_content_is_kept() {
        let path = temp_path("keep");
        std::fs::write(&path, "earlier line\n").unwrap();

        FileCallLogger::new(&path).record(&CallRecord::success("add", vec![], 1.0));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("earlier line\n"));
        assert_eq!(contents.lines().count(), 2);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let dir = std::env::temp_dir().join(format!(
            "toolbelt-file-logger-{}-missing-dir",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        let logger = FileCallLogger::new(dir.join("nested").join("application.log"));

        logger.record(&CallRecord::success("add", vec![], 1.0));

        assert!(!dir.exists());
    }
}
