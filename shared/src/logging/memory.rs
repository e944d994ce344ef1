//! In-memory call logger.

use super::CallLogger;
use crate::models::CallRecord;
use std::sync::{Arc, RwLock};

/// Call logger that keeps records in memory.
///
/// Records are stored in a `Vec` behind a `RwLock`. Cloning the logger
/// yields another handle to the same records.
///
/// # Example
///
/// ```
/// use shared::logging::{CallLogger, InMemoryCallLogger};
/// use shared::models::CallRecord;
///
/// let logger = InMemoryCallLogger::new();
/// logger.record(&CallRecord::success("add", vec![], 1.0));
///
/// assert_eq!(logger.records_for("add").len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCallLogger {
    records: Arc<RwLock<Vec<CallRecord>>>,
}

impl InMemoryCallLogger {
    /// Creates an empty logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<CallRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Returns the records for one operation, oldest first.
    #[must_use]
    pub fn records_for(&self, operation: &str) -> Vec<CallRecord> {
        self.records
            .read()
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.operation == operation)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all records.
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.write() {
            records.clear();
        }
    }
}

impl CallLogger for InMemoryCallLogger {
    fn record(&self, record: &CallRecord) {
        match self.records.write() {
            Ok(mut records) => records.push(record.clone()),
            Err(_) => tracing::warn!(
                operation = %record.operation,
                "Failed to acquire lock on in-memory call log, record dropped"
            ),
        }
    }
}
