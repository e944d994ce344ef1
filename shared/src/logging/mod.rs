//! Call logging.
//!
//! Provides the [`CallLogger`] trait, a sink that records one [`CallRecord`]
//! per invocation, together with file, in-memory and no-op implementations.
//!
//! Loggers are explicit handles passed to the components that use them.
//! Recording never fails the caller: sinks that can fail report the problem
//! through `tracing` and carry on.
//!
//! # Example
//!
//! ```
//! use shared::logging::{logged, InMemoryCallLogger};
//!
//! let logger = InMemoryCallLogger::new();
//! let sum: Result<f64, std::convert::Infallible> =
//!     logged(&logger, "add", vec![1.0.into(), 2.0.into()], || Ok(3.0));
//!
//! assert_eq!(sum.unwrap(), 3.0);
//! assert_eq!(logger.len(), 1);
//! ```

pub mod file;
pub mod memory;

pub use file::FileCallLogger;
pub use memory::InMemoryCallLogger;

use crate::models::CallRecord;
use serde::Serialize;
use std::fmt::Display;

/// A sink for call records.
pub trait CallLogger {
    /// Records a single call.
    ///
    /// Must not panic and must not surface errors to the caller.
    fn record(&self, record: &CallRecord);
}

impl<L: CallLogger + ?Sized> CallLogger for &L {
    fn record(&self, record: &CallRecord) {
        (**self).record(record);
    }
}

impl<L: CallLogger + ?Sized> CallLogger for Box<L> {
    fn record(&self, record: &CallRecord) {
        (**self).record(record);
    }
}

impl<L: CallLogger + ?Sized> CallLogger for std::sync::Arc<L> {
    fn record(&self, record: &CallRecord) {
        (**self).record(record);
    }
}

/// Logger that discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallLogger;

impl CallLogger for NoopCallLogger {
    fn record(&self, _record: &CallRecord) {}
}

/// Runs `f`, records its outcome under `operation`, and returns the outcome unchanged.
///
/// # Errors
///
/// Returns whatever error `f` returns.
pub fn logged<T, E, F>(
    logger: &impl CallLogger,
    operation: &str,
    args: Vec<serde_json::Value>,
    f: F,
) -> Result<T, E>
where
    T: Serialize,
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    let outcome = f();
    let record = match &outcome {
        Ok(value) => CallRecord::success(operation, args, value),
        Err(err) => CallRecord::failure(operation, args, err),
    };
    tracing::debug!(operation, success = outcome.is_ok(), "call completed");
    logger.record(&record);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CallOutcome;
    use serde_json::json;

    #[test]
    fn test_logged_records_success() {
        let logger = InMemoryCallLogger::new();

        let result: Result<i32, String> = logged(&logger, "answer", vec![], || Ok(42));

        assert_eq!(result, Ok(42));
        let records = logger.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].operation, "answer");
        assert_eq!(records[0].outcome, CallOutcome::Success { result: json!(42) });
    }

    #[test]
    fn test_logged_records_failure_and_propagates() {
        let logger = InMemoryCallLogger::new();

        let result: Result<i32, String> =
            logged(&logger, "explode", vec![json!("x")], || Err("kaboom".to_string()));

        assert_eq!(result, Err("kaboom".to_string()));
        let records = logger.records();
        assert_eq!(records[0].args, vec![json!("x")]);
        assert_eq!(
            records[0].outcome,
            CallOutcome::Failure {
                error: "kaboom".to_string()
            }
        );
    }

    #[test]
    fn test_noop_logger_accepts_records() {
        let result: Result<(), String> = logged(&NoopCallLogger, "noop", vec![], || Ok(()));
        assert!(result.is_ok());
    }

    #[test]
    fn test_logger_through_reference_and_arc() {
        let logger = std::sync::Arc::new(InMemoryCallLogger::new());
        let by_ref = &logger;

        let _: Result<(), String> = logged(by_ref, "first", vec![], || Ok(()));
        let _: Result<(), String> = logged(&logger, "second", vec![], || Ok(()));

        assert_eq!(logger.len(), 2);
    }
}
