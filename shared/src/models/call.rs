//! Call record data model.
//!
//! Defines the `CallRecord` structure describing one logged invocation:
//! when it happened, what was called, with which arguments, and how it ended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a logged call ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CallOutcome {
    /// The call returned a value.
    Success {
        /// The returned value, rendered as JSON.
        result: serde_json::Value,
    },
    /// The call returned an error.
    Failure {
        /// The error message.
        error: String,
    },
}

impl CallOutcome {
    /// Returns `true` if the call succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// A single logged invocation.
///
/// # Example
///
/// ```
/// use shared::models::{CallOutcome, CallRecord};
///
/// let record = CallRecord::success("add", vec![2.0.into(), 3.0.into()], 5.0);
/// assert_eq!(record.operation, "add");
/// assert!(record.outcome.is_success());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Time the call completed.
    pub timestamp: DateTime<Utc>,

    /// Name of the operation that was called.
    pub operation: String,

    /// Positional arguments of the call.
    #[serde(default)]
    pub args: Vec<serde_json::Value>,

    /// Result or error of the call.
    #[serde(flatten)]
    pub outcome: CallOutcome,
}

impl CallRecord {
    /// Creates a record with the current timestamp.
    #[must_use]
    pub fn new(
        operation: impl Into<String>,
        args: Vec<serde_json::Value>,
        outcome: CallOutcome,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: operation.into(),
            args,
            outcome,
        }
    }

    /// Creates a record for a call that returned `result`.
    ///
    /// Values that cannot be represented as JSON are recorded as `null`.
    #[must_use]
    pub fn success(
        operation: impl Into<String>,
        args: Vec<serde_json::Value>,
        result: impl Serialize,
    ) -> Self {
        let result = serde_json::to_value(result).unwrap_or(serde_json::Value::Null);
        Self::new(operation, args, CallOutcome::Success { result })
    }

    /// Creates a record for a call that failed with `error`.
    #[must_use]
    pub fn failure(
        operation: impl Into<String>,
        args: Vec<serde_json::Value>,
        error: impl fmt::Display,
    ) -> Self {
        Self::new(
            operation,
            args,
            CallOutcome::Failure {
                error: error.to_string(),
            },
        )
    }

    /// Overrides the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Renders the record as one human-readable log line (without newline).
impl fmt::Display for CallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = serde_json::Value::Array(self.args.clone());
        let timestamp = self.timestamp.format("%Y-%m-%d %H:%M:%S%.6f");
        match &self.outcome {
            CallOutcome::Success { result } => write!(
                f,
                "{timestamp} - {} - SUCCESS - Args: {args}, Result: {result}",
                self.operation
            ),
            CallOutcome::Failure { error } => write!(
                f,
                "{timestamp} - {} - FAILURE - Args: {args}, Error: {error}",
                self.operation
            ),
        }
    }
}
