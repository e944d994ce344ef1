//! JSON document persistence.
//!
//! Saves and loads a JSON object to and from a file. Saving replaces the
//! whole file; loading parses the whole file. There is no atomic write and
//! no locking: one writer and one reader at a time are assumed.

use crate::logging::{logged, CallLogger, NoopCallLogger};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A JSON object: string keys mapped to arbitrary JSON values.
pub type Document = Map<String, Value>;

/// Deepest array/object nesting [`load`] accepts, counting the top-level
/// object. This is the parser's built-in recursion limit; deeper content is
/// reported as [`PersistenceError::MalformedDocument`] instead of
/// overflowing the stack.
pub const MAX_NESTING_DEPTH: usize = 127;

/// Errors that can occur while saving or loading documents.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The file does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but does not hold a JSON object.
    #[error("Malformed document in {}: {reason}", .path.display())]
    MalformedDocument {
        /// The file that was read.
        path: PathBuf,
        /// Why parsing failed.
        reason: String,
    },

    /// The document could not be serialized.
    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Any other I/O failure.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

/// Serializes `document` as pretty-printed JSON and writes it to `path`,
/// replacing any previous content.
///
/// Floats are written in their shortest round-trip form, so [`load`] reads
/// back the exact same `f64`. Nesting depth is not limited here, but
/// [`load`] refuses documents nested deeper than [`MAX_NESTING_DEPTH`].
///
/// # Errors
///
/// Returns [`PersistenceError::Io`] if the file cannot be written.
pub fn save(path: impl AsRef<Path>, document: &Document) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let text = to_pretty_json(document)?;
    fs::write(path, text).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), keys = document.len(), "document saved");
    Ok(())
}

/// Reads and parses the JSON object stored at `path`.
///
/// # Errors
///
/// - [`PersistenceError::NotFound`] if `path` does not exist
/// - [`PersistenceError::MalformedDocument`] if the content is not valid
///   JSON, is nested deeper than [`MAX_NESTING_DEPTH`], or its top-level
///   value is not an object
/// - [`PersistenceError::Io`] for other read failures
///
/// # Example
///
/// ```
/// use shared::persistence::{load, save, Document};
///
/// let path = std::env::temp_dir().join(format!("toolbelt-doc-{}.json", std::process::id()));
/// let mut doc = Document::new();
/// doc.insert("key".to_string(), "value".into());
///
/// save(&path, &doc).unwrap();
/// assert_eq!(load(&path).unwrap(), doc);
/// # std::fs::remove_file(&path).unwrap();
/// ```
pub fn load(path: impl AsRef<Path>) -> Result<Document, PersistenceError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => PersistenceError::NotFound(path.to_path_buf()),
        io::ErrorKind::InvalidData => PersistenceError::MalformedDocument {
            path: path.to_path_buf(),
            reason: "content is not valid UTF-8".to_string(),
        },
        _ => PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let malformed = |reason: String| PersistenceError::MalformedDocument {
        path: path.to_path_buf(),
        reason,
    };
    match serde_json::from_str::<Value>(&text).map_err(|e| malformed(e.to_string()))? {
        Value::Object(document) => {
            tracing::debug!(path = %path.display(), keys = document.len(), "document loaded");
            Ok(document)
        }
        other => Err(malformed(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
    }
}

fn to_pretty_json(value: &impl Serialize) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(buf)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A JSON file at a fixed path whose reads and writes are logged.
///
/// # Example
///
/// ```
/// use shared::logging::InMemoryCallLogger;
/// use shared::persistence::{Document, JsonFile};
///
/// let path = std::env::temp_dir().join(format!("toolbelt-jsonfile-{}.json", std::process::id()));
/// let logger = InMemoryCallLogger::new();
/// let file = JsonFile::new(&path, &logger);
///
/// let mut doc = Document::new();
/// doc.insert("key".to_string(), "value".into());
/// file.write(&doc).unwrap();
///
/// assert_eq!(file.read().unwrap(), doc);
/// assert_eq!(logger.len(), 2);
/// # std::fs::remove_file(&path).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct JsonFile<L: CallLogger = NoopCallLogger> {
    path: PathBuf,
    logger: L,
}

impl<L: CallLogger> JsonFile<L> {
    /// Creates a handle for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, logger: L) -> Self {
        Self {
            path: path.into(),
            logger,
        }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `document`, replacing the file content.
    ///
    /// # Errors
    ///
    /// See [`save`].
    pub fn write(&self, document: &Document) -> Result<(), PersistenceError> {
        logged(&self.logger, "write", self.call_args(Some(document)), || {
            save(&self.path, document)
        })
    }

    /// Reads the document.
    ///
    /// # Errors
    ///
    /// See [`load`].
    pub fn read(&self) -> Result<Document, PersistenceError> {
        logged(&self.logger, "read", self.call_args(None), || load(&self.path))
    }

    /// Reads the document, returning `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`JsonFile::read`], except that a missing file is not an error.
    pub fn read_optional(&self) -> Result<Option<Document>, PersistenceError> {
        logged(&self.logger, "read", self.call_args(None), || {
            match load(&self.path) {
                Ok(document) => Ok(Some(document)),
                Err(PersistenceError::NotFound(_)) => Ok(None),
                Err(err) => Err(err),
            }
        })
    }

    fn call_args(&self, document: Option<&Document>) -> Vec<Value> {
        let mut args = vec![Value::String(self.path.display().to_string())];
        if let Some(document) = document {
            args.push(Value::Object(document.clone()));
        }
        args
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn finite_f64() -> impl Strategy<Value = f64> {
        prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO
    }

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            any::<u64>().prop_map(Value::from),
            finite_f64().prop_map(Value::from),
            "\\PC{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                proptest::collection::btree_map("[a-z]{0,8}", inner, 0..8)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    fn document() -> impl Strategy<Value = Document> {
        proptest::collection::btree_map("\\PC{0,8}", json_value(), 0..8)
            .prop_map(|map| map.into_iter().collect::<Document>())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn save_then_load_returns_same_document(doc in document()) {
            let path = std::env::temp_dir().join(format!(
                "toolbelt-persistence-{}-generated.json",
                std::process::id()
            ));
            save(&path, &doc).unwrap();
            let loaded = load(&path).unwrap();
            fs::remove_file(&path).unwrap();
            prop_assert_eq!(loaded, doc);
        }

        #[test]
        fn save_then_load_keeps_exact_float(x in finite_f64()) {
            let path = std::env::temp_dir().join(format!(
                "toolbelt-persistence-{}-float.json",
                std::process::id()
            ));
            let mut doc = Document::new();
            doc.insert("x".to_string(), Value::from(x));
            save(&path, &doc).unwrap();
            let loaded = load(&path).unwrap();
            fs::remove_file(&path).unwrap();
            prop_assert_eq!(loaded["x"].as_f64(), Some(x));
        }
    }
}
