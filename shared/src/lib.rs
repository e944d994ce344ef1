//! Toolbelt Shared Library
//!
//! This crate contains the utility components used by the Toolbelt CLI:
//! arithmetic, descriptive statistics, JSON file persistence, a retry
//! wrapper, and call logging.
//!
//! # Modules
//!
//! - [`arithmetic`] - Pure arithmetic and a logged running calculator
//! - [`stats`] - Mean, median, standard deviation and filters
//! - [`persistence`] - Save and load JSON documents
//! - [`retry`] - Re-invoke failing operations under a retry policy
//! - [`logging`] - Call logging sinks and the `logged` wrapper
//! - [`models`] - Call record model
//! - [`config`] - Environment-driven settings
//!
//! # Example
//!
//! ```
//! use shared::arithmetic::Calculator;
//! use shared::logging::InMemoryCallLogger;
//!
//! let logger = InMemoryCallLogger::new();
//! let mut calc = Calculator::new(&logger);
//! calc.add(5.0);
//! assert!(calc.divide(0.0).is_err());
//!
//! assert_eq!(logger.len(), 2);
//! assert_eq!(calc.value(), 5.0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arithmetic;
pub mod config;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod retry;
pub mod stats;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
