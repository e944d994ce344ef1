//! Configuration module for Toolbelt.
//!
//! This module contains the environment-driven runtime settings.

pub mod settings;

pub use settings::{ConfigError, Settings};
