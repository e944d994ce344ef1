//! Data models for Toolbelt.
//!
//! This module contains the record types shared by the logging components.

pub mod call;

pub use call::{CallOutcome, CallRecord};
