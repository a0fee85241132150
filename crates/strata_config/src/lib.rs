//! Parsing and validation of `strata.toml` design configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`StrataConfig`] describing the design name, boundary-synthesis default
//! cells, anonymous naming, tag strictness, and arena capacity hints.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::*;
