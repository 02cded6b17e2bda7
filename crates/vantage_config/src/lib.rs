//! Parsing and validation of `vantage.toml` analysis configuration.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`VantageConfig`]: the analysis settings every path query runs under, the
//! default cone direction, and the logging filter.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod logging;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use logging::init_tracing;
pub use types::*;
