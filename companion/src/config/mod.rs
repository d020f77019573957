//! Configuration management for the companion service: loading the optional TOML config file.
//!
//! This module provides a unified interface to the configuration data types and loading utilities.

mod loader;
mod types;

pub use loader::*;
pub use types::*;
