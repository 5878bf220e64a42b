//! Parsing and validation of `weave.toml` project configuration files.
//!
//! A project file names the declaration directories, the output root, the
//! backends to run and per-backend options. Command-line flags are merged on
//! top by the CLI.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE};
pub use types::*;
