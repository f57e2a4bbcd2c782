//! Configuration file loading for bursar
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./bursar.toml` or `./.bursar.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/bursar/config.toml`
//! 4. Fallback: `~/.config/bursar/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, FileConfig, FileDemoConfig, FileLogConfig, FileResolverConfig, Severity,
};
pub use loader::ConfigLoader;
