//! Logging configuration from TOML (`[log]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    /// Path to the JSONL action log; absent disables it
    pub actions: Option<String>,
}
