//! Resolution configuration from TOML (`[resolver]` section)

use serde::{Deserialize, Serialize};

/// Raw resolution configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileResolverConfig {
    /// Most candidates a clarification reply will list
    pub clarify_options: usize,
}

impl Default for FileResolverConfig {
    fn default() -> Self {
        Self { clarify_options: 5 }
    }
}
