//! Demo ledger configuration from TOML (`[demo]` section)

use serde::{Deserialize, Serialize};

/// Raw demo configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDemoConfig {
    /// Email or name of the seeded user to act as
    pub user: String,
}

impl Default for FileDemoConfig {
    fn default() -> Self {
        Self {
            user: "sam@example.com".to_string(),
        }
    }
}
