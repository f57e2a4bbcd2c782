//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and validated as a whole after merging.

mod demo;
mod log;
mod resolver;

pub use demo::FileDemoConfig;
pub use log::FileLogConfig;
pub use resolver::FileResolverConfig;

use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Entity resolution settings
    pub resolver: FileResolverConfig,
    /// Action log settings
    pub log: FileLogConfig,
    /// Demo ledger settings
    pub demo: FileDemoConfig,
}

/// How serious a configuration problem is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A single problem found while validating a merged configuration
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub message: String,
}

impl ConfigIssue {
    fn error(message: impl Into<String>) -> Self {
        ConfigIssue {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        ConfigIssue {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. A clarify cap that would suppress every clarification
    /// 2. Caps too large for a conversational reply
    /// 3. Blank values where a real one is required
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.resolver.clarify_options == 0 {
            issues.push(ConfigIssue::error(
                "resolver.clarify_options: must be at least 1",
            ));
        } else if self.resolver.clarify_options > 10 {
            issues.push(ConfigIssue::warning(format!(
                "resolver.clarify_options: {} candidates is more than a reply can usefully list",
                self.resolver.clarify_options
            )));
        }

        if let Some(path) = &self.log.actions {
            if path.trim().is_empty() {
                issues.push(ConfigIssue::warning(
                    "log.actions: blank path, the action log stays disabled",
                ));
            }
        }

        if self.demo.user.trim().is_empty() {
            issues.push(ConfigIssue::error("demo.user: must not be empty"));
        }

        issues
    }
}
