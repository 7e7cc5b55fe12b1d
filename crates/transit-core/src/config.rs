use crate::error::{Result, TransitError};
use crate::io::{self, Format};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: String,
    /// Maximum number of undoable actions kept per session. Unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            version: default_version(),
            project: project.into(),
            history_limit: None,
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn load(root: &Path) -> Result<Self> {
        io::fetch(&paths::config_path(root), Format::Yaml)?.ok_or(TransitError::NotInitialized)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        io::store(&paths::config_path(root), Format::Yaml, self)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.history_limit == Some(0) {
            warnings.push(ConfigWarning {
                message: "history_limit is 0: undo is disabled".to_string(),
            });
        }
        if self.project.trim().is_empty() {
            warnings.push(ConfigWarning {
                message: "project name is empty".to_string(),
            });
        }
        warnings
    }
}
