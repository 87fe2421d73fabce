//! CLI-specific configuration: merges an optional TOML file with the
//! command-line arguments, the file providing defaults the flags override.

use color_eyre::eyre::{Context, Result};
use driftlock_core::DemodConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Logfmt,
}

/// File-based configuration overlay for `DemodConfig`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub demod: Option<DemodConfig>,
    #[serde(default)]
    pub log_format: Option<LogFormat>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text).wrap_err_with(|| format!("failed to parse config file {}", path.display()))
    }
}
