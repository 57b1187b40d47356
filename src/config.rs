//! TOML configuration for `patch-openapi`.
//!
//! Every setting has a default, so the binary runs without a config file.
//! Command-line flags override whatever is loaded here.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::sanitize::SanitizeMode;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub spec: SpecConfig,
    #[serde(default)]
    pub sidebar: SidebarConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpecConfig {
    #[serde(default = "default_spec_path")]
    pub path: PathBuf,
    #[serde(default = "default_field")]
    pub field: String,
    #[serde(default)]
    pub mode: SanitizeMode,
}

impl Default for SpecConfig {
    fn default() -> Self {
        Self {
            path: default_spec_path(),
            field: default_field(),
            mode: SanitizeMode::default(),
        }
    }
}

fn default_spec_path() -> PathBuf {
    PathBuf::from("docs").join("specs").join("openapi.json")
}
fn default_field() -> String {
    "ref".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SidebarConfig {
    #[serde(default = "default_doc_prefix")]
    pub doc_prefix: String,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            doc_prefix: default_doc_prefix(),
            output: None,
        }
    }
}

fn default_doc_prefix() -> String {
    "api/".to_string()
}

impl Config {
    /// Defaults used when no config file is present.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.spec.field.is_empty() {
            anyhow::bail!("spec.field must not be empty");
        }
        if self.spec.field.contains('"') {
            anyhow::bail!("spec.field must not contain a double quote");
        }
        if self.spec.path.as_os_str().is_empty() {
            anyhow::bail!("spec.path must not be empty");
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    config.validate()?;

    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
///
/// A file that exists but fails to parse or validate is still an error.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!("no config at {}, using defaults", path.display());
        Ok(Config::minimal())
    }
}
