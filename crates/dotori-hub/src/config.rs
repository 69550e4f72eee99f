use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use dotori_core::DEFAULT_FOLDER_NAME;
use serde::Deserialize;

/// Allowed columns of indentation per tree level.
const INDENT_RANGE: std::ops::RangeInclusive<u16> = 1..=8;

/// Settings for the dotori app.
///
/// Read from `config.toml` in the platform config directory
/// (`~/.config/dotori/config.toml` on Linux), then `DOTORI_*` environment
/// variables on top.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the folder service.
    pub api_url: String,
    /// Name given to newly created folders.
    pub default_folder_name: String,
    /// Columns of indentation per tree level.
    pub indent_per_level: u16,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".to_string(),
            default_folder_name: DEFAULT_FOLDER_NAME.to_string(),
            indent_per_level: 2,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config at {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config at {}", path.display()))?;
        Ok(config)
    }

    /// Check values serde cannot: the indent must fit a terminal row.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            INDENT_RANGE.contains(&self.indent_per_level),
            "indent_per_level must be between {} and {}, got {}",
            INDENT_RANGE.start(),
            INDENT_RANGE.end(),
            self.indent_per_level
        );
        Ok(())
    }

    /// Load from `DOTORI_CONFIG` or the user config file, falling back to
    /// defaults when there is none, then apply environment overrides.
    pub fn load_or_default() -> Result<Self> {
        let path = std::env::var_os("DOTORI_CONFIG")
            .map(PathBuf::from)
            .or_else(user_config_path);

        let config = match path {
            Some(path) if path.exists() => Self::load(&path)?,
            _ => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply `DOTORI_*` overrides looked up through `var`.
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = var("DOTORI_API_URL") {
            self.api_url = url;
        }
        if let Some(name) = var("DOTORI_DEFAULT_FOLDER_NAME") {
            if !name.trim().is_empty() {
                self.default_folder_name = name;
            }
        }
        if let Some(level) = var("DOTORI_LOG") {
            self.log_level = level;
        }
        self
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "dotori")
}

/// `config.toml` in the platform config directory.
pub fn user_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Directory for the log file, created if needed.
pub fn data_dir() -> Result<PathBuf> {
    let dirs = project_dirs().context("Could not determine data directory")?;
    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.to_path_buf())
}
