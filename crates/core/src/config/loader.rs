//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    /// Parsed settings, defaults filled in
    pub schema: ConfigSchema,
    /// File the settings came from, if any
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist; otherwise the standard locations are
    /// searched and defaults are used when none is present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let schema = if let Some(ref p) = config_path {
            tracing::debug!(path = %p.display(), "Loading configuration");
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        validate(&schema)?;

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let candidates = [
        ".llmserver.toml",
        "llmserver.toml",
        ".config/llmserver.toml",
    ];

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str::<ConfigSchema>(&content)
        .map_err(Error::from)
        .context(format!("While parsing {}", path.display()))
}

fn validate(schema: &ConfigSchema) -> Result<()> {
    if schema.app.package.trim().is_empty() {
        return Err(Error::new(
            crate::error::ErrorCode::InvalidConfigValue,
            "app.package must not be empty",
        ));
    }
    if schema.logcat.tags.iter().any(|t| t.name.trim().is_empty()) {
        return Err(Error::new(
            crate::error::ErrorCode::InvalidConfigValue,
            "logcat.tags entries must have a non-empty name",
        ));
    }
    Ok(())
}
