//! Config file loader and serialization.

use crate::error::ConfigError;
use crate::models::BuildConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the user-level settings path: ~/.config/exe-builder/settings.json
pub fn get_global_settings_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::ValidationFailed("Cannot determine home directory".to_string())
    })?;

    Ok(home.join(".config/exe-builder").join("settings.json"))
}

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

/// Validate config path and pick its format from the extension.
pub fn detect_format(path: &Path) -> Result<ConfigFormat, ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "Configuration path cannot be empty".to_string(),
        ));
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(ext) => Err(ConfigError::ValidationFailed(format!(
            "Configuration file must have .json or .toml extension, got .{}",
            ext
        ))),
        None => Err(ConfigError::ValidationFailed(
            "Configuration file must have .json or .toml extension".to_string(),
        )),
    }
}

/// Load config from a JSON or TOML file.
pub fn load_config_from_file(path: &Path) -> Result<BuildConfig, ConfigError> {
    let format = detect_format(path)?;

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(format!(
                "Configuration file not found at: {}",
                path.display()
            ))
        } else {
            ConfigError::IoError(e)
        }
    })?;

    let config = match format {
        ConfigFormat::Json => serde_json::from_str(&content)?,
        ConfigFormat::Toml => toml::from_str(&content)?,
    };

    Ok(config)
}

/// Save config as pretty JSON.
pub fn save_config_to_file(config: &BuildConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json_content = serde_json::to_string_pretty(config)?;
    fs::write(path, json_content)?;

    Ok(())
}
