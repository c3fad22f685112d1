//! Configuration module for the EXE build.
//!
//! Every constant the build uses lives in [`BuildConfig`](crate::models::BuildConfig).
//! The stock values need no file at all; a config file or environment
//! variable only overrides what differs.
//!
//! # Module Structure
//!
//! - `loader`: locates and parses JSON/TOML config files, applies env overrides
//! - `validator`: rejects configs the packager could never accept
//!
//! # Resolution Order
//!
//! 1. `BUILD_EXE_CONFIG` (must exist when set)
//! 2. `./build_exe.json`, then `./build_exe.toml`
//! 3. `~/.config/exe-builder/settings.json`
//! 4. Built-in defaults
//!
//! `BUILD_EXE_PYTHON` then replaces the interpreter regardless of source.

pub mod loader;
pub mod validator;

use crate::error::ConfigError;
use crate::models::BuildConfig;
use std::path::{Path, PathBuf};

pub use loader::{load_config_from_file, save_config_to_file};
pub use validator::validate_config;

/// Env var naming an explicit config file.
pub const CONFIG_ENV: &str = "BUILD_EXE_CONFIG";
/// Env var replacing the Python interpreter.
pub const PYTHON_ENV: &str = "BUILD_EXE_PYTHON";
/// Env var that turns the packaging step into a dry run.
pub const DRY_RUN_ENV: &str = "BUILD_EXE_DRY_RUN";

/// Resolves and loads the build configuration for a working directory.
pub struct ConfigManager {
    root: PathBuf,
    explicit_path: Option<PathBuf>,
    python_override: Option<String>,
    user_settings: Option<PathBuf>,
}

impl ConfigManager {
    /// Manager rooted at `root` with no environment influence.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ConfigManager {
            root: root.into(),
            explicit_path: None,
            python_override: None,
            user_settings: None,
        }
    }

    /// Manager rooted at `root` that honors `BUILD_EXE_CONFIG`, `BUILD_EXE_PYTHON`
    /// and the user-level settings file.
    pub fn from_env(root: impl Into<PathBuf>) -> Self {
        ConfigManager {
            root: root.into(),
            explicit_path: std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            python_override: std::env::var(PYTHON_ENV).ok().filter(|p| !p.trim().is_empty()),
            user_settings: loader::get_global_settings_path().ok(),
        }
    }

    pub fn with_explicit_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    pub fn with_python_override(mut self, python: impl Into<String>) -> Self {
        self.python_override = Some(python.into());
        self
    }

    pub fn with_user_settings(mut self, path: impl Into<PathBuf>) -> Self {
        self.user_settings = Some(path.into());
        self
    }

    /// The config file that would be used, if any.
    pub fn resolve_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        if let Some(explicit) = &self.explicit_path {
            let path = self.absolutize(explicit);
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.display().to_string()));
            }
            return Ok(Some(path));
        }

        for name in ["build_exe.json", "build_exe.toml"] {
            let candidate = self.root.join(name);
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
        }

        Ok(self.user_settings.clone().filter(|p| p.is_file()))
    }

    /// Load, override and validate.
    pub fn load(&self) -> Result<BuildConfig, ConfigError> {
        let mut config = match self.resolve_path()? {
            Some(path) => {
                eprintln!("[Config] Loading build configuration from {}", path.display());
                log::info!("[Config] Using configuration file {}", path.display());
                load_config_from_file(&path)?
            }
            None => {
                eprintln!("[Config] No configuration file found, using built-in defaults");
                BuildConfig::default()
            }
        };

        if let Some(python) = &self.python_override {
            eprintln!("[Config] Interpreter overridden by {}: {}", PYTHON_ENV, python);
            config.python = python.clone();
        }

        validate_config(&config)?;
        Ok(config)
    }

    fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Whether `BUILD_EXE_DRY_RUN` is set.
pub fn dry_run_requested() -> bool {
    std::env::var_os(DRY_RUN_ENV).is_some()
}
