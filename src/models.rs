//! Core data types for the EXE builder.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A folder bundled next to the entry point (`--add-data=<source><sep><dest>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMapping {
    pub source: String,
    pub dest: String,
}

impl DataMapping {
    pub fn new(source: impl Into<String>, dest: impl Into<String>) -> Self {
        DataMapping {
            source: source.into(),
            dest: dest.into(),
        }
    }
}

/// Build configuration.
///
/// `Default` reproduces the stock DentaDesk License Generator build; a config
/// file only needs to name the fields it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub app_title: String,      // Banner title
    pub python: String,         // Interpreter used for probing and pip
    pub packager: String,       // Packager executable
    pub packager_module: String, // Import name probed for presence
    pub packager_package: String, // pip package name
    pub manifest: PathBuf,      // requirements file
    pub exe_name: String,       // --name
    pub icon: PathBuf,          // --icon (dropped when absent)
    pub data: Vec<DataMapping>, // --add-data
    pub entry_point: PathBuf,   // Script handed to the packager
    pub output_dir: PathBuf,    // Where the packager writes the EXE
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            app_title: "DentaDesk License Generator".to_string(),
            python: default_python().to_string(),
            packager: "pyinstaller".to_string(),
            packager_module: "PyInstaller".to_string(),
            packager_package: "pyinstaller".to_string(),
            manifest: PathBuf::from("requirements.txt"),
            exe_name: "DentaDesk_License_Generator".to_string(),
            icon: PathBuf::from("icon.ico"),
            data: vec![DataMapping::new("scripts", "scripts")],
            entry_point: PathBuf::from("license_generator_gui.py"),
            output_dir: PathBuf::from("dist"),
        }
    }
}

/// Interpreter name that is conventionally on PATH for this platform.
pub fn default_python() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

/// Result of the packaging step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Packager exited 0; the EXE is expected at `exe_path`
    Success { exe_path: PathBuf },
    /// Packager exited non-zero; `reason` carries the rendered error
    Failed { reason: String },
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Success { .. })
    }
}

impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildOutcome::Success { exe_path } => write!(f, "Success ({})", exe_path.display()),
            BuildOutcome::Failed { reason } => write!(f, "Failed ({})", reason),
        }
    }
}

/// Exit information of a finished packager process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackagerRun {
    /// Exit code, `None` if terminated by a signal
    pub code: Option<i32>,
    /// Last error-looking lines of output, oldest first
    pub error_tail: Vec<String>,
    /// Highest progress milestone observed (0-100)
    pub progress: u32,
}

impl PackagerRun {
    pub fn succeeded(&self) -> bool {
        self.code == Some(0)
    }
}
