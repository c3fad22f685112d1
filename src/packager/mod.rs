//! Packager integration
//!
//! Knows how PyInstaller is driven and what it leaves behind:
//! - Command assembly for a single-file windowed build (`args`)
//! - Progress and error classification of its log output (`output`)
//! - Requirements manifest inspection (`manifest`)
//! - Location of the produced executable (`artifact`)

pub mod args;
pub mod artifact;
pub mod manifest;
pub mod output;

pub use args::{build_command, ICON_FLAG};
pub use artifact::expected_exe_path;
pub use manifest::Manifest;

use std::fmt;
use std::path::{Path, PathBuf};

/// A fully assembled packager invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Directory the packager runs in (inherits ours when `None`)
    pub working_dir: Option<PathBuf>,
}

impl PackagerCommand {
    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.working_dir = Some(dir.to_path_buf());
        self
    }

    /// Whether an `--icon=` entry is part of the invocation.
    pub fn has_icon(&self) -> bool {
        self.args.iter().any(|a| a.starts_with(ICON_FLAG))
    }
}

impl fmt::Display for PackagerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
