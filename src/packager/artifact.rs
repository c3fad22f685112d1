//! Location of the executable the packager produces.

use crate::models::BuildConfig;
use std::path::{Path, PathBuf};

/// `<output_dir>/<exe_name><platform exe suffix>`, relative to the build root.
pub fn expected_exe_path(config: &BuildConfig) -> PathBuf {
    config
        .output_dir
        .join(format!("{}{}", config.exe_name, std::env::consts::EXE_SUFFIX))
}

/// Whether the expected executable exists under `root`.
pub fn exe_present(root: &Path, config: &BuildConfig) -> bool {
    root.join(expected_exe_path(config)).is_file()
}
