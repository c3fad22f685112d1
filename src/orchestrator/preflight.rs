//! Preflight inspection of build inputs.
//!
//! Missing inputs only produce warnings; the packager and pip stay the
//! authority on whether the build can proceed.

use std::path::Path;

use crate::models::BuildConfig;
use crate::packager::Manifest;

/// What the filesystem looks like before the build starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreflightReport {
    pub warnings: Vec<String>,
    pub icon_present: bool,
    /// Packages listed in the manifest, if it could be read
    pub declared_packages: Option<Vec<String>>,
}

/// Inspect entry point, manifest, data folders and icon relative to `root`.
pub fn inspect_inputs(config: &BuildConfig, root: &Path) -> PreflightReport {
    let mut report = PreflightReport::default();

    let entry = root.join(&config.entry_point);
    if !entry.is_file() {
        report.warnings.push(format!(
            "Entry point not found: {}",
            config.entry_point.display()
        ));
    }

    match Manifest::load(&root.join(&config.manifest)) {
        Ok(manifest) => report.declared_packages = Some(manifest.package_names()),
        Err(_) => report.warnings.push(format!(
            "Dependency manifest not found: {}",
            config.manifest.display()
        )),
    }

    for mapping in &config.data {
        if !root.join(&mapping.source).exists() {
            report
                .warnings
                .push(format!("Data folder not found: {}", mapping.source));
        }
    }

    report.icon_present = root.join(&config.icon).is_file();
    report
}
