//! Config validation.

use crate::error::ConfigError;
use crate::models::BuildConfig;

/// Validate a program name (interpreter, packager): non-empty, no surrounding whitespace.
pub fn validate_program(label: &str, program: &str) -> Result<(), ConfigError> {
    if program.trim().is_empty() {
        return Err(ConfigError::ValidationFailed(format!(
            "{} cannot be empty",
            label
        )));
    }
    if program.trim() != program {
        return Err(ConfigError::ValidationFailed(format!(
            "{} has leading or trailing whitespace: '{}'",
            label, program
        )));
    }
    Ok(())
}

/// Validate the executable name passed as `--name=`.
///
/// The packager treats it as a bare file stem inside the output directory.
pub fn validate_exe_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::ValidationFailed(
            "Executable name cannot be empty".to_string(),
        ));
    }

    if let Some(bad) = name.chars().find(|c| matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')) {
        return Err(ConfigError::ValidationFailed(format!(
            "Executable name '{}' contains invalid character '{}'",
            name, bad
        )));
    }

    Ok(())
}

/// Validate the whole build configuration.
pub fn validate_config(config: &BuildConfig) -> Result<(), ConfigError> {
    validate_program("Python interpreter", &config.python)?;
    validate_program("Packager", &config.packager)?;
    validate_program("Packager module", &config.packager_module)?;
    validate_program("Packager package", &config.packager_package)?;
    validate_exe_name(&config.exe_name)?;

    if config.entry_point.as_os_str().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "Entry point cannot be empty".to_string(),
        ));
    }

    for mapping in &config.data {
        if mapping.source.is_empty() || mapping.dest.is_empty() {
            return Err(ConfigError::ValidationFailed(format!(
                "Data mapping '{}' -> '{}' must name both source and destination",
                mapping.source, mapping.dest
            )));
        }
    }

    Ok(())
}
