//! PyInstaller command assembly.
//!
//! The invocation is a fixed sequence:
//!
//! ```text
//! pyinstaller --onefile --windowed --name=<exe> [--icon=<ico>] --add-data=<src><sep><dst>... --noconsole --clean <entry>
//! ```
//!
//! The icon entry is the only conditional part. It is left out when the icon
//! file is missing, and everything else keeps its relative order.

use crate::models::{BuildConfig, DataMapping};
use crate::packager::PackagerCommand;

/// Prefix of the icon argument.
pub const ICON_FLAG: &str = "--icon=";

/// Separator PyInstaller expects between source and destination of `--add-data`.
///
/// PyInstaller splits on `os.pathsep`: `;` on Windows, `:` elsewhere.
pub fn data_separator() -> char {
    if cfg!(windows) {
        ';'
    } else {
        ':'
    }
}

fn add_data_arg(mapping: &DataMapping) -> String {
    format!("--add-data={}{}{}", mapping.source, data_separator(), mapping.dest)
}

/// Build the packager invocation for `config`.
///
/// Pure: `icon_exists` is decided by the caller, so both branches can be
/// tested without touching the filesystem.
pub fn build_command(config: &BuildConfig, icon_exists: bool) -> PackagerCommand {
    let mut args = vec![
        "--onefile".to_string(),                  // Single EXE file
        "--windowed".to_string(),                 // No console window
        format!("--name={}", config.exe_name),    // EXE name
    ];

    if icon_exists {
        args.push(format!("{}{}", ICON_FLAG, config.icon.display()));
    }

    args.extend(config.data.iter().map(add_data_arg));
    args.push("--noconsole".to_string());
    args.push("--clean".to_string());             // Clean cache
    args.push(config.entry_point.display().to_string());

    PackagerCommand {
        program: config.packager.clone(),
        args,
        working_dir: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sep() -> char {
        data_separator()
    }

    #[test]
    fn test_full_command_with_icon() {
        let command = build_command(&BuildConfig::default(), true);
        assert_eq!(command.program, "pyinstaller");
        assert_eq!(
            command.args,
            vec![
                "--onefile".to_string(),
                "--windowed".to_string(),
                "--name=DentaDesk_License_Generator".to_string(),
                "--icon=icon.ico".to_string(),
                format!("--add-data=scripts{}scripts", sep()),
                "--noconsole".to_string(),
                "--clean".to_string(),
                "license_generator_gui.py".to_string(),
            ]
        );
        assert!(command.has_icon());
    }

    #[test]
    fn test_icon_dropped_when_missing() {
        let command = build_command(&BuildConfig::default(), false);
        assert!(!command.has_icon());
        assert_eq!(command.args.len(), 7);
        assert_eq!(command.args[2], "--name=DentaDesk_License_Generator");
        assert_eq!(command.args[3], format!("--add-data=scripts{}scripts", sep()));
    }

    #[test]
    fn test_multiple_data_mappings_keep_order() {
        let mut config = BuildConfig::default();
        config.data.push(DataMapping::new("assets", "assets"));
        let command = build_command(&config, true);
        let data: Vec<&String> = command
            .args
            .iter()
            .filter(|a| a.starts_with("--add-data="))
            .collect();
        assert_eq!(data.len(), 2);
        assert!(data[0].starts_with("--add-data=scripts"));
        assert!(data[1].starts_with("--add-data=assets"));
    }

    #[test]
    fn test_display_joins_program_and_args() {
        let command = build_command(&BuildConfig::default(), false);
        let rendered = command.to_string();
        assert!(rendered.starts_with("pyinstaller --onefile --windowed"));
        assert!(rendered.ends_with("--clean license_generator_gui.py"));
    }

    proptest! {
        #[test]
        fn prop_icon_removal_preserves_order(
            exe_name in "[A-Za-z][A-Za-z0-9_]{0,20}",
            icon in "[a-z]{1,8}\\.ico",
            entry in "[a-z_]{1,12}\\.py",
            sources in proptest::collection::vec("[a-z]{1,8}", 0..4),
        ) {
            let mut config = BuildConfig::default();
            config.exe_name = exe_name;
            config.icon = icon.into();
            config.entry_point = entry.into();
            config.data = sources.iter().map(|s| DataMapping::new(s.clone(), s.clone())).collect();

            let with_icon = build_command(&config, true);
            let without_icon = build_command(&config, false);

            // Icon sits right after --name= when present
            prop_assert!(with_icon.args[3].starts_with(ICON_FLAG));
            prop_assert!(!without_icon.has_icon());

            let filtered: Vec<String> = with_icon
                .args
                .iter()
                .filter(|a| !a.starts_with(ICON_FLAG))
                .cloned()
                .collect();
            prop_assert_eq!(filtered, without_icon.args);
        }
    }
}
