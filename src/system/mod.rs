//! System module: validated command execution for the interpreter, pip and the packager

use futures::future::BoxFuture;
use futures::FutureExt;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::AppError;
use crate::log_collector::{install_global_logger, LogCollector};
use crate::models::PackagerRun;
use crate::orchestrator::executor::{run_packager_process, OutputSink};
use crate::packager::PackagerCommand;

/// Initialize logging: per-run log files under `log_dir`, wired to the `log` facade.
///
/// Must run before anything logs; records emitted earlier are dropped.
pub fn initialize_logging(log_dir: &Path) -> Result<LogCollector, AppError> {
    let collector = LogCollector::new(log_dir).map_err(AppError::Logging)?;
    install_global_logger(&collector, log::LevelFilter::Info).map_err(AppError::Logging)?;
    log::info!("EXE builder logging initialized");
    Ok(collector)
}

/// Logging macros for convenient access
/// Use the log crate directly for target-aware routing
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        log::info!("{}", msg);
    }}
}

#[macro_export]
macro_rules! log_parsed {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        // Use target="parsed" for high-level events
        log::info!(target: "parsed", "{}", msg);
    }}
}

/// Everything the orchestrator needs from the operating system.
///
/// Production code uses [`SystemImpl`]; tests substitute a recording double.
pub trait BuildSystem: Send + Sync {
    /// Whether `python -c "import <module>"` succeeds.
    fn module_available(&self, python: &str, module: &str) -> bool;

    /// Run `python -m pip install <args...>` with inherited stdio.
    ///
    /// Returns the exit code (`None` if killed by a signal). `Err` only when the
    /// interpreter cannot be launched at all.
    fn pip_install(&self, python: &str, args: &[String]) -> Result<Option<i32>, AppError>;

    /// Run the packager to completion, streaming its output into the build log
    /// and, line by line, into `output`.
    ///
    /// `Err` only when the packager cannot be launched; a non-zero exit is
    /// reported through [`PackagerRun::code`].
    fn run_packager(
        &self,
        command: PackagerCommand,
        output: OutputSink,
    ) -> BoxFuture<'static, Result<PackagerRun, AppError>>;
}

/// Python import names: dotted identifiers only, so the probe can never inject code.
static MODULE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("valid regex"));

/// Check a module name before it is interpolated into `-c "import ..."`.
pub fn is_valid_module_name(module: &str) -> bool {
    MODULE_NAME.is_match(module)
}

/// Default production implementation of BuildSystem
pub struct SystemImpl;

impl SystemImpl {
    pub fn new() -> Self {
        SystemImpl
    }
}

impl Default for SystemImpl {
    fn default() -> Self {
        SystemImpl::new()
    }
}

impl BuildSystem for SystemImpl {
    fn module_available(&self, python: &str, module: &str) -> bool {
        if !is_valid_module_name(module) {
            log_info!("[System] [PROBE] Refusing to probe invalid module name: {}", module);
            return false;
        }

        match Command::new(python)
            .arg("-c")
            .arg(format!("import {}", module))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) => {
                log_info!("[System] [PROBE] import {} -> {:?}", module, status.code());
                status.success()
            }
            Err(e) => {
                // Missing interpreter reads as "module absent"; the install step
                // will then fail to launch and surface the real error.
                log_info!("[System] [PROBE] Could not launch {}: {}", python, e);
                false
            }
        }
    }

    fn pip_install(&self, python: &str, args: &[String]) -> Result<Option<i32>, AppError> {
        log_info!("[System] [PIP] {} -m pip install {}", python, args.join(" "));

        let status = Command::new(python)
            .arg("-m")
            .arg("pip")
            .arg("install")
            .args(args)
            .status()
            .map_err(|e| AppError::OsCommand {
                cmd: format!("{} -m pip install {}", python, args.join(" ")),
                reason: e.to_string(),
            })?;

        log_info!("[System] [PIP] pip exited with {:?}", status.code());
        Ok(status.code())
    }

    fn run_packager(
        &self,
        command: PackagerCommand,
        output: OutputSink,
    ) -> BoxFuture<'static, Result<PackagerRun, AppError>> {
        async move { run_packager_process(&command, output).await }.boxed()
    }
}
