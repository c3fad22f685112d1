//! EXE Builder
//!
//! Builds a standalone Windows-style executable from a Python GUI application
//! by driving pip and PyInstaller, with per-run build logs.
//!
//! The system is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Build configuration and outcome types
//! - **config**: Config file discovery, parsing and validation
//! - **system**: OS command seam (`BuildSystem`), logging setup and macros
//! - **packager**: PyInstaller command assembly, output parsing, manifest and artifact helpers
//! - **orchestrator**: The 4-step build sequence and its top-level error handler
//! - **console**: User-facing output and the acknowledgment prompt

// Core foundational modules
pub mod error;
pub mod models;

pub mod config;

// OS command execution and logging setup
pub mod system;

// Decoupled on-disk logging
pub mod log_collector;

pub mod packager;

// Build sequencing
pub mod orchestrator;

pub mod console;

// Re-export the log crate for macro usage
pub use log;

pub use log_collector::{LogCollector, LogLine};

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use error::{AppError, BuildError, ConfigError, Result};

pub use models::{BuildConfig, BuildOutcome, DataMapping, PackagerRun};

pub use config::ConfigManager;

pub use system::{initialize_logging, BuildSystem, SystemImpl};

pub use packager::{build_command, PackagerCommand};

pub use orchestrator::{run_build, BuildOrchestrator, BuildStage, OrchestrationState};

pub use console::{Console, RecordingConsole, TerminalConsole};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
