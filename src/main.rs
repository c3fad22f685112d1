use std::path::PathBuf;

use exe_builder::config::{dry_run_requested, ConfigManager};
use exe_builder::console::TerminalConsole;
use exe_builder::orchestrator::run_build;
use exe_builder::system::{initialize_logging, SystemImpl};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let root = std::env::current_dir().unwrap_or_else(|e| {
        eprintln!("[Main] WARNING: Cannot determine working directory ({}), using '.'", e);
        PathBuf::from(".")
    });

    // =========================================================================
    // LOGGING INITIALIZATION - MUST BE FIRST
    // =========================================================================
    // A broken log directory must not stop the build
    let log_collector = match initialize_logging(&root.join("logs")) {
        Ok(collector) => {
            eprintln!("[Main] ✓ Logging initialized");
            Some(collector)
        }
        Err(e) => {
            eprintln!("[Main] WARNING: {}", e.user_message());
            None
        }
    };

    let extra_args = std::env::args().skip(1).count();
    if extra_args > 0 {
        log::warn!("[Main] Ignoring {} command-line argument(s); the build takes none", extra_args);
    }

    // =========================================================================
    // BUILD
    // =========================================================================
    let manager = ConfigManager::from_env(&root);
    let mut console = TerminalConsole::stdio();
    let outcome = run_build(
        || manager.load(),
        &root,
        SystemImpl::new(),
        dry_run_requested(),
        &mut console,
    )
    .await;

    match &outcome {
        Some(outcome) => log::info!("[Main] Build finished: {}", outcome),
        None => log::info!("[Main] Build aborted"),
    }

    // =========================================================================
    // SHUTDOWN
    // =========================================================================
    if let Some(collector) = log_collector {
        if let Err(e) = collector.wait_for_empty() {
            eprintln!("[Main] WARNING: Failed to flush build log: {}", e);
        }
    }
}
