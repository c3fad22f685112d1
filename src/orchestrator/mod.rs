//! Build Orchestration: 4-step EXE build (CheckingTool -> InstallingDeps -> Building -> Reporting).
//!
//! Only a non-zero packager exit is recovered locally. Every other failure
//! propagates out of [`BuildOrchestrator::run`] and is handled once, by
//! [`run_build`], which prints it and still asks for acknowledgment.

pub mod executor;
pub mod preflight;
pub mod state;

use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

pub use preflight::{inspect_inputs, PreflightReport};
pub use state::{BuildStage, OrchestrationState, STAGE_COUNT};

use crate::console::Console;
use crate::error::{AppError, BuildError, ConfigError};
use crate::models::{BuildConfig, BuildOutcome};
use crate::packager::{artifact, build_command, expected_exe_path};
use crate::system::BuildSystem;
use crate::{log_info, log_parsed};

/// Horizontal rule used around banners.
pub const RULE: &str = "============================================================";
/// Prompt after a successful build or a fatal error.
pub const PRESS_ENTER: &str = "Press Enter to exit...";
/// Prompt after a failed packaging step.
pub const BUILD_FAILED_PROMPT: &str = "Build failed! Press Enter to exit...";

/// Drives one build run against a [`BuildSystem`].
pub struct BuildOrchestrator<S: BuildSystem> {
    config: BuildConfig,

    /// Directory all relative config paths resolve against
    root: PathBuf,

    system: S,

    state: OrchestrationState,

    /// Print the packager command instead of running it
    dry_run: bool,
}

impl<S: BuildSystem> BuildOrchestrator<S> {
    /// Create an orchestrator in the `CheckingTool` stage.
    pub fn new(config: BuildConfig, root: impl Into<PathBuf>, system: S) -> Self {
        BuildOrchestrator {
            config,
            root: root.into(),
            system,
            state: OrchestrationState::new(),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn state(&self) -> &OrchestrationState {
        &self.state
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    fn enter(&mut self, stage: BuildStage) -> Result<(), AppError> {
        self.state
            .transition_to(stage)
            .map_err(AppError::Orchestration)?;
        log_parsed!("STAGE TRANSITION: {:?}", stage);
        Ok(())
    }

    fn header(console: &mut dyn Console, stage: BuildStage, text: &str) {
        console.line("");
        console.line(&format!("[{}/{}] {}", stage.step_number(), STAGE_COUNT, text));
    }

    /// Step 1: make sure the packager module can be imported, installing it if not.
    ///
    /// The installer's exit status is logged, not checked. Failing to launch
    /// the interpreter at all is returned as an error.
    pub fn ensure_packager_present(&mut self, console: &mut dyn Console) -> Result<(), AppError> {
        log_parsed!("STAGE TRANSITION: {:?}", BuildStage::CheckingTool);
        let module = self.config.packager_module.clone();
        Self::header(console, BuildStage::CheckingTool, &format!("Checking {}...", module));

        if self.system.module_available(&self.config.python, &module) {
            console.line(&format!("✓ {} is installed", module));
            return Ok(());
        }

        console.line(&format!("✗ {} not found, installing...", module));
        let code = self
            .system
            .pip_install(&self.config.python, &[self.config.packager_package.clone()])?;
        if code != Some(0) {
            log::warn!("[Build] [TOOL] pip install {} exited with {:?}", self.config.packager_package, code);
        }
        console.line(&format!("✓ {} installed", module));
        Ok(())
    }

    /// Step 2: `pip install -r <manifest>`; exit status logged, not checked.
    pub fn install_dependencies(&mut self, console: &mut dyn Console) -> Result<(), AppError> {
        self.enter(BuildStage::InstallingDeps)?;
        Self::header(console, BuildStage::InstallingDeps, "Installing dependencies...");

        let manifest_path = self.root.join(&self.config.manifest);
        match crate::packager::Manifest::load(&manifest_path) {
            Ok(manifest) => log_info!(
                "[Build] [DEPS] {} declares {} package(s): {}",
                manifest_path.display(),
                manifest.requirements.len(),
                manifest.package_names().join(", ")
            ),
            Err(e) => log_info!("[Build] [DEPS] Could not read {}: {}", manifest_path.display(), e),
        }

        let args = vec!["-r".to_string(), manifest_path.display().to_string()];
        let code = self.system.pip_install(&self.config.python, &args)?;
        if code != Some(0) {
            log::warn!("[Build] [DEPS] pip install -r exited with {:?}", code);
        }
        console.line("✓ Dependencies installed");
        Ok(())
    }

    /// Step 3: build the packager command and run it.
    ///
    /// The `--icon=` entry is included only if `icon_path` exists under the
    /// build root. A non-zero packager exit becomes [`BuildOutcome::Failed`];
    /// only a launch failure is returned as an error.
    pub async fn assemble_and_run_command(
        &mut self,
        icon_path: &Path,
        console: &mut dyn Console,
    ) -> Result<BuildOutcome, AppError> {
        self.enter(BuildStage::Building)?;
        Self::header(console, BuildStage::Building, "Building EXE...");

        let icon_exists = self.root.join(icon_path).is_file();
        if !icon_exists {
            log_info!("[Build] [ICON] {} not found, building without an icon", icon_path.display());
        }

        let config = BuildConfig {
            icon: icon_path.to_path_buf(),
            ..self.config.clone()
        };
        let command = build_command(&config, icon_exists).in_dir(&self.root);
        self.state.icon_included = Some(command.has_icon());
        log_parsed!("PACKAGER COMMAND: {}", command);

        let exe_path = expected_exe_path(&self.config);

        let outcome = if self.dry_run {
            console.line(&format!("DRY RUN: {}", command));
            BuildOutcome::Success { exe_path }
        } else {
            // Packager output reaches the user through the console while it runs
            let (tx, mut rx) = mpsc::unbounded_channel::<String>();
            let packaging = self.system.run_packager(command.clone(), tx);
            let (run, ()) = tokio::join!(packaging, async {
                while let Some(line) = rx.recv().await {
                    console.line(&line);
                }
            });
            let run = run?;
            self.state.set_progress(run.progress);

            if run.succeeded() {
                console.line("✓ EXE built successfully!");
                BuildOutcome::Success { exe_path }
            } else {
                let err = BuildError::PackagingFailed {
                    cmd: command.to_string(),
                    code: run.code,
                    detail: run.error_tail.join("\n"),
                };
                console.line(&format!("✗ Build failed: {}", err));
                BuildOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };

        let elapsed = self
            .state
            .elapsed_since_start()
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        log_parsed!("BUILD OUTCOME: {} after {:.1}s", outcome, elapsed);
        self.state.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Step 4: print the summary and wait for one line of input.
    ///
    /// Never fails: the prompt is shown even if the stage bookkeeping or the
    /// read itself goes wrong.
    pub fn report_outcome(&mut self, outcome: &BuildOutcome, console: &mut dyn Console) {
        if let Err(e) = self.enter(BuildStage::Reporting) {
            eprintln!("[Build] [REPORT] {}", e);
        }

        let prompt = match outcome {
            BuildOutcome::Success { exe_path } => {
                Self::header(console, BuildStage::Reporting, "Finalizing...");
                if !self.dry_run && !artifact::exe_present(&self.root, &self.config) {
                    log::warn!(
                        "[Build] [ARTIFACT] Packager reported success but {} is missing",
                        exe_path.display()
                    );
                }

                console.line("");
                console.line(RULE);
                console.line("✓ Build completed successfully!");
                console.line(RULE);
                console.line("");
                console.line("Your EXE file is located at:");
                console.line(&format!("  {}", exe_path.display()));
                console.line("");
                console.line("You can now:");
                console.line("  1. Run the EXE directly");
                console.line("  2. Distribute it to users");
                console.line("  3. No Python installation required!");
                console.line("");
                PRESS_ENTER
            }
            BuildOutcome::Failed { .. } => BUILD_FAILED_PROMPT,
        };

        if let Err(e) = console.wait_for_ack(prompt) {
            eprintln!("[Build] [REPORT] Acknowledgment read failed: {}", e);
        }
    }

    /// Steps 1-3. Reporting is left to the caller.
    pub async fn run(&mut self, console: &mut dyn Console) -> Result<BuildOutcome, AppError> {
        console.line(RULE);
        console.line(&format!("Building {} EXE", self.config.app_title));
        console.line(RULE);

        let preflight = inspect_inputs(&self.config, &self.root);
        for warning in &preflight.warnings {
            log::warn!("[Build] [PREFLIGHT] {}", warning);
            console.line(&format!("⚠ {}", warning));
        }

        self.ensure_packager_present(console)?;
        self.install_dependencies(console)?;
        let icon = self.config.icon.clone();
        self.assemble_and_run_command(&icon, console).await
    }
}

/// Run a whole build from configuration to the acknowledgment prompt.
///
/// This is the outermost handler: any error from loading the configuration
/// or from steps 1-3 is printed as `Error: ...` and followed by the prompt.
/// Returns the packaging outcome, or `None` if the run was aborted.
pub async fn run_build<S, F>(
    load_config: F,
    root: &Path,
    system: S,
    dry_run: bool,
    console: &mut dyn Console,
) -> Option<BuildOutcome>
where
    S: BuildSystem,
    F: FnOnce() -> Result<BuildConfig, ConfigError>,
{
    match run_steps(load_config, root, system, dry_run, console).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            log::error!("[Build] Aborted: {}", e);
            log_parsed!("BUILD ABORTED: {}", e);
            console.line(&format!("Error: {}", e));
            if let Err(ack) = console.wait_for_ack(PRESS_ENTER) {
                eprintln!("[Build] [REPORT] Acknowledgment read failed: {}", ack);
            }
            None
        }
    }
}

async fn run_steps<S, F>(
    load_config: F,
    root: &Path,
    system: S,
    dry_run: bool,
    console: &mut dyn Console,
) -> crate::error::Result<BuildOutcome>
where
    S: BuildSystem,
    F: FnOnce() -> Result<BuildConfig, ConfigError>,
{
    let config = load_config()?;
    let mut orchestrator = BuildOrchestrator::new(config, root, system).with_dry_run(dry_run);
    let outcome = orchestrator.run(console).await?;
    orchestrator.report_outcome(&outcome, console);
    Ok(outcome)
}
