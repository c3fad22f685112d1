//! Integration tests for the build sequence.
//!
//! A scripted `BuildSystem` stands in for pip and PyInstaller, and a
//! `RecordingConsole` captures everything the user would see.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use exe_builder::console::RecordingConsole;
use exe_builder::error::{AppError, ConfigError};
use exe_builder::models::{BuildConfig, BuildOutcome, PackagerRun};
use exe_builder::orchestrator::executor::OutputSink;
use exe_builder::orchestrator::{
    run_build, BuildOrchestrator, BuildStage, BUILD_FAILED_PROMPT, PRESS_ENTER,
};
use exe_builder::packager::{expected_exe_path, PackagerCommand, ICON_FLAG};
use exe_builder::system::BuildSystem;
use futures::future::BoxFuture;
use futures::FutureExt;
use tempfile::TempDir;

/// How the fake packager behaves.
#[derive(Clone)]
enum PackagerScript {
    /// Exit code, error tail, lines written while running
    Exit(i32, Vec<String>, Vec<String>),
    LaunchFails,
}

#[derive(Default)]
struct Calls {
    probes: Vec<String>,
    pip: Vec<Vec<String>>,
    packager: Vec<PackagerCommand>,
}

#[derive(Clone)]
struct FakeSystem {
    module_present: bool,
    pip_exit: Option<i32>,
    pip_launch_fails: bool,
    packager: PackagerScript,
    calls: Arc<Mutex<Calls>>,
}

impl FakeSystem {
    fn new() -> Self {
        FakeSystem {
            module_present: true,
            pip_exit: Some(0),
            pip_launch_fails: false,
            packager: PackagerScript::Exit(0, vec![], vec![]),
            calls: Arc::new(Mutex::new(Calls::default())),
        }
    }

    fn last_command(&self) -> Option<PackagerCommand> {
        self.calls.lock().unwrap().packager.last().cloned()
    }
}

impl BuildSystem for FakeSystem {
    fn module_available(&self, _python: &str, module: &str) -> bool {
        self.calls.lock().unwrap().probes.push(module.to_string());
        self.module_present
    }

    fn pip_install(&self, python: &str, args: &[String]) -> Result<Option<i32>, AppError> {
        self.calls.lock().unwrap().pip.push(args.to_vec());
        if self.pip_launch_fails {
            return Err(AppError::OsCommand {
                cmd: format!("{} -m pip install", python),
                reason: "No such file or directory (os error 2)".to_string(),
            });
        }
        Ok(self.pip_exit)
    }

    fn run_packager(
        &self,
        command: PackagerCommand,
        output: OutputSink,
    ) -> BoxFuture<'static, Result<PackagerRun, AppError>> {
        self.calls.lock().unwrap().packager.push(command.clone());
        let script = self.packager.clone();
        async move {
            match script {
                PackagerScript::Exit(code, tail, lines) => {
                    for line in lines {
                        let _ = output.send(line);
                    }
                    Ok(PackagerRun {
                        code: Some(code),
                        error_tail: tail,
                        progress: if code == 0 { 100 } else { 20 },
                    })
                }
                PackagerScript::LaunchFails => Err(AppError::OsCommand {
                    cmd: command.to_string(),
                    reason: "program not found".to_string(),
                }),
            }
        }
        .boxed()
    }
}

/// Project root with entry point, manifest and data folder; icon optional.
fn project_root(with_icon: bool) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("license_generator_gui.py"), "import tkinter\n").unwrap();
    fs::write(dir.path().join("requirements.txt"), "cryptography==41.0.7\n").unwrap();
    fs::create_dir(dir.path().join("scripts")).unwrap();
    if with_icon {
        fs::write(dir.path().join("icon.ico"), b"\0\0\x01\0").unwrap();
    }
    dir
}

fn default_config() -> Result<BuildConfig, ConfigError> {
    Ok(BuildConfig::default())
}

#[tokio::test]
async fn test_icon_absent_success_reports_exe_path() {
    let root = project_root(false);
    let system = FakeSystem::new();
    let mut console = RecordingConsole::new();

    let outcome = run_build(default_config, root.path(), system.clone(), false, &mut console).await;

    let exe_path = expected_exe_path(&BuildConfig::default());
    assert_eq!(outcome, Some(BuildOutcome::Success { exe_path: exe_path.clone() }));

    let command = system.last_command().expect("packager should run");
    assert!(!command.has_icon(), "icon must be dropped: {:?}", command.args);
    assert_eq!(command.working_dir.as_deref(), Some(root.path()));

    assert!(console.contains("✓ EXE built successfully!"));
    assert!(console.contains("✓ Build completed successfully!"));
    assert!(console.contains(&format!("  {}", exe_path.display())));
    assert_eq!(console.prompts, vec![PRESS_ENTER.to_string()]);
}

#[tokio::test]
async fn test_icon_present_keeps_icon_in_position() {
    let root = project_root(true);
    let system = FakeSystem::new();
    let mut console = RecordingConsole::new();

    run_build(default_config, root.path(), system.clone(), false, &mut console).await;

    let command = system.last_command().unwrap();
    assert_eq!(command.args[2], "--name=DentaDesk_License_Generator");
    assert_eq!(command.args[3], format!("{}icon.ico", ICON_FLAG));
}

#[tokio::test]
async fn test_packager_failure_is_reported_not_raised() {
    let root = project_root(false);
    let mut system = FakeSystem::new();
    system.packager = PackagerScript::Exit(
        1,
        vec!["ERROR: Unable to find 'scripts' when adding binary and data files.".to_string()],
        vec![],
    );
    let mut console = RecordingConsole::new();

    let outcome = run_build(default_config, root.path(), system, false, &mut console).await;

    match outcome {
        Some(BuildOutcome::Failed { reason }) => {
            assert!(reason.contains("non-zero exit status 1"), "{}", reason);
            assert!(reason.contains("Unable to find 'scripts'"), "{}", reason);
        }
        other => panic!("expected failure outcome, got {:?}", other),
    }

    assert!(console.contains("✗ Build failed: "));
    assert!(console.contains("Unable to find 'scripts'"));
    assert!(!console.contains("Build completed successfully"));
    assert!(!console.lines.iter().any(|l| l.starts_with("Error: ")));
    assert_eq!(console.prompts, vec![BUILD_FAILED_PROMPT.to_string()]);
}

#[tokio::test]
async fn test_installer_launch_failure_reaches_prompt() {
    let root = project_root(false);
    let mut system = FakeSystem::new();
    system.module_present = false;
    system.pip_launch_fails = true;
    let mut console = RecordingConsole::new();

    let outcome = run_build(default_config, root.path(), system.clone(), false, &mut console).await;

    assert_eq!(outcome, None);
    assert!(console.contains("✗ PyInstaller not found, installing..."));
    assert!(console
        .lines
        .iter()
        .any(|l| l.starts_with("Error: Command '") && l.contains("No such file or directory")));
    assert_eq!(console.prompts, vec![PRESS_ENTER.to_string()]);
    assert!(system.calls.lock().unwrap().packager.is_empty());
}

#[tokio::test]
async fn test_config_error_reaches_prompt() {
    let root = project_root(false);
    let mut console = RecordingConsole::new();

    let outcome = run_build(
        || Err(ConfigError::ValidationFailed("Executable name cannot be empty".to_string())),
        root.path(),
        FakeSystem::new(),
        false,
        &mut console,
    )
    .await;

    assert_eq!(outcome, None);
    assert_eq!(
        console.lines[0],
        "Error: Configuration validation failed: Executable name cannot be empty"
    );
    assert_eq!(console.prompts, vec![PRESS_ENTER.to_string()]);
}

#[tokio::test]
async fn test_packager_launch_failure_is_fatal() {
    let root = project_root(false);
    let mut system = FakeSystem::new();
    system.packager = PackagerScript::LaunchFails;
    let mut console = RecordingConsole::new();

    let outcome = run_build(default_config, root.path(), system, false, &mut console).await;

    assert_eq!(outcome, None);
    assert!(console.lines.iter().any(|l| l.starts_with("Error: ") && l.contains("program not found")));
    assert!(!console.contains("✗ Build failed"));
    assert_eq!(console.prompts, vec![PRESS_ENTER.to_string()]);
}

#[tokio::test]
async fn test_packager_installed_only_when_missing() {
    let root = project_root(false);
    let mut system = FakeSystem::new();
    system.module_present = false;
    let mut console = RecordingConsole::new();

    run_build(default_config, root.path(), system.clone(), false, &mut console).await;

    let calls = system.calls.lock().unwrap();
    assert_eq!(calls.probes, vec!["PyInstaller".to_string()]);
    assert_eq!(calls.pip.len(), 2);
    assert_eq!(calls.pip[0], vec!["pyinstaller".to_string()]);
    assert_eq!(calls.pip[1][0], "-r");
    assert!(calls.pip[1][1].ends_with("requirements.txt"));
    assert!(console.contains("✓ PyInstaller installed"));
}

#[tokio::test]
async fn test_present_packager_skips_install() {
    let root = project_root(false);
    let system = FakeSystem::new();
    let mut console = RecordingConsole::new();

    run_build(default_config, root.path(), system.clone(), false, &mut console).await;

    let calls = system.calls.lock().unwrap();
    assert_eq!(calls.pip.len(), 1, "only the manifest install should run");
    assert!(console.contains("✓ PyInstaller is installed"));
}

#[tokio::test]
async fn test_pip_nonzero_exit_does_not_stop_build() {
    let root = project_root(false);
    let mut system = FakeSystem::new();
    system.pip_exit = Some(1);
    let mut console = RecordingConsole::new();

    let outcome = run_build(default_config, root.path(), system.clone(), false, &mut console).await;

    assert!(outcome.map_or(false, |o| o.is_success()));
    assert!(console.contains("✓ Dependencies installed"));
    assert_eq!(system.calls.lock().unwrap().packager.len(), 1);
}

#[tokio::test]
async fn test_dry_run_skips_packager() {
    let root = project_root(true);
    let system = FakeSystem::new();
    let mut console = RecordingConsole::new();

    let outcome = run_build(default_config, root.path(), system.clone(), true, &mut console).await;

    assert!(outcome.map_or(false, |o| o.is_success()));
    assert!(system.calls.lock().unwrap().packager.is_empty());
    assert!(console
        .lines
        .iter()
        .any(|l| l.starts_with("DRY RUN: pyinstaller --onefile") && l.contains("--icon=icon.ico")));
}

#[tokio::test]
async fn test_missing_inputs_only_warn() {
    let root = TempDir::new().unwrap();
    let system = FakeSystem::new();
    let mut console = RecordingConsole::new();

    let outcome = run_build(default_config, root.path(), system, false, &mut console).await;

    assert!(outcome.map_or(false, |o| o.is_success()));
    assert!(console.contains("⚠ Entry point not found: license_generator_gui.py"));
    assert!(console.contains("⚠ Dependency manifest not found: requirements.txt"));
}

#[tokio::test]
async fn test_orchestrator_visits_each_stage_once() {
    let root = project_root(false);
    let mut orchestrator = BuildOrchestrator::new(BuildConfig::default(), root.path(), FakeSystem::new());
    let mut console = RecordingConsole::new();

    let outcome = orchestrator.run(&mut console).await.unwrap();
    orchestrator.report_outcome(&outcome, &mut console);

    let state = orchestrator.state();
    assert_eq!(
        state.visited,
        vec![
            BuildStage::CheckingTool,
            BuildStage::InstallingDeps,
            BuildStage::Building,
            BuildStage::Reporting,
        ]
    );
    assert_eq!(state.icon_included, Some(false));
    assert_eq!(state.progress, 100);
    assert_eq!(state.outcome.as_ref(), Some(&outcome));
}

#[tokio::test]
async fn test_step_headers_in_order() {
    let root = project_root(false);
    let mut console = RecordingConsole::new();

    run_build(default_config, root.path(), FakeSystem::new(), false, &mut console).await;

    let headers: Vec<&String> = console.lines.iter().filter(|l| l.starts_with('[')).collect();
    assert_eq!(
        headers,
        vec![
            "[1/4] Checking PyInstaller...",
            "[2/4] Installing dependencies...",
            "[3/4] Building EXE...",
            "[4/4] Finalizing...",
        ]
    );
    assert_eq!(console.lines[1], "Building DentaDesk License Generator EXE");
}

#[tokio::test]
async fn test_custom_icon_path_checked_against_root() {
    let root = project_root(false);
    fs::create_dir(root.path().join("assets")).unwrap();
    fs::write(root.path().join("assets").join("app.ico"), b"\0\0\x01\0").unwrap();

    let mut orchestrator = BuildOrchestrator::new(BuildConfig::default(), root.path(), FakeSystem::new());
    let mut console = RecordingConsole::new();

    orchestrator.ensure_packager_present(&mut console).unwrap();
    orchestrator.install_dependencies(&mut console).unwrap();
    let outcome = orchestrator
        .assemble_and_run_command(Path::new("assets/app.ico"), &mut console)
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(orchestrator.config().icon, PathBuf::from("icon.ico"));
    let command = orchestrator.system().last_command().unwrap();
    assert!(command.has_icon());
    assert!(command.args[3].ends_with("app.ico"));
}

#[tokio::test]
async fn test_packager_output_shown_through_console() {
    let root = project_root(false);
    let mut system = FakeSystem::new();
    system.packager = PackagerScript::Exit(
        0,
        vec![],
        vec![
            "123 INFO: PyInstaller: 6.3.0".to_string(),
            "9876 INFO: Building EXE from EXE-00.toc completed successfully.".to_string(),
        ],
    );
    let mut console = RecordingConsole::new();

    run_build(default_config, root.path(), system, false, &mut console).await;

    let position = |needle: &str| console.lines.iter().position(|l| l == needle);
    let header = position("[3/4] Building EXE...").unwrap();
    let first = position("123 INFO: PyInstaller: 6.3.0").unwrap();
    let last = position("9876 INFO: Building EXE from EXE-00.toc completed successfully.").unwrap();
    let built = position("✓ EXE built successfully!").unwrap();
    assert!(header < first && first < last && last < built);
}
