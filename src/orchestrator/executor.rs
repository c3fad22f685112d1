//! Packager execution: process spawning and output streaming.
//!
//! Both output pipes are read line by line. Every line is forwarded to the
//! caller's output channel and written to the full log; progress milestones
//! also go to the parsed log, and error lines are kept for the failure summary.

use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::AppError;
use crate::models::PackagerRun;
use crate::packager::output::{parse_progress, ErrorTail, ERROR_TAIL_LINES};
use crate::packager::PackagerCommand;
use crate::{log_info, log_parsed};

/// Receives each packager output line as it is produced.
pub type OutputSink = UnboundedSender<String>;

/// Which pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pipe {
    Stdout,
    Stderr,
}

/// What one pipe contributed.
#[derive(Debug, Default)]
struct PipeSummary {
    progress: u32,
    tail: ErrorTail,
}

async fn drain_pipe<R>(reader: Option<R>, pipe: Pipe, output: OutputSink) -> PipeSummary
where
    R: AsyncRead + Unpin,
{
    let mut summary = PipeSummary::default();
    let Some(reader) = reader else {
        return summary;
    };

    // Raw bytes: the packager writes in the console code page, which need not be UTF-8
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let decoded = String::from_utf8_lossy(&buf);
                let line = decoded.trim_end_matches(&['\r', '\n'][..]);

                let _ = output.send(line.to_string());
                log_info!("[Packager] {}", line);

                if let Some(progress) = parse_progress(line) {
                    if progress > summary.progress {
                        summary.progress = progress;
                        log_parsed!("PACKAGER PROGRESS: {}% - {}", progress, line.trim());
                    }
                }
                summary.tail.observe(line);
            }
            Err(e) => {
                eprintln!("[Build] [EXECUTOR] Stopped reading {:?}: {}", pipe, e);
                break;
            }
        }
    }

    summary
}

/// Run the packager to completion, forwarding its output lines to `output`.
///
/// # Returns
/// * `Ok(PackagerRun)` once the process has exited, whatever its status
/// * `Err(AppError::OsCommand)` if the process could not be spawned or awaited
pub async fn run_packager_process(
    command: &PackagerCommand,
    output: OutputSink,
) -> Result<PackagerRun, AppError> {
    eprintln!("[Build] [EXECUTOR] Launching: {}", command);
    log_parsed!("PACKAGER START: {}", command);

    let mut process = Command::new(&command.program);
    process
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &command.working_dir {
        process.current_dir(dir);
    }

    let mut child = process.spawn().map_err(|e| AppError::OsCommand {
        cmd: command.to_string(),
        reason: e.to_string(),
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (out, err) = tokio::join!(
        drain_pipe(stdout, Pipe::Stdout, output.clone()),
        drain_pipe(stderr, Pipe::Stderr, output)
    );

    let status = child.wait().await.map_err(|e| AppError::OsCommand {
        cmd: command.to_string(),
        reason: format!("failed while waiting for exit: {}", e),
    })?;

    // PyInstaller reports on stderr; stdout errors come first
    let mut error_tail = out.tail.into_lines();
    error_tail.extend(err.tail.into_lines());
    if error_tail.len() > ERROR_TAIL_LINES {
        error_tail.drain(..error_tail.len() - ERROR_TAIL_LINES);
    }

    let run = PackagerRun {
        code: status.code(),
        error_tail,
        progress: out.progress.max(err.progress),
    };

    log_parsed!(
        "PACKAGER EXIT: {:?} (progress {}%)",
        run.code,
        run.progress
    );
    Ok(run)
}
