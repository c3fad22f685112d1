//! Decoupled logging pipeline for EXE builds.
//!
//! Every `log::*` record and every line of packager output ends up in a
//! per-run log file on disk, written by a dedicated background thread so the
//! build never waits on file I/O.
//!
//! # Architecture
//!
//! ```text
//! log::info!() / packager output
//!     |
//! [LogCollector] (non-blocking send)
//!     | (crossbeam unbounded channel)
//!     v
//! [DiskPersister thread]
//!     |
//! logs/full/<ts>_full.log      (every line)
//! logs/parsed/<ts>_parsed.log  (milestones only)
//! ```

use chrono::Local;
use crossbeam_channel::{unbounded, Sender};
use log::{Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Internal log line or special marker
enum LogMessage {
    Line(LogLine),
    /// Flush marker; the writer answers once everything before it is on disk
    Flush(std::sync::mpsc::Sender<()>),
}

/// Kind of log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogKind {
    /// Detailed output, written to the full log only
    Full,
    /// High-level milestone, written to both logs
    Parsed,
}

/// A log line with metadata
#[derive(Clone, Debug)]
pub struct LogLine {
    pub message: String,
    pub kind: LogKind,
    /// HH:MM:SS.mmm at creation
    pub timestamp: String,
}

impl LogLine {
    pub fn new(message: String) -> Self {
        LogLine {
            message,
            kind: LogKind::Full,
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
        }
    }

    pub fn parsed(message: String) -> Self {
        LogLine {
            kind: LogKind::Parsed,
            ..LogLine::new(message)
        }
    }

    fn formatted(&self) -> String {
        format!("[{}] {}\n", self.timestamp, self.message)
    }
}

/// Unified logger writing one full and one parsed log file per build run.
#[derive(Clone)]
pub struct LogCollector {
    tx: Sender<LogMessage>,
    full_log_path: PathBuf,
    parsed_log_path: PathBuf,
}

impl LogCollector {
    /// Create the log directories and this run's log files, then start the writer thread.
    pub fn new(log_dir: &Path) -> Result<Self, String> {
        let full_log_dir = log_dir.join("full");
        let parsed_log_dir = log_dir.join("parsed");
        std::fs::create_dir_all(&full_log_dir)
            .map_err(|e| format!("Failed to create full log dir: {}", e))?;
        std::fs::create_dir_all(&parsed_log_dir)
            .map_err(|e| format!("Failed to create parsed log dir: {}", e))?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let full_log_path = full_log_dir.join(format!("{}_full.log", stamp));
        let parsed_log_path = parsed_log_dir.join(format!("{}_parsed.log", stamp));

        let mut full_file = open_append(&full_log_path)?;
        let mut parsed_file = open_append(&parsed_log_path)?;

        let (tx, rx) = unbounded::<LogMessage>();

        // OS thread rather than a tokio task: records may arrive from any thread,
        // including after the runtime has shut down.
        std::thread::spawn(move || {
            while let Ok(msg) = rx.recv() {
                match msg {
                    LogMessage::Line(line) => {
                        let formatted = line.formatted();
                        let _ = full_file.write_all(formatted.as_bytes());
                        if line.kind == LogKind::Parsed {
                            let _ = parsed_file.write_all(formatted.as_bytes());
                        }
                    }
                    LogMessage::Flush(done) => {
                        let _ = full_file.flush();
                        let _ = parsed_file.flush();
                        let _ = full_file.sync_data();
                        let _ = parsed_file.sync_data();
                        let _ = done.send(());
                    }
                }
            }
            let _ = full_file.flush();
            let _ = parsed_file.flush();
        });

        eprintln!("[Log] [INIT] Build log: {}", full_log_path.display());

        Ok(LogCollector {
            tx,
            full_log_path,
            parsed_log_path,
        })
    }

    pub fn full_log_path(&self) -> &Path {
        &self.full_log_path
    }

    pub fn parsed_log_path(&self) -> &Path {
        &self.parsed_log_path
    }

    /// Send a log line (non-blocking, never fails)
    pub fn log(&self, line: LogLine) {
        let _ = self.tx.send(LogMessage::Line(line));
    }

    pub fn log_str(&self, message: impl Into<String>) {
        self.log(LogLine::new(message.into()));
    }

    pub fn log_parsed(&self, message: impl Into<String>) {
        self.log(LogLine::parsed(message.into()));
    }

    /// Block until every line sent before this call is on disk.
    pub fn wait_for_empty(&self) -> Result<(), String> {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        self.tx
            .send(LogMessage::Flush(tx))
            .map_err(|e| format!("Failed to send flush marker: {}", e))?;
        rx.recv()
            .map_err(|e| format!("Flush signal interrupted: {}", e))?;
        Ok(())
    }
}

fn open_append(path: &Path) -> Result<File, String> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Failed to open log file {}: {}", path.display(), e))
}

/// Wires all log::info!(), log::warn!(), log::error!() calls into LogCollector
impl Log for LogCollector {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}", record.level(), record.args());

            // target = "parsed" marks high-level milestones
            if record.target() == "parsed" {
                self.log_parsed(message);
            } else {
                self.log_str(message);
            }
        }
    }

    fn flush(&self) {
        let _ = self.wait_for_empty();
    }
}

/// Register `collector` as the global `log` backend.
///
/// Fails if another logger was already installed.
pub fn install_global_logger(
    collector: &LogCollector,
    max_level: log::LevelFilter,
) -> Result<(), String> {
    log::set_boxed_logger(Box::new(collector.clone()))
        .map(|()| log::set_max_level(max_level))
        .map_err(|e| format!("Failed to set LogCollector as global logger: {}", e))
}
