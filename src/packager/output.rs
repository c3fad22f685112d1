//! Classification of PyInstaller log output.
//!
//! PyInstaller logs lines such as
//! `1234 INFO: Building EXE from EXE-00.toc completed successfully.`
//! The milestones below map those lines onto a coarse progress percentage.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;

/// Number of error lines kept for the failure report.
pub const ERROR_TAIL_LINES: usize = 20;

static BUILDING_STAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"INFO: Building (Analysis|PYZ|PKG|EXE)\b").expect("Invalid building-stage regex")
});
static EXE_COMPLETED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"INFO: Building EXE from \S+ completed successfully").expect("Invalid exe-completed regex")
});
static ERROR_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|\s)(ERROR|CRITICAL):|^Traceback \(most recent call last\)|^\w+(Error|Exception):")
        .expect("Invalid error-line regex")
});

/// Map a packager output line to a progress milestone (0-100).
///
/// Returns `None` for lines that are not milestones.
pub fn parse_progress(line: &str) -> Option<u32> {
    if EXE_COMPLETED.is_match(line) {
        return Some(100);
    }

    if let Some(caps) = BUILDING_STAGE.captures(line) {
        return match &caps[1] {
            "Analysis" => Some(20),
            "PYZ" => Some(60),
            "PKG" => Some(75),
            "EXE" => Some(90),
            _ => None,
        };
    }

    if line.contains("INFO: PyInstaller:") {
        return Some(5);
    }

    None
}

/// Whether the line reports an error worth showing in the failure summary.
pub fn is_error_line(line: &str) -> bool {
    ERROR_LINE.is_match(line.trim_start())
}

/// Bounded buffer of the most recent error lines.
#[derive(Debug, Default)]
pub struct ErrorTail {
    lines: VecDeque<String>,
}

impl ErrorTail {
    pub fn new() -> Self {
        ErrorTail::default()
    }

    /// Keep `line` if it is an error line; drops the oldest beyond capacity.
    pub fn observe(&mut self, line: &str) {
        if !is_error_line(line) {
            return;
        }
        if self.lines.len() == ERROR_TAIL_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line.trim_end().to_string());
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines.into()
    }
}
