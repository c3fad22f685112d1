//! Build State Management and Stage Tracking
//!
//! The build is strictly linear:
//!
//! ```text
//! CheckingTool -> InstallingDeps -> Building -> Reporting
//! ```
//!
//! Each stage is entered exactly once and there are no retries.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::models::BuildOutcome;

/// Discrete stages of a build run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildStage {
    /// Step 1: Probe for the packager, install it if missing
    CheckingTool,

    /// Step 2: pip install -r <manifest>
    InstallingDeps,

    /// Step 3: Assemble and run the packager command
    Building,

    /// Step 4: Print the summary and wait for acknowledgment
    Reporting,
}

impl BuildStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStage::CheckingTool => "checking-tool",
            BuildStage::InstallingDeps => "installing-deps",
            BuildStage::Building => "building",
            BuildStage::Reporting => "reporting",
        }
    }

    /// 1-based step number shown as `[n/4]`.
    pub fn step_number(&self) -> u32 {
        match self {
            BuildStage::CheckingTool => 1,
            BuildStage::InstallingDeps => 2,
            BuildStage::Building => 3,
            BuildStage::Reporting => 4,
        }
    }

    /// The only stage that may follow this one.
    pub fn next(&self) -> Option<BuildStage> {
        match self {
            BuildStage::CheckingTool => Some(BuildStage::InstallingDeps),
            BuildStage::InstallingDeps => Some(BuildStage::Building),
            BuildStage::Building => Some(BuildStage::Reporting),
            BuildStage::Reporting => None,
        }
    }

    pub fn can_transition_to(&self, next: BuildStage) -> bool {
        self.next() == Some(next)
    }
}

/// Total number of stages, for `[n/4]` headers.
pub const STAGE_COUNT: u32 = 4;

/// Progress of one build run.
#[derive(Debug, Clone)]
pub struct OrchestrationState {
    /// Current stage
    pub stage: BuildStage,

    /// Stages entered so far, in order
    pub visited: Vec<BuildStage>,

    /// Whether the icon argument made it into the command (set in Building)
    pub icon_included: Option<bool>,

    /// Outcome of the Building stage
    pub outcome: Option<BuildOutcome>,

    /// Highest packager progress milestone (0-100)
    pub progress: u32,

    pub start_time: SystemTime,
}

impl OrchestrationState {
    /// New run, already in `CheckingTool`.
    pub fn new() -> Self {
        OrchestrationState {
            stage: BuildStage::CheckingTool,
            visited: vec![BuildStage::CheckingTool],
            icon_included: None,
            outcome: None,
            progress: 0,
            start_time: SystemTime::now(),
        }
    }

    /// Move to `next`, which must be the direct successor of the current stage.
    pub fn transition_to(&mut self, next: BuildStage) -> Result<(), String> {
        if !self.stage.can_transition_to(next) {
            return Err(format!(
                "Invalid stage transition: {} -> {}",
                self.stage.as_str(),
                next.as_str()
            ));
        }
        self.stage = next;
        self.visited.push(next);
        Ok(())
    }

    pub fn set_progress(&mut self, percent: u32) {
        self.progress = percent.min(100);
    }

    pub fn elapsed_since_start(&self) -> Result<std::time::Duration, std::time::SystemTimeError> {
        self.start_time.elapsed()
    }
}

impl Default for OrchestrationState {
    fn default() -> Self {
        OrchestrationState::new()
    }
}
