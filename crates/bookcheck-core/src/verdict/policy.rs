//! Verdict - turns a run report into pass/fail and an exit code

use crate::report::{RunReport, ScenarioOutcome};

/// Exit code for a run where every scenario passed.
pub const EXIT_PASS: i32 = 0;
/// Exit code for a run with at least one failed scenario.
pub const EXIT_FAIL: i32 = 1;
/// Exit code for tool errors: setup, fixture or config failures, or nothing ran.
pub const EXIT_TOOL_ERROR: i32 = 3;

/// Final verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub exit_code: i32,
    pub reason: String,
}

impl Verdict {
    /// PASS requires at least one scenario and every scenario passed.
    /// Skipped scenarios (after `--stop-on-failure`) count against the run.
    #[must_use]
    pub fn from_report(report: &RunReport) -> Self {
        let ran = report.passed + report.failed;

        if ran == 0 {
            return Self {
                status: VerdictStatus::Fail,
                exit_code: EXIT_TOOL_ERROR,
                reason: "No scenarios were run".to_string(),
            };
        }

        if report.failed == 0 && report.skipped == 0 {
            return Self {
                status: VerdictStatus::Pass,
                exit_code: EXIT_PASS,
                reason: format!("All {} scenarios passed", report.passed),
            };
        }

        let mut parts = Vec::new();
        if report.failed > 0 {
            let aborted = report
                .scenarios
                .iter()
                .filter(|s| s.outcome == ScenarioOutcome::Failed && s.aborted_at.is_some())
                .count();
            parts.push(format!(
                "{} of {} scenarios failed ({} aborted)",
                report.failed, ran, aborted
            ));
        }
        if report.skipped > 0 {
            parts.push(format!("{} skipped", report.skipped));
        }

        Self {
            status: VerdictStatus::Fail,
            exit_code: EXIT_FAIL,
            reason: parts.join("; "),
        }
    }
}

/// Pass or fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}
