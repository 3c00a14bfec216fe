//! Run report: what every scenario did and how it ended
//!
//! Serialized as `report.json` by the CLI; `generate_schema` exports its
//! JSON Schema for consumers of that file.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::verdict::{Failure, RequestSnapshot};

/// One HTTP exchange performed by a scenario step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepRecord {
    /// Step label, e.g. "create booking"
    pub step: String,
    pub request: RequestSnapshot,
    /// `None` when the call failed before a response arrived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Seconds spent on the call
    #[serde(default)]
    pub elapsed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Passed,
    Failed,
    /// Never started (stop-on-failure)
    Skipped,
}

impl std::fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioReport {
    pub name: String,
    pub tags: Vec<String>,
    /// Fixture row that parametrized the scenario, e.g. "data/bookings.csv#2"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture: Option<String>,
    pub outcome: ScenarioOutcome,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    #[serde(default)]
    pub failures: Vec<Failure>,
    /// Step at which the scenario stopped early
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted_at: Option<String>,
    #[serde(default)]
    pub elapsed: f64,
}

impl ScenarioReport {
    /// A report for a scenario that has not run yet.
    pub fn new(name: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            name: name.into(),
            tags,
            fixture: None,
            outcome: ScenarioOutcome::Skipped,
            steps: Vec::new(),
            failures: Vec::new(),
            aborted_at: None,
            elapsed: 0.0,
        }
    }

    /// Settle the outcome from the recorded failures.
    pub fn finish(&mut self, elapsed: f64) {
        self.elapsed = elapsed;
        self.outcome = if self.failures.is_empty() {
            ScenarioOutcome::Passed
        } else {
            ScenarioOutcome::Failed
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    /// Suite that was selected, e.g. "smoke"
    pub suite: String,
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub scenarios: Vec<ScenarioReport>,
    /// Non-scenario problems worth surfacing (e.g. cleanup that could not run)
    #[serde(default)]
    pub errors: Vec<String>,
}

impl RunReport {
    #[must_use]
    pub fn from_scenarios(suite: impl Into<String>, scenarios: Vec<ScenarioReport>) -> Self {
        let count = |o: ScenarioOutcome| scenarios.iter().filter(|s| s.outcome == o).count() as u64;
        Self {
            suite: suite.into(),
            total: scenarios.len() as u64,
            passed: count(ScenarioOutcome::Passed),
            failed: count(ScenarioOutcome::Failed),
            skipped: count(ScenarioOutcome::Skipped),
            scenarios,
            errors: Vec::new(),
        }
    }

    /// Failed scenarios paired with their failures.
    pub fn failures(&self) -> impl Iterator<Item = (&ScenarioReport, &Failure)> {
        self.scenarios
            .iter()
            .flat_map(|s| s.failures.iter().map(move |f| (s, f)))
    }
}

/// Generate JSON Schema for `report.json`.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(RunReport);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
