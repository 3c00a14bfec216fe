//! Failure types and structured representation

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type of scenario failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Status code differs from the step's expectation
    UnexpectedStatus,
    /// One or more returned fields differ from the expected values
    FieldMismatch,
    /// Response body does not conform to the booking schema
    SchemaViolation,
    /// Negative-path error text differs from the expected message
    ErrorMessage,
    /// Call never produced a response (connect error, timeout)
    Transport,
    /// A step needed a value an earlier step should have captured
    MissingContext,
}

impl FailureKind {
    /// Whether the scenario stops at the failing step.
    ///
    /// Mismatches are recorded and the scenario carries on so its
    /// delete step still runs.
    #[must_use]
    pub const fn aborts_scenario(self) -> bool {
        matches!(
            self,
            Self::UnexpectedStatus | Self::Transport | Self::MissingContext
        )
    }

    /// Human-readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnexpectedStatus => "Unexpected status code",
            Self::FieldMismatch => "Response fields differ from expectation",
            Self::SchemaViolation => "Response does not match booking schema",
            Self::ErrorMessage => "Unexpected error message",
            Self::Transport => "Request failed before a response arrived",
            Self::MissingContext => "Expected value missing from context",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// One field whose observed value differs from the expected one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Mismatch {
    /// Dotted path into the response body, e.g. `booking.firstname`
    pub field: String,
    pub expected: serde_json::Value,
    /// `None` when the field is absent from the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<serde_json::Value>,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.observed {
            Some(obs) => write!(f, "{}: expected {}, got {}", self.field, self.expected, obs),
            None => write!(f, "{}: expected {}, field absent", self.field, self.expected),
        }
    }
}

/// Snapshot of HTTP request for reproduction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequestSnapshot {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// A single scenario failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Failure {
    /// Step label, e.g. "read booking"
    pub step: String,
    pub kind: FailureKind,
    pub message: String,
    /// Status the step expected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_status: Option<u16>,
    /// Status actually received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Every differing field of the step (all of them, not just the first)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<Mismatch>,
    /// Request that produced the failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestSnapshot>,
}

impl Failure {
    fn new(step: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            kind,
            message: message.into(),
            expected_status: None,
            status_code: None,
            mismatches: Vec::new(),
            request: None,
        }
    }

    #[must_use]
    pub fn unexpected_status(step: impl Into<String>, expected: u16, observed: u16) -> Self {
        let mut f = Self::new(
            step,
            FailureKind::UnexpectedStatus,
            format!("expected status {expected}, got {observed}"),
        );
        f.expected_status = Some(expected);
        f.status_code = Some(observed);
        f
    }

    #[must_use]
    pub fn field_mismatch(step: impl Into<String>, mismatches: Vec<Mismatch>) -> Self {
        let message = mismatches
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        let mut f = Self::new(step, FailureKind::FieldMismatch, message);
        f.mismatches = mismatches;
        f
    }

    #[must_use]
    pub fn schema_violation(step: impl Into<String>, violations: &[String]) -> Self {
        Self::new(step, FailureKind::SchemaViolation, violations.join("; "))
    }

    #[must_use]
    pub fn error_message(
        step: impl Into<String>,
        expected: &str,
        observed: Option<&str>,
    ) -> Self {
        let message = match observed {
            Some(obs) => format!("expected error {expected:?}, got {obs:?}"),
            None => format!("expected error {expected:?}, response carried no error text"),
        };
        Self::new(step, FailureKind::ErrorMessage, message)
    }

    #[must_use]
    pub fn transport(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(step, FailureKind::Transport, message)
    }

    #[must_use]
    pub fn missing_context(step: impl Into<String>, what: &str) -> Self {
        Self::new(
            step,
            FailureKind::MissingContext,
            format!("{what} was never captured by an earlier step"),
        )
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    #[must_use]
    pub fn with_request(mut self, request: RequestSnapshot) -> Self {
        self.request = Some(request);
        self
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.step, self.kind, self.message)
    }
}
