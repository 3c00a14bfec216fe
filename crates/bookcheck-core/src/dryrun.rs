//! Dry run plan types and config validation
//!
//! Describes what a run *would* do without sending any requests.
//! Used for pre-flight validation and CI previews.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Config;

// ── Plan types ──

/// Complete dry run plan: scenarios, request counts, and config warnings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunPlan {
    /// Selected suite
    pub suite: String,
    /// Scenarios in execution order
    pub scenarios: Vec<ScenarioPlan>,
    /// Requests that would be sent, including the token fetch
    pub total_requests: u64,
    /// Config/fixture validation results
    pub validations: Vec<Validation>,
}

/// Execution plan for a single scenario.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioPlan {
    pub name: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture: Option<String>,
    /// Step labels, e.g. "POST /booking"
    pub steps: Vec<String>,
}

/// A validation check result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Validation {
    pub check: String,
    pub status: ValidationStatus,
    pub message: String,
}

/// Status of a validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Ok,
    Warning,
    Error,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl RunPlan {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.validations
            .iter()
            .any(|v| v.status == ValidationStatus::Error)
    }

    /// Render for terminal output.
    #[must_use]
    pub fn to_terminal(&self) -> String {
        let mut out = Vec::new();
        out.push(format!(
            "Plan: suite '{}', {} scenarios, {} requests",
            self.suite,
            self.scenarios.len(),
            self.total_requests
        ));
        out.push(String::new());

        for s in &self.scenarios {
            let fixture = s
                .fixture
                .as_deref()
                .map(|f| format!(" ({f})"))
                .unwrap_or_default();
            out.push(format!("  {} [{}]{fixture}", s.name, s.tags.join(", ")));
            for step in &s.steps {
                out.push(format!("    - {step}"));
            }
        }

        out.push(String::new());
        out.push("Validation:".to_string());
        for v in &self.validations {
            out.push(format!("  [{}] {}", v.status, v.message));
        }
        out.join("\n")
    }
}

// ── Config validation ──

/// Validate config and produce validation results.
///
/// `needs_csv` / `needs_json` say whether the selected suite reads those
/// fixture files; missing files the suite does not need are not errors.
#[must_use]
pub fn validate_config(config: &Config, needs_csv: bool, needs_json: bool) -> Vec<Validation> {
    let mut checks = Vec::new();

    // Base URL
    if config.base_url.starts_with("https://") {
        checks.push(Validation {
            check: "base_url".into(),
            status: ValidationStatus::Ok,
            message: format!("base_url: {}", config.base_url),
        });
    } else if config.base_url.starts_with("http://") {
        checks.push(Validation {
            check: "base_url".into(),
            status: ValidationStatus::Warning,
            message: format!(
                "base_url: {} (plain http, credentials sent unencrypted)",
                config.base_url
            ),
        });
    } else {
        checks.push(Validation {
            check: "base_url".into(),
            status: ValidationStatus::Error,
            message: format!(
                "base_url: {} (missing http:// or https:// prefix)",
                config.base_url
            ),
        });
    }

    // Credentials
    if config.credentials.username.is_empty() || config.credentials.password.is_empty() {
        checks.push(Validation {
            check: "credentials".into(),
            status: ValidationStatus::Error,
            message: "credentials: username and password are required".into(),
        });
    } else {
        checks.push(Validation {
            check: "credentials".into(),
            status: ValidationStatus::Ok,
            message: format!("credentials: user '{}'", config.credentials.username),
        });
    }

    // Fixtures
    for (label, path, needed) in [
        ("fixtures.csv", &config.fixtures.csv, needs_csv),
        ("fixtures.json", &config.fixtures.json, needs_json),
    ] {
        if !needed {
            continue;
        }
        let (status, note) = if path.exists() {
            (ValidationStatus::Ok, "exists")
        } else {
            (ValidationStatus::Error, "not found")
        };
        checks.push(Validation {
            check: label.into(),
            status,
            message: format!("{label}: {} ({note})", path.display()),
        });
    }

    // Schema override
    if let Some(schema) = &config.schema {
        let (status, note) = if schema.exists() {
            (ValidationStatus::Ok, "exists")
        } else {
            (ValidationStatus::Error, "not found")
        };
        checks.push(Validation {
            check: "schema".into(),
            status,
            message: format!("schema: {} ({note})", schema.display()),
        });
    }

    // Negative-path texts
    let disabled: Vec<&str> = [
        ("invalid_input", &config.errors.invalid_input),
        ("missing_fields", &config.errors.missing_fields),
        ("forbidden", &config.errors.forbidden),
        ("not_found", &config.errors.not_found),
    ]
    .into_iter()
    .filter(|(_, text)| text.is_empty())
    .map(|(name, _)| name)
    .collect();
    if !disabled.is_empty() {
        checks.push(Validation {
            check: "errors".into(),
            status: ValidationStatus::Warning,
            message: format!(
                "errors: text check disabled for {} (status only)",
                disabled.join(", ")
            ),
        });
    }

    checks
}
