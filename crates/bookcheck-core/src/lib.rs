//! bookcheck-core: Booking model, fixtures and verdict logic
//!
//! This crate holds everything the contract suite needs that does not touch
//! the network: the wire types, fixture loading, the per-scenario
//! expectation context, field assertions and the pass/fail verdict.

pub mod assert;
pub mod config;
pub mod context;
pub mod dryrun;
pub mod fixtures;
pub mod generator;
pub mod model;
pub mod report;
pub mod verdict;

pub use assert::FieldCheck;
pub use config::{Config, ConfigError, ExpectedErrors, FixturePaths};
pub use context::{ContextField, ContextValue, ExpectationContext, ExpectationSnapshot};
pub use dryrun::{RunPlan, ScenarioPlan, Validation, ValidationStatus};
pub use fixtures::{FixtureError, FixtureFormat, FixtureSet};
pub use generator::to_http_file;
pub use model::{
    AuthToken, Booking, BookingDates, BookingId, BookingPatch, BookingRef,
    Credentials, ErrorResponse,
};
pub use report::{RunReport, ScenarioOutcome, ScenarioReport, StepRecord};
pub use verdict::{Failure, FailureKind, Mismatch, RequestSnapshot, Verdict, VerdictStatus};
