//! Contract scenarios against the booking service
//!
//! A scenario is an ordered list of steps sharing one expectation context.
//! Steps within a scenario never run concurrently; distinct scenarios are
//! independent.

pub mod catalog;
mod session;
pub mod steps;

use std::time::Instant;

use bookcheck_core::{
    AuthToken, Booking, BookingId, ExpectationContext, ExpectedErrors, Failure, ScenarioReport,
};

use crate::api;
use crate::client::BookingApi;
use crate::http::Transport;
use crate::validate::SchemaValidator;

pub use session::Session;

/// Suite membership of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Smoke,
    Regression,
    Integration,
    Negative,
}

impl Tag {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smoke => "smoke",
            Self::Regression => "regression",
            Self::Integration => "integration",
            Self::Negative => "negative",
        }
    }
}

/// Requests the service must refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negative {
    InvalidData,
    MissingFields,
    UpdateInvalidToken,
    DeleteInvalidToken,
    Nonexistent,
}

impl Negative {
    pub const ALL: [Self; 5] = [
        Self::InvalidData,
        Self::MissingFields,
        Self::UpdateInvalidToken,
        Self::DeleteInvalidToken,
        Self::Nonexistent,
    ];

    /// Id that is never assigned by the service.
    pub const NONEXISTENT_ID: i64 = 999_999;

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InvalidData => "negative-invalid-data",
            Self::MissingFields => "negative-missing-fields",
            Self::UpdateInvalidToken => "negative-update-invalid-token",
            Self::DeleteInvalidToken => "negative-delete-invalid-token",
            Self::Nonexistent => "negative-nonexistent",
        }
    }

    const fn step(self) -> &'static str {
        match self {
            Self::InvalidData | Self::MissingFields => "POST /booking",
            Self::UpdateInvalidToken => "PUT /booking/1",
            Self::DeleteInvalidToken => "DELETE /booking/1",
            Self::Nonexistent => "GET /booking/999999",
        }
    }

    fn run(self, s: &mut Session<'_>) -> Result<(), Failure> {
        let bad = steps::invalid_token();
        let existing = BookingId(1);
        let errors = s.errors;
        match self {
            Self::InvalidData => {
                let booking = Booking::new(
                    "John",
                    "Wick",
                    -100,
                    true,
                    "invalid-date",
                    "invalid-date",
                    Some("Breakfast"),
                );
                steps::rejected(s, &api::create(&booking), 400, &errors.invalid_input)
            }
            Self::MissingFields => {
                let booking =
                    Booking::new("", "", 100, true, "2021-01-01", "2021-01-10", Some("Breakfast"));
                steps::rejected(s, &api::create(&booking), 400, &errors.missing_fields)
            }
            Self::UpdateInvalidToken => {
                let request = api::update(existing, &catalog::updated_booking(), &bad);
                steps::rejected(s, &request, 403, &errors.forbidden)
            }
            Self::DeleteInvalidToken => {
                steps::rejected(s, &api::delete(existing, &bad), 403, &errors.forbidden)
            }
            Self::Nonexistent => {
                let id = BookingId(Self::NONEXISTENT_ID);
                steps::rejected(s, &api::read(id), 404, &errors.not_found)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum ScenarioKind {
    /// Fixed John/Doe booking through every endpoint
    Lifecycle,
    /// One row of a fixture file; `smoke_only` runs create, read and delete
    FixtureRow { booking: Booking, smoke_only: bool },
    /// One literal parameterized row, including a partial update
    InlineRow(Booking),
    /// Create one row and validate the response against the schema
    SchemaRow(Booking),
    Negative(Negative),
    HealthCheck,
    ListIds,
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub tags: Vec<Tag>,
    /// Fixture source and 1-based row, e.g. "data/bookings.csv#2"
    pub fixture: Option<String>,
    pub kind: ScenarioKind,
}

/// Shared, read-only inputs of every scenario in a run.
#[derive(Clone, Copy)]
pub struct Environment<'t> {
    pub transport: &'t dyn Transport,
    pub token: &'t AuthToken,
    pub errors: &'t ExpectedErrors,
    pub schema: Option<&'t SchemaValidator>,
}

impl Scenario {
    fn fixed(name: &str, tags: &[Tag], kind: ScenarioKind) -> Self {
        Self {
            name: name.to_string(),
            tags: tags.to_vec(),
            fixture: None,
            kind,
        }
    }

    #[must_use]
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.as_str().to_string()).collect()
    }

    #[must_use]
    pub const fn needs_schema(&self) -> bool {
        matches!(self.kind, ScenarioKind::SchemaRow(_))
    }

    /// Step labels in execution order, for dry runs.
    #[must_use]
    pub fn step_labels(&self) -> Vec<String> {
        let labels: &[&str] = match &self.kind {
            ScenarioKind::Lifecycle => &[
                "POST /booking",
                "GET /booking/{id}",
                "PUT /booking/{id}",
                "PATCH /booking/{id}",
                "GET /booking/{id}",
                "DELETE /booking/{id}",
                "GET /booking/{id} (404)",
                "GET /booking",
                "GET /ping",
            ],
            ScenarioKind::FixtureRow {
                smoke_only: true, ..
            } => &["POST /booking", "GET /booking/{id}", "DELETE /booking/{id}"],
            ScenarioKind::FixtureRow { .. } => &[
                "POST /booking",
                "GET /booking/{id}",
                "PUT /booking/{id}",
                "GET /booking/{id}",
                "DELETE /booking/{id}",
                "GET /booking/{id} (404)",
            ],
            ScenarioKind::InlineRow(_) => &[
                "POST /booking",
                "GET /booking/{id}",
                "PUT /booking/{id}",
                "PATCH /booking/{id}",
                "GET /booking/{id}",
                "DELETE /booking/{id}",
                "GET /booking/{id} (404)",
            ],
            ScenarioKind::SchemaRow(_) => &[
                "POST /booking",
                "validate booking schema",
                "DELETE /booking/{id}",
            ],
            ScenarioKind::Negative(n) => return vec![n.step().to_string()],
            ScenarioKind::HealthCheck => &["GET /ping"],
            ScenarioKind::ListIds => &["GET /booking"],
        };
        labels.iter().map(|l| (*l).to_string()).collect()
    }

    /// Number of HTTP calls the scenario makes when nothing fails.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.step_labels()
            .iter()
            .filter(|l| !l.starts_with("validate"))
            .count()
    }

    /// Run every step with a fresh expectation context.
    pub fn execute(&self, env: &Environment<'_>) -> ScenarioReport {
        let start = Instant::now();
        let mut report = ScenarioReport::new(&self.name, self.tag_names());
        report.fixture.clone_from(&self.fixture);

        tracing::info!(scenario = %self.name, "scenario started");
        let mut ctx = ExpectationContext::new();
        let mut session = Session::new(
            BookingApi::new(env.transport, env.token),
            env.errors,
            env.schema,
        );
        let abort = self.drive(&mut session, &mut ctx).err();
        session.into_report(&mut report, abort);
        report.finish(start.elapsed().as_secs_f64());

        tracing::info!(
            scenario = %self.name,
            outcome = ?report.outcome,
            failures = report.failures.len(),
            "scenario finished"
        );
        report
    }

    fn drive(&self, s: &mut Session<'_>, ctx: &mut ExpectationContext) -> Result<(), Failure> {
        match &self.kind {
            ScenarioKind::Lifecycle => {
                steps::create(s, ctx, &catalog::lifecycle_booking())?;
                steps::read(s, ctx)?;
                steps::update(s, ctx, &catalog::updated_booking())?;
                steps::partial_update(s, ctx, &catalog::lifecycle_patch())?;
                steps::read(s, ctx)?;
                steps::delete(s, ctx)?;
                steps::read_deleted(s, ctx)?;
                ctx.clear();
                steps::list_ids(s)?;
                steps::ping(s)
            }
            ScenarioKind::FixtureRow {
                booking,
                smoke_only: true,
            } => {
                steps::create(s, ctx, booking)?;
                steps::read(s, ctx)?;
                steps::delete(s, ctx)?;
                ctx.clear();
                Ok(())
            }
            ScenarioKind::FixtureRow { booking, .. } => {
                steps::create(s, ctx, booking)?;
                steps::read(s, ctx)?;
                steps::update(s, ctx, &catalog::updated_booking())?;
                steps::read(s, ctx)?;
                steps::delete(s, ctx)?;
                steps::read_deleted(s, ctx)?;
                ctx.clear();
                Ok(())
            }
            ScenarioKind::InlineRow(booking) => {
                steps::create(s, ctx, booking)?;
                steps::read(s, ctx)?;
                steps::update(s, ctx, &catalog::updated_booking())?;
                steps::partial_update(s, ctx, &catalog::name_patch())?;
                steps::read(s, ctx)?;
                steps::delete(s, ctx)?;
                steps::read_deleted(s, ctx)?;
                ctx.clear();
                Ok(())
            }
            ScenarioKind::SchemaRow(booking) => {
                let created = steps::create(s, ctx, booking)?;
                s.expect_schema(&created)?;
                steps::delete(s, ctx)?;
                ctx.clear();
                Ok(())
            }
            ScenarioKind::Negative(negative) => negative.run(s),
            ScenarioKind::HealthCheck => steps::ping(s),
            ScenarioKind::ListIds => {
                steps::list_ids(s)?;
                Ok(())
            }
        }
    }
}
