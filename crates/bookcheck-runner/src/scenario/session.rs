//! Per-scenario session: API client, expected error texts, optional schema
//! and the non-fatal failures recorded so far

use bookcheck_core::{
    ErrorResponse, ExpectedErrors, Failure, FieldCheck, ScenarioReport, StepRecord,
};

use crate::client::{BookingApi, Exchange};
use crate::validate::SchemaValidator;

/// Everything a step needs besides the expectation context.
///
/// Failures that do not abort the scenario are collected here; the step
/// then returns `Ok` and the scenario carries on.
pub struct Session<'t> {
    pub api: BookingApi<'t>,
    pub errors: &'t ExpectedErrors,
    schema: Option<&'t SchemaValidator>,
    failures: Vec<Failure>,
}

impl<'t> Session<'t> {
    pub fn new(
        api: BookingApi<'t>,
        errors: &'t ExpectedErrors,
        schema: Option<&'t SchemaValidator>,
    ) -> Self {
        Self {
            api,
            errors,
            schema,
            failures: Vec::new(),
        }
    }

    pub fn record(&mut self, failure: Failure) {
        tracing::warn!(step = %failure.step, kind = ?failure.kind, "{}", failure.message);
        self.failures.push(failure);
    }

    /// Record the mismatches of `check`, if any, against `exchange`.
    pub fn settle(&mut self, exchange: &Exchange, check: FieldCheck) {
        if check.is_empty() {
            return;
        }
        let failure = Failure::field_mismatch(exchange.step.clone(), check.into_mismatches())
            .with_status(exchange.response.status)
            .with_request(exchange.request.clone());
        self.record(failure);
    }

    /// Compare the error text of a rejected call. An empty expectation only
    /// checks the status, which the caller has already done.
    pub fn expect_error_text(&mut self, exchange: &Exchange, expected: &str) {
        if expected.is_empty() {
            return;
        }
        let observed = ErrorResponse::from_body(&exchange.response.body);
        if observed.as_ref().is_some_and(|e| e.error == expected) {
            return;
        }
        let failure = Failure::error_message(
            exchange.step.clone(),
            expected,
            observed.as_ref().map(|e| e.error.as_str()),
        )
        .with_status(exchange.response.status)
        .with_request(exchange.request.clone());
        self.record(failure);
    }

    /// Validate `body` against the configured schema.
    ///
    /// # Errors
    ///
    /// Aborts when the scenario was built without a schema.
    pub fn expect_schema(&mut self, exchange: &Exchange) -> Result<(), Failure> {
        let Some(schema) = self.schema else {
            return Err(Failure::missing_context(exchange.step.clone(), "booking schema"));
        };
        if let Err(violations) = schema.validate(&exchange.body()) {
            let failure = Failure::schema_violation(exchange.step.clone(), &violations)
                .with_status(exchange.response.status)
                .with_request(exchange.request.clone());
            self.record(failure);
        }
        Ok(())
    }

    /// Fill `report` with what the scenario did. `abort` is the failure that
    /// stopped it, if any.
    pub fn into_report(self, report: &mut ScenarioReport, abort: Option<Failure>) {
        let steps: Vec<StepRecord> = self.api.into_steps();
        report.steps = steps;
        report.failures = self.failures;
        if let Some(failure) = abort {
            tracing::warn!(step = %failure.step, kind = ?failure.kind, "scenario aborted: {}", failure.message);
            report.aborted_at = Some(failure.step.clone());
            report.failures.push(failure);
        }
    }
}
