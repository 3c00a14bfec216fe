//! Run orchestration: fixtures, schema, token, then the worker pool

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use bookcheck_core::dryrun::{RunPlan, ScenarioPlan, Validation, ValidationStatus};
use bookcheck_core::{
    Config, FixtureError, FixtureSet, RunReport, ScenarioOutcome, ScenarioReport,
};

use crate::auth::{self, SetupError};
use crate::http::{HttpTransport, Transport, TransportError};
use crate::scenario::{Environment, Scenario, catalog};
use crate::suite::Suite;
use crate::validate::{SchemaError, SchemaValidator};

/// Contract suite runner
pub struct Runner {
    config: Config,
    suite: Suite,
    workers: usize,
    stop_on_failure: bool,
    transport: Option<Arc<dyn Transport>>,
}

impl Runner {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            config: config.clone(),
            suite: Suite::default(),
            workers: config.workers,
            stop_on_failure: false,
            transport: None,
        }
    }

    #[must_use]
    pub fn with_suite(mut self, suite: Suite) -> Self {
        self.suite = suite;
        self
    }

    /// Worker threads; values below 1 are raised to 1.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    #[must_use]
    pub fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Send through `transport` instead of HTTP.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    fn load_fixtures(&self) -> Result<(Option<FixtureSet>, Option<FixtureSet>), FixtureError> {
        if !self.suite.needs_fixtures() {
            return Ok((None, None));
        }
        let csv = FixtureSet::load(&self.config.fixtures.csv)?;
        let json = FixtureSet::load(&self.config.fixtures.json)?;
        tracing::info!(
            csv_rows = csv.len(),
            json_rows = json.len(),
            "fixtures loaded"
        );
        Ok((Some(csv), Some(json)))
    }

    fn schema(&self) -> Result<SchemaValidator, SchemaError> {
        match &self.config.schema {
            Some(path) => SchemaValidator::from_path(path),
            None => SchemaValidator::bundled(),
        }
    }

    /// List what a run would do. No request is sent.
    ///
    /// Fixture files that cannot be loaded are reported as validation
    /// errors and contribute no scenarios.
    #[must_use]
    pub fn plan(&self) -> RunPlan {
        let needs = self.suite.needs_fixtures();
        let mut validations = bookcheck_core::dryrun::validate_config(&self.config, needs, needs);

        let mut load = |label: &str, path: &std::path::Path| -> Option<FixtureSet> {
            if !needs || !path.exists() {
                return None;
            }
            match FixtureSet::load(path) {
                Ok(set) => {
                    validations.push(Validation {
                        check: label.into(),
                        status: if set.is_empty() {
                            ValidationStatus::Warning
                        } else {
                            ValidationStatus::Ok
                        },
                        message: format!("{label}: {} rows", set.len()),
                    });
                    Some(set)
                }
                Err(e) => {
                    validations.push(Validation {
                        check: label.into(),
                        status: ValidationStatus::Error,
                        message: format!("{label}: {e}"),
                    });
                    None
                }
            }
        };
        let csv = load("fixtures.csv", &self.config.fixtures.csv);
        let json = load("fixtures.json", &self.config.fixtures.json);

        let scenarios = catalog::build(self.suite, csv.as_ref(), json.as_ref());
        if scenarios.iter().any(Scenario::needs_schema) {
            if let Err(e) = self.schema() {
                validations.push(Validation {
                    check: "schema".into(),
                    status: ValidationStatus::Error,
                    message: e.to_string(),
                });
            }
        }

        let total_requests = scenarios.iter().map(|s| s.request_count() as u64).sum::<u64>()
            + u64::from(!scenarios.is_empty());

        RunPlan {
            suite: self.suite.to_string(),
            scenarios: scenarios
                .iter()
                .map(|s| ScenarioPlan {
                    name: s.name.clone(),
                    tags: s.tag_names(),
                    fixture: s.fixture.clone(),
                    steps: s.step_labels(),
                })
                .collect(),
            total_requests,
            validations,
        }
    }

    /// Run the selected suite.
    ///
    /// # Errors
    ///
    /// Fixture, schema, client or auth problems abort the run before any
    /// scenario starts. Scenario failures are part of the report.
    pub fn run(&self) -> Result<RunReport, RunError> {
        let (csv, json) = self.load_fixtures()?;
        let scenarios = catalog::build(self.suite, csv.as_ref(), json.as_ref());
        if scenarios.is_empty() {
            tracing::warn!(suite = %self.suite, "no scenarios selected");
            return Ok(RunReport::from_scenarios(self.suite.as_str(), Vec::new()));
        }

        let schema = if scenarios.iter().any(Scenario::needs_schema) {
            Some(self.schema()?)
        } else {
            None
        };

        let transport: Arc<dyn Transport> = match &self.transport {
            Some(t) => Arc::clone(t),
            None => Arc::new(HttpTransport::new(
                self.config.base_url(),
                Duration::from_secs(self.config.timeout_secs),
            )?),
        };

        let token = auth::fetch_token(transport.as_ref(), &self.config.credentials)?;

        let workers = self.workers.min(scenarios.len());
        tracing::info!(
            suite = %self.suite,
            scenarios = scenarios.len(),
            workers,
            "run started"
        );

        let env = Environment {
            transport: transport.as_ref(),
            token: &token,
            errors: &self.config.errors,
            schema: schema.as_ref(),
        };
        let reports = execute_all(&scenarios, &env, workers, self.stop_on_failure);
        let report = RunReport::from_scenarios(self.suite.as_str(), reports);

        tracing::info!(
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            "run finished"
        );
        Ok(report)
    }
}

/// Run `scenarios` on `workers` threads. Each worker takes the next
/// unstarted scenario; reports come back in catalog order.
fn execute_all(
    scenarios: &[Scenario],
    env: &Environment<'_>,
    workers: usize,
    stop_on_failure: bool,
) -> Vec<ScenarioReport> {
    let cursor = AtomicUsize::new(0);
    let stop = AtomicBool::new(false);
    let mut finished: Vec<Option<ScenarioReport>> = vec![None; scenarios.len()];

    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers.max(1) {
            handles.push(scope.spawn(|| {
                let mut done = Vec::new();
                while !stop.load(Ordering::SeqCst) {
                    let i = cursor.fetch_add(1, Ordering::SeqCst);
                    let Some(scenario) = scenarios.get(i) else {
                        break;
                    };
                    let report = scenario.execute(env);
                    if stop_on_failure && report.outcome == ScenarioOutcome::Failed {
                        stop.store(true, Ordering::SeqCst);
                    }
                    done.push((i, report));
                }
                done
            }));
        }

        for handle in handles {
            match handle.join() {
                Ok(done) => {
                    for (i, report) in done {
                        finished[i] = Some(report);
                    }
                }
                Err(_) => tracing::error!("worker panicked; its scenarios are reported as skipped"),
            }
        }
    });

    scenarios
        .iter()
        .zip(finished)
        .map(|(scenario, report)| {
            report.unwrap_or_else(|| {
                let mut skipped = ScenarioReport::new(&scenario.name, scenario.tag_names());
                skipped.fixture.clone_from(&scenario.fixture);
                skipped
            })
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Fixture error: {0}")]
    Fixture(#[from] FixtureError),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Setup failed: {0}")]
    Setup(#[from] SetupError),
    #[error("HTTP client error: {0}")]
    Client(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeBooker;
    use std::io::Write;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn fixture_config(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.fixtures.csv = write(
            dir,
            "bookings.csv",
            "firstname,lastname,totalprice,depositpaid,checkin,checkout,additionalneeds\n\
             Ann,Lee,90,true,2022-03-01,2022-03-04,Breakfast\n\
             Bo,Kim,120,false,2022-04-01,2022-04-02,\n",
        );
        config.fixtures.json = write(
            dir,
            "bookings.json",
            r#"[{"firstname":"Cy","lastname":"Ng","totalprice":70,"depositpaid":true,
                "bookingdates":{"checkin":"2022-05-01","checkout":"2022-05-03"}}]"#,
        );
        config
    }

    fn runner(config: &Config, fake: &Arc<FakeBooker>) -> Runner {
        Runner::from_config(config).with_transport(Arc::clone(fake) as Arc<dyn Transport>)
    }

    #[test]
    fn all_suite_passes_in_catalog_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_config(&dir);
        let fake = Arc::new(FakeBooker::new());

        let report = runner(&config, &fake).with_suite(Suite::All).run().unwrap();
        assert_eq!(report.failed, 0, "{:?}", report.failures().collect::<Vec<_>>());
        assert_eq!(report.total, 3 + 9 + 2 + 1 + 1 + 5);
        assert_eq!(report.passed, report.total);
        assert_eq!(report.scenarios[0].name, "health-check");
        assert_eq!(report.scenarios.last().unwrap().name, "negative-nonexistent");
        assert_eq!(fake.calls_to("POST /auth"), 1);
        assert_eq!(fake.stored(), 0);
    }

    #[test]
    fn single_worker_matches_parallel_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_config(&dir);
        let fake = Arc::new(FakeBooker::new());
        let report = runner(&config, &fake)
            .with_suite(Suite::Regression)
            .with_workers(1)
            .run()
            .unwrap();
        let names: Vec<&str> = report.scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["csv-row-1", "csv-row-2", "json-row-1", "schema-row-1"]);
        assert_eq!(report.passed, 4);
    }

    #[test]
    fn smoke_suite_skips_updates() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_config(&dir);
        let fake = Arc::new(FakeBooker::new());
        let report = runner(&config, &fake).with_suite(Suite::Smoke).run().unwrap();
        assert_eq!(report.total, 2 + 3);
        assert_eq!(report.passed, 5);
        assert_eq!(fake.calls_to("PUT /booking/1"), 0);
    }

    #[test]
    fn bad_fixture_aborts_before_any_call() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = fixture_config(&dir);
        config.fixtures.csv = write(
            &dir,
            "broken.csv",
            "firstname,lastname,totalprice,depositpaid,checkin,checkout\nA,B,lots,true,2022-01-01,2022-01-02\n",
        );
        let fake = Arc::new(FakeBooker::new());
        let err = runner(&config, &fake).with_suite(Suite::Smoke).run().unwrap_err();
        assert!(matches!(err, RunError::Fixture(FixtureError::InvalidInteger { row: 1, .. })));
        assert_eq!(fake.total_calls(), 0);
    }

    #[test]
    fn auth_failure_is_fatal() {
        let fake = Arc::new(FakeBooker::new().with_auth_status(500));
        let err = runner(&Config::default(), &fake)
            .with_suite(Suite::Negative)
            .run()
            .unwrap_err();
        assert!(matches!(err, RunError::Setup(SetupError::AuthStatus(500))));
        assert_eq!(fake.total_calls(), 1);
    }

    #[test]
    fn stop_on_failure_skips_the_rest() {
        let fake = Arc::new(FakeBooker::new().with_ping_status(500));
        let report = runner(&Config::default(), &fake)
            .with_suite(Suite::Integration)
            .with_workers(1)
            .with_stop_on_failure(true)
            .run()
            .unwrap();
        assert_eq!(report.scenarios[0].outcome, ScenarioOutcome::Failed);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, report.total - 1);
        assert!(report.scenarios[1..].iter().all(|s| s.steps.is_empty()));
    }

    #[test]
    fn plan_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_config(&dir);
        let fake = Arc::new(FakeBooker::new());
        let plan = runner(&config, &fake).with_suite(Suite::Regression).plan();

        assert_eq!(fake.total_calls(), 0);
        assert_eq!(plan.scenarios.len(), 4);
        // 2 csv rows * 6 + 1 json row * 6 + 1 schema row * 2 + auth
        assert_eq!(plan.total_requests, 12 + 6 + 2 + 1);
        assert!(!plan.has_errors(), "{}", plan.to_terminal());
    }

    #[test]
    fn plan_reports_unparseable_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = fixture_config(&dir);
        config.fixtures.json = write(&dir, "bad.json", "{not json");
        let plan = Runner::from_config(&config).with_suite(Suite::Smoke).plan();
        assert!(plan.has_errors());
        assert!(plan.scenarios.iter().all(|s| !s.name.starts_with("json-")));
        assert!(plan.scenarios.iter().any(|s| s.name == "csv-row-2"));
    }
}
