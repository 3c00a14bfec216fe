//! bookcheck CLI - contract tests for the restful-booker API

mod storage;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bookcheck_core::{Config, RunReport, ScenarioOutcome, Verdict, VerdictStatus};
use bookcheck_runner::{Runner, Suite, validate::BUNDLED_SCHEMA};

#[derive(Parser)]
#[command(name = "bookcheck")]
#[command(about = "End-to-end contract tests for the restful-booker API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Debug-level logs (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a suite against the booking service
    Run {
        /// Scenarios to run
        #[arg(short, long, default_value = "all")]
        suite: SuiteArg,

        /// Config file (default: .bookcheck.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the service URL from config
        #[arg(long)]
        base_url: Option<String>,

        /// Parallel scenarios (default from config)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Do not start new scenarios after the first failure
        #[arg(long)]
        stop_on_failure: bool,

        /// Do not save the report
        #[arg(long)]
        no_save: bool,
    },

    /// Show the scenarios a run would execute without sending requests
    Plan {
        #[arg(short, long, default_value = "all")]
        suite: SuiteArg,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Initialize config file
    Init,

    /// Print the bundled booking schema, or the report schema with --report
    Schema {
        #[arg(long)]
        report: bool,
    },

    /// Show usage guide (config, suites, CI integration)
    Guide,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SuiteArg {
    Smoke,
    Regression,
    Integration,
    Negative,
    All,
}

impl From<SuiteArg> for Suite {
    fn from(arg: SuiteArg) -> Self {
        match arg {
            SuiteArg::Smoke => Suite::Smoke,
            SuiteArg::Regression => Suite::Regression,
            SuiteArg::Integration => Suite::Integration,
            SuiteArg::Negative => Suite::Negative,
            SuiteArg::All => Suite::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.output);

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

/// Logs go to stderr so `--output json` stays parseable.
fn init_logging(verbose: bool, output: OutputFormat) {
    let default = match (output, verbose) {
        (_, true) => "bookcheck=debug,bookcheck_core=debug,bookcheck_runner=debug",
        (OutputFormat::Silent, false) => "off",
        _ => "bookcheck=info,bookcheck_core=info,bookcheck_runner=info",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let cfg = match path {
        Some(p) => Config::load(p).with_context(|| format!("loading {}", p.display()))?,
        None => Config::load_default()?,
    };
    Ok(cfg)
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Run {
            suite,
            config,
            base_url,
            workers,
            stop_on_failure,
            no_save,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(url) = base_url {
                cfg.base_url = url;
                cfg.validate()?;
            }
            let suite = Suite::from(suite);

            let runner = Runner::from_config(&cfg)
                .with_suite(suite)
                .with_workers(workers.unwrap_or(cfg.workers))
                .with_stop_on_failure(stop_on_failure);

            if cli.output == OutputFormat::Terminal {
                eprintln!("Config:");
                eprintln!("  base_url: {}", cfg.base_url());
                eprintln!("  suite:    {suite}");
                eprintln!("  workers:  {}", workers.unwrap_or(cfg.workers));
                eprintln!();
            }

            tracing::debug!(suite = %suite, stop_on_failure, "starting run");
            let started = chrono::Utc::now();
            let clock = Instant::now();
            let report = runner.run()?;
            let duration_secs = clock.elapsed().as_secs_f64();

            let verdict = Verdict::from_report(&report);

            match cli.output {
                OutputFormat::Terminal => print_terminal(&report, &verdict),
                OutputFormat::Json => {
                    let json_output = serde_json::json!({
                        "verdict": {
                            "status": verdict.status.to_string(),
                            "exit_code": verdict.exit_code,
                            "reason": verdict.reason,
                        },
                        "report": report,
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
                OutputFormat::Silent => {}
            }

            if !no_save {
                let data = storage::ReportData {
                    config: &cfg,
                    report: &report,
                    verdict: &verdict,
                    started,
                    duration_secs,
                };
                match storage::save_report(&cfg.report_dir(), &data) {
                    Ok(path) => {
                        if cli.output != OutputFormat::Silent {
                            eprintln!("Report saved: {}", path.display());
                        }
                    }
                    Err(e) => eprintln!("Warning: failed to save report: {e}"),
                }
            }

            Ok(verdict.exit_code)
        }

        Commands::Plan { suite, config } => {
            let cfg = load_config(config.as_deref())?;
            let plan = Runner::from_config(&cfg).with_suite(suite.into()).plan();
            match cli.output {
                OutputFormat::Terminal => println!("{}", plan.to_terminal()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
                OutputFormat::Silent => {}
            }
            Ok(i32::from(plan.has_errors()))
        }

        Commands::Init => {
            let config_path = ".bookcheck.toml";
            if Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - base_url: booking service to test");
            println!("  - credentials: admin user for POST /auth");
            println!("  - fixtures: CSV and JSON booking rows");
            println!("  - errors: expected negative-path messages");
            Ok(0)
        }

        Commands::Schema { report } => {
            if report {
                println!("{}", bookcheck_core::report::generate_schema());
            } else {
                print!("{BUNDLED_SCHEMA}");
            }
            Ok(0)
        }

        Commands::Guide => {
            print!("{}", include_str!("../docs/GUIDE.md"));
            Ok(0)
        }
    }
}

fn print_terminal(report: &RunReport, verdict: &Verdict) {
    let icon = if verdict.status == VerdictStatus::Pass {
        "PASS"
    } else {
        "FAIL"
    };
    println!("\n{icon}: {}", verdict.reason);
    println!(
        "  Scenarios: {} total, {} passed, {} failed, {} skipped",
        report.total, report.passed, report.failed, report.skipped
    );
    println!("  Exit code: {}", verdict.exit_code);

    let failed: Vec<_> = report
        .scenarios
        .iter()
        .filter(|s| s.outcome == ScenarioOutcome::Failed)
        .collect();
    if failed.is_empty() {
        return;
    }

    println!("\nFailures ({}):", failed.len());
    for scenario in failed {
        let aborted = scenario
            .aborted_at
            .as_deref()
            .map(|step| format!(" (aborted at {step})"))
            .unwrap_or_default();
        println!("  {}{aborted}", scenario.name);
        for f in &scenario.failures {
            println!("    [{}] {}: {}", f.step, f.kind, f.message);
        }
    }
}
