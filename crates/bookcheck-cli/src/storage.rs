//! Persistent report storage
//!
//! Every `bookcheck run` is saved regardless of `--output` mode.
//! Directory layout: `{report_dir}/{host_port}_{timestamp}_{suite}/`

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use bookcheck_core::{Config, RunReport, Verdict};

/// Everything needed to persist a run.
pub struct ReportData<'a> {
    pub config: &'a Config,
    pub report: &'a RunReport,
    pub verdict: &'a Verdict,
    pub started: DateTime<Utc>,
    pub duration_secs: f64,
}

/// Save a run under `base`. Returns the report directory.
pub fn save_report(base: &Path, data: &ReportData) -> Result<PathBuf, std::io::Error> {
    let dir_name = build_dir_name(&data.config.base_url, &data.report.suite, data.started);
    let report_dir = base.join(dir_name);
    std::fs::create_dir_all(&report_dir)?;

    // config.toml: snapshot of the config used, password masked
    let mut config = data.config.clone();
    config.credentials.password = "***".to_string();
    let config_toml =
        toml::to_string_pretty(&config).map_err(|e| std::io::Error::other(e.to_string()))?;
    std::fs::write(report_dir.join("config.toml"), config_toml)?;

    let summary = serde_json::json!({
        "verdict": {
            "status": data.verdict.status.to_string(),
            "exit_code": data.verdict.exit_code,
            "reason": data.verdict.reason,
        },
        "stats": {
            "total": data.report.total,
            "passed": data.report.passed,
            "failed": data.report.failed,
            "skipped": data.report.skipped,
        },
        "meta": {
            "timestamp": data.started.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "suite": data.report.suite,
            "duration_secs": data.duration_secs,
            "base_url": data.config.base_url,
        },
    });
    std::fs::write(
        report_dir.join("summary.json"),
        serde_json::to_string_pretty(&summary).map_err(std::io::Error::other)?,
    )?;

    std::fs::write(
        report_dir.join("report.json"),
        serde_json::to_string_pretty(data.report).map_err(std::io::Error::other)?,
    )?;

    if data.report.failed > 0 {
        let http_content = bookcheck_core::to_http_file(data.report);
        std::fs::write(report_dir.join("reproductions.http"), http_content)?;
    }

    Ok(report_dir)
}

/// `{host_port}_{timestamp}_{suite}` e.g. `restful-booker.herokuapp.com_20261017T093000_smoke`
fn build_dir_name(base_url: &str, suite: &str, at: DateTime<Utc>) -> String {
    let host_port = extract_host_port(base_url);
    let ts = at.format("%Y%m%dT%H%M%S");
    format!("{host_port}_{ts}_{suite}")
}

/// `"http://localhost:3001/path"` → `"localhost_3001"`
fn extract_host_port(url: &str) -> String {
    url.split("://")
        .nth(1)
        .unwrap_or(url)
        .split('/')
        .next()
        .unwrap_or("unknown")
        .replace(':', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookcheck_core::ScenarioReport;
    use chrono::TimeZone;

    #[test]
    fn extract_host_port_standard() {
        assert_eq!(extract_host_port("http://localhost:3001"), "localhost_3001");
        assert_eq!(
            extract_host_port("https://restful-booker.herokuapp.com"),
            "restful-booker.herokuapp.com"
        );
        assert_eq!(
            extract_host_port("http://10.0.0.1:3000/v1"),
            "10.0.0.1_3000"
        );
    }

    #[test]
    fn dir_name_format() {
        let at = Utc.with_ymd_and_hms(2026, 2, 5, 19, 30, 0).unwrap();
        assert_eq!(
            build_dir_name("http://localhost:3001", "smoke", at),
            "localhost_3001_20260205T193000_smoke"
        );
    }

    #[test]
    fn saves_summary_and_masks_password() {
        let dir = tempfile::tempdir().unwrap();
        let mut scenario = ScenarioReport::new("health-check", vec!["smoke".into()]);
        scenario.finish(0.1);
        let report = RunReport::from_scenarios("smoke", vec![scenario]);
        let verdict = Verdict::from_report(&report);
        let config = Config::default();

        let path = save_report(
            dir.path(),
            &ReportData {
                config: &config,
                report: &report,
                verdict: &verdict,
                started: Utc.with_ymd_and_hms(2026, 10, 17, 8, 0, 0).unwrap(),
                duration_secs: 0.1,
            },
        )
        .unwrap();

        assert!(path.ends_with("restful-booker.herokuapp.com_20261017T080000_smoke"));
        let summary: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path.join("summary.json")).unwrap())
                .unwrap();
        assert_eq!(summary["verdict"]["status"], "PASS");
        assert_eq!(summary["meta"]["timestamp"], "2026-10-17T08:00:00Z");
        assert!(path.join("report.json").exists());
        assert!(!path.join("reproductions.http").exists());

        let snapshot = std::fs::read_to_string(path.join("config.toml")).unwrap();
        assert!(!snapshot.contains("password123"));
    }
}
