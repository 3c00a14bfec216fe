//! HTTP file generator - converts failed steps to .http format

use crate::report::RunReport;
use crate::verdict::RequestSnapshot;

/// Generate .http file content for every failure that carries its request.
pub fn to_http_file(report: &RunReport) -> String {
    let failures: Vec<_> = report
        .failures()
        .filter(|(_, f)| f.request.is_some())
        .collect();

    let mut lines = Vec::new();
    lines.push(format!(
        "# Reproduction requests for suite '{}' ({} failures)",
        report.suite,
        failures.len()
    ));
    lines.push("# Cookie tokens are masked; replace *** with a fresh token.".to_string());
    lines.push(String::new());

    for (idx, (scenario, failure)) in failures.into_iter().enumerate() {
        let Some(request) = &failure.request else {
            continue;
        };
        let comment = format!(
            "[{idx}] {} / {} - {}",
            scenario.name, failure.step, failure.kind
        );
        lines.push(request_to_http(request, Some(&comment)));
        lines.push(format!("# {}", failure.message));
        lines.push(String::new());
        lines.push("###".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Generate a single request as .http format
pub fn request_to_http(request: &RequestSnapshot, comment: Option<&str>) -> String {
    let mut lines = Vec::new();

    if let Some(c) = comment {
        lines.push(format!("### {c}"));
    }

    lines.push(format!("{} {}", request.method, request.url));

    let mut headers: Vec<_> = request.headers.iter().collect();
    headers.sort();
    for (key, value) in headers {
        lines.push(format!("{key}: {value}"));
    }

    if let Some(body) = &request.body {
        if !request.headers.contains_key("Content-Type") {
            lines.push("Content-Type: application/json".to_string());
        }
        lines.push(String::new());
        lines.push(body.clone());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ScenarioReport;
    use crate::verdict::Failure;
    use std::collections::HashMap;

    fn sample_report() -> RunReport {
        let request = RequestSnapshot {
            method: "PUT".to_string(),
            url: "https://booker.test/booking/1".to_string(),
            headers: HashMap::from([("Cookie".to_string(), "token=***".to_string())]),
            body: Some(r#"{"firstname":"Jane"}"#.to_string()),
        };
        let mut s = ScenarioReport::new("negative-update-invalid-token", vec!["negative".into()]);
        s.failures.push(
            Failure::unexpected_status("update with invalid token", 403, 200)
                .with_request(request),
        );
        s.failures
            .push(Failure::transport("ping", "timed out"));
        s.finish(0.3);
        RunReport::from_scenarios("negative", vec![s])
    }

    #[test]
    fn only_failures_with_requests_are_rendered() {
        let output = to_http_file(&sample_report());
        assert!(output.contains("# Reproduction requests for suite 'negative' (1 failures)"));
        assert!(!output.contains("timed out"));
    }

    #[test]
    fn renders_request() {
        let output = to_http_file(&sample_report());
        insta::assert_snapshot!(output, @r#"
        # Reproduction requests for suite 'negative' (1 failures)
        # Cookie tokens are masked; replace *** with a fresh token.

        ### [0] negative-update-invalid-token / update with invalid token - Unexpected status code
        PUT https://booker.test/booking/1
        Cookie: token=***
        Content-Type: application/json

        {"firstname":"Jane"}
        # expected status 403, got 200

        ###
        "#);
    }

    #[test]
    fn request_to_http_basic() {
        let request = RequestSnapshot {
            method: "GET".to_string(),
            url: "https://booker.test/ping".to_string(),
            headers: HashMap::new(),
            body: None,
        };

        let output = request_to_http(&request, Some("Health check"));

        assert_eq!(output, "### Health check\nGET https://booker.test/ping");
    }
}
