//! Usage report check: `POST /reportapi`.
//!
//! Fetches the per-license usage breakdown for a date range and compares
//! each license type's peak usage percentage against a threshold. Two
//! perfdata metrics are emitted per license type regardless of outcome.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::checks::{available_metric_name, usage_metric_name, MetricRecord, StatusRecord};
use crate::transport::Transport;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validated-before-use parameter bundle for the usage report.
#[derive(Debug, Clone, Copy)]
pub struct UsageReportInput<'a> {
    pub url: &'a str,
    pub token: &'a str,
    /// Period start, `YYYY-MM-DD`.
    pub start_date: &'a str,
    /// Period end, `YYYY-MM-DD`.
    pub end_date: &'a str,
    /// Usage percentage threshold, exclusive bounds (0, 100).
    pub threshold: i64,
}

#[derive(Debug, Default, Deserialize)]
struct OverallReport {
    #[serde(rename = "Overall", default)]
    licenses: Vec<LicenseUsage>,
}

#[derive(Debug, Deserialize)]
struct LicenseUsage {
    #[serde(rename = "License", default)]
    license: String,
    #[serde(rename = "Max usage", default)]
    max_usage: i64,
    #[serde(rename = "Max available", default)]
    max_available: i64,
}

/// Accumulate every input problem; any record here aborts before the request.
fn validate(input: &UsageReportInput<'_>) -> Vec<StatusRecord> {
    let mut records = Vec::new();
    if input.url.is_empty() {
        records.push(StatusRecord::warning("the report URL must not be empty"));
    }
    if input.token.is_empty() {
        records.push(StatusRecord::warning("the API token must not be empty"));
    }
    validate_date(&mut records, "start", input.start_date);
    validate_date(&mut records, "end", input.end_date);
    if input.threshold <= 0 || input.threshold >= 100 {
        records.push(StatusRecord::warning(
            "the threshold has to be greater than 0 and lower than 100",
        ));
    }
    records
}

fn validate_date(records: &mut Vec<StatusRecord>, which: &str, value: &str) {
    if value.is_empty() {
        records.push(StatusRecord::warning(format!(
            "the {which} date must not be empty (YYYY-MM-DD)"
        )));
    } else if NaiveDate::parse_from_str(value, DATE_FORMAT).is_err() {
        records.push(StatusRecord::warning(format!(
            "the {which} date {value:?} is not a valid calendar date (YYYY-MM-DD)"
        )));
    }
}

/// Run the usage report check.
///
/// Returns the full record sequence and the full metric sequence in input
/// order. Metrics are emitted per license entry even when the entry also
/// produces a WARNING/OK record; validation or request failures return an
/// empty metric sequence.
pub async fn run(
    transport: &Transport,
    input: &UsageReportInput<'_>,
) -> (Vec<StatusRecord>, Vec<MetricRecord>) {
    let mut records = validate(input);
    if !records.is_empty() {
        return (records, Vec::new());
    }

    let response = match transport
        .post_query(
            input.url,
            &[
                ("granularity", "0"),
                ("start", input.start_date),
                ("end", input.end_date),
                ("token", input.token),
            ],
        )
        .await
    {
        Ok(response) => response,
        Err(e) => return (vec![StatusRecord::unknown(e.to_string())], Vec::new()),
    };

    let report: OverallReport = match serde_json::from_str(&response.body) {
        Ok(report) => report,
        Err(e) => {
            return (
                vec![StatusRecord::warning(format!(
                    "could not parse usage report ({}): {e}",
                    response.status_line()
                ))],
                Vec::new(),
            )
        }
    };

    let mut metrics = Vec::with_capacity(report.licenses.len() * 2);
    for entry in &report.licenses {
        metrics.push(MetricRecord::count(
            usage_metric_name(&entry.license),
            entry.max_usage,
        ));
        metrics.push(MetricRecord::count(
            available_metric_name(&entry.license),
            entry.max_available,
        ));

        if entry.max_available == 0 {
            // Usage against zero available seats means the report is
            // inconsistent with the licenses installed on the server.
            if entry.max_usage > 0 {
                records.push(StatusRecord::warning(format!(
                    "{} reports usage without any available license on the server",
                    entry.license
                )));
            }
            continue;
        }

        // Multiply before dividing: (u / a) * 100 truncates to 0 for every
        // usage below 100 %.
        let percentage = entry.max_usage * 100 / entry.max_available;
        if percentage >= input.threshold {
            records.push(StatusRecord::warning(format!(
                "the usage threshold for {} is exceeded, check the licenses on the server",
                entry.license
            )));
        } else {
            records.push(StatusRecord::ok(format!(
                "the license usage for {} is {percentage}%",
                entry.license
            )));
        }
    }

    (records, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::Severity;
    use httpmock::prelude::*;

    fn transport() -> Transport {
        Transport::new(false, false).unwrap()
    }

    fn input<'a>(url: &'a str, token: &'a str) -> UsageReportInput<'a> {
        UsageReportInput {
            url,
            token,
            start_date: "2026-08-01",
            end_date: "2026-08-29",
            threshold: 90,
        }
    }

    #[tokio::test]
    async fn empty_url_and_token_accumulate_warnings() {
        let (records, metrics) = run(&transport(), &input("", "")).await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.severity == Severity::Warning));
        assert!(metrics.is_empty());
    }

    #[tokio::test]
    async fn invalid_calendar_date_fails_validation_without_a_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/reportapi");
            then.status(200).body(r#"{"Overall":[]}"#);
        });

        let url = server.url("/reportapi");
        let bad = UsageReportInput {
            start_date: "2024-13-40",
            ..input(&url, "secret")
        };
        let (records, metrics) = run(&transport(), &bad).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Warning);
        assert!(records[0].message.contains("start date"));
        assert!(metrics.is_empty());
        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn threshold_bounds_are_exclusive() {
        for threshold in [0, 100, -5, 150] {
            let bad = UsageReportInput {
                threshold,
                ..input("http://localhost/reportapi", "secret")
            };
            let (records, metrics) = run(&transport(), &bad).await;
            assert_eq!(records.len(), 1, "threshold {threshold} must fail");
            assert_eq!(records[0].severity, Severity::Warning);
            assert!(metrics.is_empty());
        }
    }

    #[tokio::test]
    async fn request_carries_granularity_dates_and_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/reportapi")
                .query_param("granularity", "0")
                .query_param("start", "2026-08-01")
                .query_param("end", "2026-08-29")
                .query_param("token", "secret");
            then.status(200).body(r#"{"Overall":[]}"#);
        });

        let url = server.url("/reportapi");
        let (records, metrics) = run(&transport(), &input(&url, "secret")).await;
        mock.assert();
        assert!(records.is_empty());
        assert!(metrics.is_empty());
    }

    #[tokio::test]
    async fn usage_below_threshold_is_ok_with_percentage() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/reportapi");
            then.status(200).body(
                r#"{"Overall":[{"License":"PyCharm","Max usage":45,"Max available":100}]}"#,
            );
        });

        let url = server.url("/reportapi");
        let (records, metrics) = run(&transport(), &input(&url, "secret")).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Ok);
        assert!(records[0].message.contains("45%"));
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].name, "max_usage_pycharm");
        assert_eq!(metrics[0].value, 45.0);
        assert_eq!(metrics[1].name, "max_available_pycharm");
        assert_eq!(metrics[1].value, 100.0);
    }

    #[tokio::test]
    async fn percentage_is_not_truncated_to_zero() {
        // 89/100 would be 0 with naive integer math ((89/100)*100); the
        // check must see 89 % and warn against a threshold of 80.
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/reportapi");
            then.status(200).body(
                r#"{"Overall":[{"License":"GoLand","Max usage":89,"Max available":100}]}"#,
            );
        });

        let url = server.url("/reportapi");
        let tight = UsageReportInput {
            threshold: 80,
            ..input(&url, "secret")
        };
        let (records, _) = run(&transport(), &tight).await;
        assert_eq!(records[0].severity, Severity::Warning);
    }

    #[tokio::test]
    async fn unparseable_body_warns_without_metrics() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/reportapi");
            then.status(500).body("internal error");
        });

        let url = server.url("/reportapi");
        let (records, metrics) = run(&transport(), &input(&url, "secret")).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Warning);
        assert!(records[0].message.contains("500 Internal Server Error"));
        assert!(metrics.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_unknown_without_metrics() {
        let (records, metrics) = run(
            &transport(),
            &input("http://127.0.0.1:1/reportapi", "secret"),
        )
        .await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Unknown);
        assert!(metrics.is_empty());
    }
}
