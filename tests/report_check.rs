//! End-to-end coverage of the usage report check against a mock server.

use fls_check::checks::usage::{self, UsageReportInput};
use fls_check::checks::Severity;
use fls_check::transport::Transport;
use httpmock::prelude::*;

const REPORT_BODY: &str = r#"{
    "Overall": [
        {"License": "IntelliJ IDEA", "Max usage": 95, "Max available": 100},
        {"License": "CLion", "Max usage": 0, "Max available": 0},
        {"License": "DataGrip", "Max usage": 5, "Max available": 0}
    ]
}"#;

fn report_server() -> MockServer {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/reportapi");
        then.status(200)
            .header("content-type", "application/json")
            .body(REPORT_BODY);
    });
    server
}

fn input<'a>(url: &'a str) -> UsageReportInput<'a> {
    UsageReportInput {
        url,
        token: "secret",
        start_date: "2026-08-01",
        end_date: "2026-08-29",
        threshold: 90,
    }
}

#[tokio::test]
async fn report_evaluates_every_license_entry_in_order() {
    let server = report_server();
    let transport = Transport::new(false, false).unwrap();
    let url = server.url("/reportapi");

    let (records, metrics) = usage::run(&transport, &input(&url)).await;

    // IntelliJ IDEA: 95 % >= 90 → WARNING naming the license.
    // CLion: 0/0 → metrics only, no record.
    // DataGrip: usage without availability → WARNING.
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].severity, Severity::Warning);
    assert!(records[0].message.contains("IntelliJ IDEA"));
    assert_eq!(records[1].severity, Severity::Warning);
    assert!(records[1].message.contains("DataGrip"));

    // Two metrics per entry, in input order, regardless of outcome.
    let expected = [
        ("max_usage_intellij_idea", 95.0),
        ("max_available_intellij_idea", 100.0),
        ("max_usage_clion", 0.0),
        ("max_available_clion", 0.0),
        ("max_usage_datagrip", 5.0),
        ("max_available_datagrip", 0.0),
    ];
    assert_eq!(metrics.len(), expected.len());
    for (metric, (name, value)) in metrics.iter().zip(expected) {
        assert_eq!(metric.name, name);
        assert_eq!(metric.value, value);
        assert!(metric.unit.is_empty());
    }
}

#[tokio::test]
async fn report_is_idempotent_against_an_idempotent_responder() {
    let server = report_server();
    let transport = Transport::new(false, false).unwrap();
    let url = server.url("/reportapi");

    let first = usage::run(&transport, &input(&url)).await;
    let second = usage::run(&transport, &input(&url)).await;
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
}

#[tokio::test]
async fn validation_failure_sends_no_request_and_no_metrics() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/reportapi");
        then.status(200).body(REPORT_BODY);
    });
    let transport = Transport::new(false, false).unwrap();
    let url = server.url("/reportapi");

    let bad = UsageReportInput {
        start_date: "2024-13-40",
        ..input(&url)
    };
    let (records, metrics) = usage::run(&transport, &bad).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].severity, Severity::Warning);
    assert!(metrics.is_empty());
    assert_eq!(mock.hits(), 0);
}
