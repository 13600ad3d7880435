//! Bridge from the check result model to the monitoring-plugin renderer.
//!
//! Folds a record sequence and a metric sequence into a
//! [`nagiosplugin::Resource`]. The renderer owns the terminal action:
//! worst-state selection, text formatting, perfdata rendering, and process
//! exit with the state's code.

use nagiosplugin::{CheckResult, Metric, Resource, ServiceState};

use crate::checks::{MetricRecord, Severity, StatusRecord};

fn service_state(severity: Severity) -> ServiceState {
    match severity {
        Severity::Ok => ServiceState::Ok,
        Severity::Warning => ServiceState::Warning,
        Severity::Critical => ServiceState::Critical,
        Severity::Unknown => ServiceState::Unknown,
    }
}

/// Build the plugin resource for one invocation.
///
/// Each [`StatusRecord`] updates the resource's running state (the renderer
/// keeps the worst state seen); each [`MetricRecord`] becomes one perfdata
/// point. Metric labels are pre-sanitized, so registration cannot fail.
pub fn to_resource(
    service: &str,
    default_message: &str,
    records: &[StatusRecord],
    metrics: &[MetricRecord],
) -> Resource {
    let mut resource = Resource::new(service).with_description(default_message);
    for record in records {
        resource = resource.with_result(
            CheckResult::new()
                .with_state(service_state(record.severity))
                .with_message(record.message.clone()),
        );
    }
    for metric in metrics {
        resource = resource.with_result(Metric::new(metric.name.clone(), metric.value));
    }
    resource
}
