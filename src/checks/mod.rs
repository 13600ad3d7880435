//! The uniform check result model.
//!
//! Every check produces an ordered sequence of [`StatusRecord`]s (and the
//! usage report additionally a sequence of [`MetricRecord`]s). The worst
//! [`Severity`] across all records of one invocation decides the process
//! exit code.

pub mod connection;
pub mod health;
pub mod usage;
pub mod version;

/// Severity of a single evaluated fact, ordered by worseness.
///
/// The numeric values are the monitoring-plugin exit codes and must be
/// preserved exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    /// Monitoring-plugin exit code: 0=OK, 1=WARNING, 2=CRITICAL, 3=UNKNOWN.
    pub fn exit_code(self) -> i32 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    /// Returns the worst (highest-severity) of two severities.
    pub fn worst(a: Severity, b: Severity) -> Severity {
        a.max(b)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Ok => write!(f, "OK"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One evaluated fact about the remote system.
///
/// Immutable: created by a check, consumed once by the output bridge.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StatusRecord {
    pub severity: Severity,
    pub message: String,
}

impl StatusRecord {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Ok,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Critical,
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Unknown,
            message: message.into(),
        }
    }
}

/// One named numeric measurement exported alongside the status.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MetricRecord {
    /// Sanitized perfdata label, e.g. `max_usage_intellij_idea`.
    pub name: String,
    pub value: f64,
    /// Unit of measurement; empty for bare counts.
    pub unit: String,
}

impl MetricRecord {
    /// A unit-less counter metric (all license metrics are bare counts).
    pub fn count(name: String, value: i64) -> Self {
        Self {
            name,
            value: value as f64,
            unit: String::new(),
        }
    }
}

/// Worst severity across a record sequence; OK when the sequence is empty.
pub fn worst_severity(records: &[StatusRecord]) -> Severity {
    records
        .iter()
        .fold(Severity::Ok, |acc, r| Severity::worst(acc, r.severity))
}

/// Perfdata label for the max-usage counter of a license type.
pub fn usage_metric_name(license: &str) -> String {
    format!("max_usage_{}", sanitize_label(license))
}

/// Perfdata label for the max-available counter of a license type.
pub fn available_metric_name(license: &str) -> String {
    format!("max_available_{}", sanitize_label(license))
}

/// Lower-cases the license name and replaces every character outside
/// `a`-`z` with `_`, so the label is a stable perfdata identifier.
fn sanitize_label(license: &str) -> String {
    license
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() { c } else { '_' })
        .collect()
}
