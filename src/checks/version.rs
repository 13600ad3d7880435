//! Version check: `GET /check-version`.
//!
//! The server compares itself against the latest published release. When an
//! update is available the check reports WARNING, or CRITICAL when the
//! caller escalates (pending updates treated as urgent).

use serde::Deserialize;

use crate::checks::StatusRecord;
use crate::transport::Transport;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VersionResponse {
    current_version: String,
    latest_version: String,
    update_available: bool,
}

/// Run the version check. Always returns exactly one record.
///
/// `escalate` turns the "update available" WARNING into a CRITICAL.
pub async fn run(transport: &Transport, url: &str, escalate: bool) -> Vec<StatusRecord> {
    if url.is_empty() {
        return vec![StatusRecord::warning("the version check URL must not be empty")];
    }

    let response = match transport.get(url).await {
        Ok(response) => response,
        Err(e) => return vec![StatusRecord::unknown(e.to_string())],
    };

    let version: VersionResponse = match serde_json::from_str(&response.body) {
        Ok(version) => version,
        Err(e) => {
            return vec![StatusRecord::warning(format!(
                "could not parse version response ({}): {e}",
                response.status_line()
            ))]
        }
    };

    if version.current_version.is_empty() || version.latest_version.is_empty() {
        return vec![StatusRecord::warning(
            "version response is missing currentVersion or latestVersion",
        )];
    }

    if version.update_available && version.current_version != version.latest_version {
        if escalate {
            return vec![StatusRecord::critical(format!(
                "server is running version {}, install version {} as soon as possible",
                version.current_version, version.latest_version
            ))];
        }
        return vec![StatusRecord::warning(format!(
            "server is running version {}, version {} is available",
            version.current_version, version.latest_version
        ))];
    }

    vec![StatusRecord::ok(format!(
        "server is running the current version {}",
        version.current_version
    ))]
}
