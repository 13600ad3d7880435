//! Health check: `GET /health`.
//!
//! The server reports its identity and the time of its last call home to
//! the licensing backend. Both fields are required; an empty field means
//! the server never completed a call home and is reported as WARNING.

use serde::Deserialize;

use crate::checks::StatusRecord;
use crate::transport::Transport;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HealthResponse {
    #[serde(rename = "serverUID")]
    server_uid: String,
    #[serde(rename = "lastCallHome")]
    last_call_home: String,
}

/// Run the health check. Always returns exactly one record.
pub async fn run(transport: &Transport, url: &str) -> Vec<StatusRecord> {
    if url.is_empty() {
        return vec![StatusRecord::warning("the health check URL must not be empty")];
    }

    let response = match transport.get(url).await {
        Ok(response) => response,
        Err(e) => return vec![StatusRecord::unknown(e.to_string())],
    };

    let health: HealthResponse = match serde_json::from_str(&response.body) {
        Ok(health) => health,
        Err(e) => {
            return vec![StatusRecord::warning(format!(
                "could not parse health response ({}): {e}",
                response.status_line()
            ))]
        }
    };

    let mut missing = Vec::new();
    if health.server_uid.is_empty() {
        missing.push("serverUID");
    }
    if health.last_call_home.is_empty() {
        missing.push("lastCallHome");
    }
    if !missing.is_empty() {
        return vec![StatusRecord::warning(format!(
            "health response is missing required field(s): {}",
            missing.join(", ")
        ))];
    }

    vec![StatusRecord::ok(format!(
        "connected to server {}, its last call home was {}",
        health.server_uid, health.last_call_home
    ))]
}
