//! Connection check: `GET /check-connection`.
//!
//! The server answers with a plain-text report, one probe per line in the
//! form `<probe-url>\t<status>`. The check requires both the account
//! service and the public website probe to report `OK`; anything else
//! means the running server cannot reach its upstream services.

use std::collections::HashMap;

use crate::checks::StatusRecord;
use crate::transport::Transport;

const ACCOUNT_PROBE: &str = "https://account.jetbrains.com";
const WEBSITE_PROBE: &str = "https://www.jetbrains.com";

/// Parse the probe report into a probe-name → status map.
///
/// Lines without a tab separator are ignored; the probe format carries no
/// other structure.
fn probe_statuses(body: &str) -> HashMap<&str, &str> {
    body.lines()
        .filter_map(|line| line.split_once('\t'))
        .map(|(probe, status)| (probe.trim(), status.trim()))
        .collect()
}

/// Run the connection check. Always returns exactly one record.
pub async fn run(transport: &Transport, url: &str) -> Vec<StatusRecord> {
    if url.is_empty() {
        return vec![StatusRecord::warning(
            "the connection check URL must not be empty",
        )];
    }

    let response = match transport.get(url).await {
        Ok(response) => response,
        Err(e) => return vec![StatusRecord::unknown(e.to_string())],
    };

    let probes = probe_statuses(&response.body);
    let account_ok = probes.get(ACCOUNT_PROBE) == Some(&"OK");
    let website_ok = probes.get(WEBSITE_PROBE) == Some(&"OK");

    if !account_ok || !website_ok {
        return vec![StatusRecord::warning(format!(
            "no connection to upstream services (account service: {}, website: {})",
            probe_verdict(account_ok),
            probe_verdict(website_ok)
        ))];
    }

    vec![StatusRecord::ok(
        "connection to the account service and the public website is OK",
    )]
}

fn probe_verdict(ok: bool) -> &'static str {
    if ok {
        "OK"
    } else {
        "FAILED"
    }
}
