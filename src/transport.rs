//! HTTP transport shared by all checks.
//!
//! A thin wrapper around [`reqwest::Client`] carrying the TLS and debug
//! settings for one invocation. The transport is built once and passed
//! explicitly into every check; there is no process-global client.

use std::time::Duration;

use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 10;
/// Response bodies are truncated to this many bytes in debug logs.
const DEBUG_BODY_LIMIT: usize = 1000;

/// Failure to build the client or to complete a request. Checks report
/// request failures as UNKNOWN; DNS, connect, timeout, and TLS errors all
/// land here.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("error during http request: {0}")]
    Request(#[source] reqwest::Error),
}

/// Status line and body of a completed HTTP exchange.
///
/// The body is kept as text: three endpoints return JSON, the connection
/// probe returns a plain-text report. Parsing is the check's concern.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: reqwest::StatusCode,
    pub body: String,
}

impl HttpResponse {
    /// HTTP status line for diagnostics, e.g. `"200 OK"`.
    pub fn status_line(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {}", self.status.as_u16(), reason),
            None => self.status.as_u16().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
    debug: bool,
}

impl Transport {
    /// Build the transport for one invocation.
    ///
    /// `accept_invalid_certs` maps the `--insecure-ssl` flag onto the TLS
    /// layer; `debug` enables request/response body logging.
    pub fn new(accept_invalid_certs: bool, debug: bool) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(TransportError::Build)?;
        Ok(Self { client, debug })
    }

    /// Issue a GET and collect the response body.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.execute(self.client.get(url), url).await
    }

    /// Issue a POST with URL query parameters and collect the response body.
    pub async fn post_query(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        self.execute(self.client.post(url).query(params), url).await
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<HttpResponse, TransportError> {
        if self.debug {
            debug!(%url, "sending request");
        }
        let response = request.send().await.map_err(TransportError::Request)?;
        let status = response.status();
        let body = response.text().await.map_err(TransportError::Request)?;
        if self.debug {
            debug!(%url, status = %status, body = %truncate(&body), "received response");
        }
        Ok(HttpResponse { status, body })
    }
}

/// Truncate on a char boundary so debug logs stay bounded on large bodies.
fn truncate(body: &str) -> &str {
    if body.len() <= DEBUG_BODY_LIMIT {
        return body;
    }
    let mut end = DEBUG_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
