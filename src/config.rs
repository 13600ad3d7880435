//! Layered configuration: CLI/env > TOML file > built-in default.
//!
//! The TOML file is optional. Default probe order: `./fls-check.toml`,
//! then `/etc/fls-check/config.toml`; an explicit `--config` path must be
//! readable. Every resolved value is plain data; checks receive URLs and
//! primitives, never the config itself.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Deserialize;
use tracing::{debug, error};

const DEFAULT_HEALTH_PATH: &str = "/health";
const DEFAULT_CONNECTION_PATH: &str = "/check-connection";
const DEFAULT_VERSION_PATH: &str = "/check-version";
const DEFAULT_REPORT_PATH: &str = "/reportapi";
/// Warn at 90 % license usage unless overridden.
const DEFAULT_THRESHOLD: i64 = 90;

const DEFAULT_CONFIG_PATHS: &[&str] = &["fls-check.toml", "/etc/fls-check/config.toml"];

/// The four server endpoints a check can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    Connection,
    Version,
    Report,
}

impl Endpoint {
    fn default_path(self) -> &'static str {
        match self {
            Endpoint::Health => DEFAULT_HEALTH_PATH,
            Endpoint::Connection => DEFAULT_CONNECTION_PATH,
            Endpoint::Version => DEFAULT_VERSION_PATH,
            Endpoint::Report => DEFAULT_REPORT_PATH,
        }
    }
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// All fields are optional overrides above the built-in defaults.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    /// License server hostname, e.g. `"fls.example.com"`.
    hostname: Option<String>,
    /// Use `https://` when building target URLs.
    https: Option<bool>,
    /// Accept an invalid TLS certificate.
    insecure_ssl: Option<bool>,
    /// Log request and response bodies.
    debug: Option<bool>,
    /// API token for the report endpoint.
    token: Option<String>,
    /// Usage percentage threshold, exclusive bounds (0, 100).
    threshold: Option<i64>,
    /// Per-check path overrides (`[endpoints]`).
    endpoints: Option<TomlEndpoints>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TomlEndpoints {
    health: Option<String>,
    connection: Option<String>,
    version: Option<String>,
    report: Option<String>,
}

impl TomlEndpoints {
    fn path_for(&self, endpoint: Endpoint) -> Option<&str> {
        match endpoint {
            Endpoint::Health => self.health.as_deref(),
            Endpoint::Connection => self.connection.as_deref(),
            Endpoint::Version => self.version.as_deref(),
            Endpoint::Report => self.report.as_deref(),
        }
    }
}

fn load_toml(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        return toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()));
    }

    for candidate in DEFAULT_CONFIG_PATHS {
        let path = Path::new(candidate);
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        match toml::from_str(&contents) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config file");
                return Ok(config);
            }
            Err(e) => {
                error!(path = %path.display(), err = %e, "failed to parse config file, using defaults");
                return Ok(TomlConfig::default());
            }
        }
    }
    Ok(TomlConfig::default())
}

// ─── Resolved configuration ───────────────────────────────────────────────────

/// CLI/env values handed down by the argument parser. `None` (or `false`
/// for flags) falls through to the TOML layer.
#[derive(Debug, Default)]
pub struct Overrides {
    pub hostname: Option<String>,
    pub https: bool,
    pub insecure_ssl: bool,
    pub debug: bool,
    pub token: Option<String>,
    pub threshold: Option<i64>,
    pub config_path: Option<PathBuf>,
}

/// Fully resolved per-invocation settings.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub hostname: String,
    pub https: bool,
    pub insecure_ssl: bool,
    pub debug: bool,
    pub token: String,
    pub threshold: i64,
    endpoints: TomlEndpoints,
}

impl CheckConfig {
    /// Resolve the configuration for one invocation.
    ///
    /// Priority (highest to lowest): CLI / env (the `Overrides`), TOML
    /// file, built-in default.
    pub fn load(overrides: Overrides) -> Result<Self> {
        let toml = load_toml(overrides.config_path.as_deref())?;
        Ok(Self::resolve(overrides, toml))
    }

    fn resolve(overrides: Overrides, toml: TomlConfig) -> Self {
        Self {
            hostname: overrides
                .hostname
                .filter(|h| !h.is_empty())
                .or(toml.hostname)
                .unwrap_or_default(),
            // Flags cannot be unset from the CLI; a set flag wins, an unset
            // one falls through to the file.
            https: overrides.https || toml.https.unwrap_or(false),
            insecure_ssl: overrides.insecure_ssl || toml.insecure_ssl.unwrap_or(false),
            debug: overrides.debug || toml.debug.unwrap_or(false),
            token: overrides
                .token
                .filter(|t| !t.is_empty())
                .or(toml.token)
                .unwrap_or_default(),
            threshold: overrides
                .threshold
                .or(toml.threshold)
                .unwrap_or(DEFAULT_THRESHOLD),
            endpoints: toml.endpoints.unwrap_or_default(),
        }
    }

    /// Build the target URL for a check.
    ///
    /// Path precedence: explicit `--endpoint` flag, `[endpoints]` file
    /// override, built-in default. An unset hostname yields an empty URL,
    /// which the check reports as its empty-URL precondition failure.
    pub fn url_for(&self, endpoint: Endpoint, override_path: Option<&str>) -> String {
        if self.hostname.is_empty() {
            return String::new();
        }
        let path = override_path
            .filter(|p| !p.is_empty())
            .or_else(|| self.endpoints.path_for(endpoint))
            .unwrap_or_else(|| endpoint.default_path());
        let scheme = if self.https { "https" } else { "http" };
        format!("{scheme}://{}{path}", self.hostname)
    }
}
