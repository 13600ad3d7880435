use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nagiosplugin::{Resource, Runner};
use tracing_subscriber::EnvFilter;

use fls_check::checks::{self, usage::UsageReportInput};
use fls_check::config::{CheckConfig, Endpoint, Overrides};
use fls_check::output;
use fls_check::transport::Transport;

/// Service name prefixed to every plugin output line.
const SERVICE: &str = "FLS";

#[derive(Parser)]
#[command(
    name = "fls-check",
    about = "Monitoring plugin for the JetBrains Floating License Server HTTP API",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// License server hostname, e.g. "fls.example.com"
    #[arg(long, env = "FLS_CHECK_HOSTNAME", global = true)]
    hostname: Option<String>,

    /// Explicit endpoint path override for the selected check
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Use https:// when building the target URL
    #[arg(long, env = "FLS_CHECK_HTTPS", global = true)]
    https: bool,

    /// Accept an insecure TLS certificate
    #[arg(long = "insecure-ssl", env = "FLS_CHECK_INSECURE_SSL", global = true)]
    insecure_ssl: bool,

    /// Log request and response bodies to stderr
    #[arg(long, env = "FLS_CHECK_DEBUG", global = true)]
    debug: bool,

    /// Config file path (default probe: ./fls-check.toml, /etc/fls-check/config.toml)
    #[arg(long, env = "FLS_CHECK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level filter, e.g. "warn", "debug", "fls_check=trace"
    #[arg(long, env = "FLS_CHECK_LOG", global = true)]
    log: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the license server completed its call home.
    ///
    /// Queries /health and requires the server identity and last call-home
    /// time; an empty field means the server never reported in.
    ///
    /// Examples:
    ///   fls-check health --hostname fls.example.com
    Health,
    /// Check the server's connection to its upstream services.
    ///
    /// Queries /check-connection and requires the account service and the
    /// public website probe to both report OK.
    ///
    /// Examples:
    ///   fls-check connection --hostname fls.example.com --https
    Connection,
    /// Check whether the server runs the latest released version.
    ///
    /// Queries /check-version. An available update is WARNING by default
    /// and CRITICAL with --critical.
    ///
    /// Examples:
    ///   fls-check version --hostname fls.example.com --critical
    Version {
        /// Report CRITICAL instead of WARNING when an update is available
        #[arg(long)]
        critical: bool,
    },
    /// Check per-license usage for a period against a threshold.
    ///
    /// Queries /reportapi for the date range and warns for every license
    /// type whose peak usage percentage reaches the threshold. Emits
    /// max_usage_* and max_available_* perfdata per license type.
    ///
    /// Examples:
    ///   fls-check report --start 2026-08-01 --end 2026-08-29 --token "$TOKEN"
    ///   fls-check report --duration 7 --threshold 85
    Report {
        /// Period start date (YYYY-MM-DD)
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: Option<String>,

        /// Period end date (YYYY-MM-DD)
        #[arg(long, value_name = "YYYY-MM-DD")]
        end: Option<String>,

        /// Cover the last N days when no explicit dates are given
        #[arg(long, value_name = "DAYS")]
        duration: Option<i64>,

        /// API token for the report endpoint (falls back to the config file)
        #[arg(long, env = "FLS_CHECK_TOKEN")]
        token: Option<String>,

        /// Usage percentage threshold, exclusive bounds (0, 100)
        #[arg(long)]
        threshold: Option<i64>,
    },
}

fn main() {
    let args = Args::parse();
    init_tracing(&args);
    // safe_run turns an unexpected error (config, runtime) into an UNKNOWN
    // plugin result instead of a bare panic or exit 1.
    Runner::new().safe_run(|| run(args)).print_and_exit()
}

fn init_tracing(args: &Args) {
    let filter = match (&args.log, args.debug) {
        (Some(filter), _) => EnvFilter::new(filter),
        (None, true) => EnvFilter::new("debug"),
        // Default to warnings only: stdout carries the plugin output line,
        // stderr should stay quiet unless something is off.
        (None, false) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<Resource, Box<dyn Error>> {
    let (token_flag, threshold_flag) = match &args.command {
        Command::Report {
            token, threshold, ..
        } => (token.clone(), *threshold),
        _ => (None, None),
    };

    let config = CheckConfig::load(Overrides {
        hostname: args.hostname,
        https: args.https,
        insecure_ssl: args.insecure_ssl,
        debug: args.debug,
        token: token_flag,
        threshold: threshold_flag,
        config_path: args.config,
    })?;

    let transport = Transport::new(config.insecure_ssl, config.debug)?;
    let endpoint_flag = args.endpoint.as_deref();

    // One check per invocation, driven sequentially on a single thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let resource = runtime.block_on(async {
        match args.command {
            Command::Health => {
                let url = config.url_for(Endpoint::Health, endpoint_flag);
                let records = checks::health::run(&transport, &url).await;
                output::to_resource(SERVICE, "server health checked", &records, &[])
            }
            Command::Connection => {
                let url = config.url_for(Endpoint::Connection, endpoint_flag);
                let records = checks::connection::run(&transport, &url).await;
                output::to_resource(SERVICE, "server connection checked", &records, &[])
            }
            Command::Version { critical } => {
                let url = config.url_for(Endpoint::Version, endpoint_flag);
                let records = checks::version::run(&transport, &url, critical).await;
                output::to_resource(SERVICE, "server version checked", &records, &[])
            }
            Command::Report {
                start,
                end,
                duration,
                ..
            } => {
                let url = config.url_for(Endpoint::Report, endpoint_flag);
                let (start, end) = resolve_period(start, end, duration);
                let input = UsageReportInput {
                    url: &url,
                    token: &config.token,
                    start_date: &start,
                    end_date: &end,
                    threshold: config.threshold,
                };
                let (records, metrics) = checks::usage::run(&transport, &input).await;
                output::to_resource(SERVICE, "usage report checked", &records, &metrics)
            }
        }
    });

    Ok(resource)
}

/// Resolve the report period: explicit dates win; `--duration N` covers
/// the last N days ending today. Anything unresolved stays empty and is
/// rejected by the check's own validation.
fn resolve_period(
    start: Option<String>,
    end: Option<String>,
    duration: Option<i64>,
) -> (String, String) {
    match (start, end, duration) {
        (None, None, Some(days)) if days > 0 => {
            let today = chrono::Local::now().date_naive();
            let start = today - chrono::Days::new(days as u64);
            (
                start.format("%Y-%m-%d").to_string(),
                today.format("%Y-%m-%d").to_string(),
            )
        }
        (start, end, _) => (start.unwrap_or_default(), end.unwrap_or_default()),
    }
}
