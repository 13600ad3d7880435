//! fls-check: monitoring plugin for the JetBrains Floating License Server.
//!
//! One invocation runs exactly one of four checks against the server's HTTP
//! API and terminates in standard monitoring-plugin convention
//! (0=OK, 1=WARNING, 2=CRITICAL, 3=UNKNOWN) with perfdata where applicable:
//!
//! - [`checks::health`]: `GET /health`, server identity and last call home
//! - [`checks::connection`]: `GET /check-connection`, reachability of the
//!   upstream account service and public website
//! - [`checks::version`]: `GET /check-version`, update availability
//! - [`checks::usage`]: `POST /reportapi`, per-license usage vs. threshold
//!
//! Checks never fail with an `Err`. Every outcome (validation problem,
//! transport failure, parse failure, business-rule violation) is returned
//! as data ([`checks::StatusRecord`]) and folded into the final plugin
//! output by [`output`].

pub mod checks;
pub mod config;
pub mod output;
pub mod transport;
