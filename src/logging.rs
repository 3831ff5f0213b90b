//! Tracing setup.
//!
//! Logs go to stderr. `RUST_LOG` wins over everything; otherwise the
//! configured filter, then the verbosity flags pick the level.

use crate::error::{Result, TrackerError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Initialize human-readable logging.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed or the
/// filter directive is invalid.
pub fn init_logging(verbose: u8, quiet: bool, filter_override: Option<&str>) -> Result<()> {
    let filter = build_filter(verbose, quiet, filter_override)?;
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| TrackerError::Other(anyhow::anyhow!("logging init failed: {e}")))
}

/// Initialize newline-delimited JSON logging.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed or the
/// filter directive is invalid.
pub fn init_json_logging(verbose: u8, quiet: bool, filter_override: Option<&str>) -> Result<()> {
    let filter = build_filter(verbose, quiet, filter_override)?;
    fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_current_span(true)
        .try_init()
        .map_err(|e| TrackerError::Other(anyhow::anyhow!("logging init failed: {e}")))
}

/// Install a test-writer subscriber. Safe to call repeatedly.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("issue_tracker=debug"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Level directive for the verbosity flags.
#[must_use]
pub const fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_filter(verbose: u8, quiet: bool, filter_override: Option<&str>) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = filter_override.unwrap_or_else(|| level_for(verbose, quiet));
    EnvFilter::try_new(directive)
        .map_err(|e| TrackerError::invalid_config("log", directive, e.to_string()))
}
