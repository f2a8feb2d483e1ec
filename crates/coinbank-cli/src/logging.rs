//! Tracing setup for the coinbank CLI.
//!
//! Usage:
//!   coinbank --debug ...              # Debug logging to stderr
//!   RUST_LOG=coinbank_core=debug ...  # Fine-grained log control

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install a compact stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--debug` selects `debug` and the
/// default is `warn`, so failed lookups and updates are still reported.
pub fn init_tracing(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
