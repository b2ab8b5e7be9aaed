//! Tracing subscriber setup.
//!
//! Log output goes to stderr; stdout is reserved for decoded rows.

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (e.g. `"info"`) applies.
pub fn init(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| Error::config(format!("invalid log filter: {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::config(format!("logging already initialized: {e}")))
}
