use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::error::WalletError;

/// Install a global tracing subscriber for embedders that do not bring
/// their own.
///
/// `RUST_LOG` overrides `level` when set. `json = true` emits one JSON object
/// per event; otherwise human-readable text. Fails if a global subscriber is
/// already installed.
pub fn init_logging(level: &str, json: bool) -> Result<(), WalletError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| WalletError::Config(format!("invalid log level {level:?}: {e}")))?;

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true))
            .try_init()
    };

    result.map_err(|e| WalletError::Config(format!("logging already initialized: {e}")))
}
