//! Tracing subscriber setup.

use crate::types::LoggingConfig;
use std::sync::Once;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding per-target log directives.
pub const LOG_ENV_VAR: &str = "VANTAGE_LOG";

static INIT: Once = Once::new();

/// Installs the global `tracing` subscriber.
///
/// Reads `VANTAGE_LOG` (for example `VANTAGE_LOG=vantage_timing=trace`) and
/// falls back to `config.filter` when the variable is unset or invalid.
/// Only the first call has an effect.
pub fn init_tracing(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(&config.filter));

        let installed = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .try_init();
        if installed.is_err() {
            tracing::debug!("a global tracing subscriber was already installed");
        }
    });
}
