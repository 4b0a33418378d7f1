//! Log subscriber setup
//!
//! Library diagnostics go to stderr through `tracing-subscriber`. The level
//! follows `-q`/`-v` unless `RUST_LOG` is set.

use crate::config::{CliConfig, LogFormat};
use crate::error::{CliError, CliResult};
use std::io;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Filter for `config`: `RUST_LOG` when set, else the verbosity level
fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_level()))
}

/// Install the global subscriber
pub fn init(config: &CliConfig) -> CliResult<()> {
    let filter = env_filter(config);
    let layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_target(true)
            .with_current_span(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_ansi(config.color.should_color())
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| CliError::config(format!("cannot install logger: {e}")))
}
