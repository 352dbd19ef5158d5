//! Tracing subscriber installation.

use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry, util::TryInitError};

/// Filter applied when `RUST_LOG` is unset.
#[must_use]
pub fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("taskflow={level},taskflow_server={level},hyper=warn")
}

/// Installs the global subscriber, writing formatted events to stderr.
///
/// `RUST_LOG` takes precedence over [`default_directives`].
///
/// # Errors
///
/// Returns [`TryInitError`] when a global subscriber is already installed.
pub fn init(verbose: bool) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
    registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
