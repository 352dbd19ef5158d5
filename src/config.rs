//! Command-line and environment configuration for the server binary.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Server configuration, read from flags with environment fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "taskflow-server", version, about = "Task workflow validation service")]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[arg(long, env = "TASKFLOW_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// `PostgreSQL` connection URL; in-memory storage is used when absent.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum number of pooled database connections.
    #[arg(long, env = "TASKFLOW_POOL_SIZE", default_value_t = 8)]
    pub pool_size: u32,

    /// Deadline for each storage call, in milliseconds.
    #[arg(long, env = "TASKFLOW_STORAGE_TIMEOUT_MS", default_value_t = 5000)]
    pub storage_timeout_ms: u64,

    /// Register the demo users on startup when their emails are free.
    #[arg(long)]
    pub seed_demo_users: bool,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Errors raised by [`ServerConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The connection pool must hold at least one connection.
    #[error("pool size must be greater than zero")]
    ZeroPoolSize,

    /// A zero deadline would fail every storage call.
    #[error("storage timeout must be greater than zero")]
    ZeroStorageTimeout,
}

impl ServerConfig {
    /// Checks values clap cannot constrain on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero pool size or storage timeout.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::ZeroPoolSize);
        }
        if self.storage_timeout_ms == 0 {
            return Err(ConfigError::ZeroStorageTimeout);
        }
        Ok(())
    }

    /// Returns the storage deadline as a [`Duration`].
    #[must_use]
    pub const fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServerConfig};
    use clap::Parser;
    use rstest::rstest;
    use std::time::Duration;

    const DATABASE_URL: &str = "postgres://localhost/taskflow";

    #[rstest]
    fn explicit_flags_override_defaults() -> eyre::Result<()> {
        let config = ServerConfig::try_parse_from([
            "taskflow-server",
            "--bind",
            "0.0.0.0:8080",
            "--database-url",
            DATABASE_URL,
            "--pool-size",
            "3",
            "--storage-timeout-ms",
            "250",
            "--seed-demo-users",
            "-v",
        ])?;

        eyre::ensure!(config.bind.port() == 8080);
        eyre::ensure!(config.database_url.as_deref() == Some(DATABASE_URL));
        eyre::ensure!(config.pool_size == 3);
        eyre::ensure!(config.storage_timeout() == Duration::from_millis(250));
        eyre::ensure!(config.seed_demo_users);
        eyre::ensure!(config.verbose);
        eyre::ensure!(config.validate().is_ok());
        Ok(())
    }

    #[rstest]
    #[case(&["--pool-size", "0"], ConfigError::ZeroPoolSize)]
    #[case(&["--storage-timeout-ms", "0"], ConfigError::ZeroStorageTimeout)]
    fn zero_limits_fail_validation(
        #[case] flags: &[&str],
        #[case] expected: ConfigError,
    ) -> eyre::Result<()> {
        let args = std::iter::once("taskflow-server").chain(flags.iter().copied());
        let config = ServerConfig::try_parse_from(args)?;
        eyre::ensure!(config.validate() == Err(expected));
        Ok(())
    }

    #[rstest]
    fn malformed_bind_address_is_rejected() {
        let result = ServerConfig::try_parse_from(["taskflow-server", "--bind", "not-an-address"]);
        assert!(result.is_err());
    }
}
