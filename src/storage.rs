//! Storage backend selection and schema bootstrap.

use crate::task::{
    adapters::{memory::InMemoryTaskRepository, postgres::PostgresTaskRepository},
    ports::TaskRepository,
};
use crate::user::{
    adapters::{memory::InMemoryUserRepository, postgres::PostgresUserRepository},
    ports::UserRepository,
};
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use std::sync::Arc;
use thiserror::Error;

/// Schema applied at startup; every statement is idempotent.
pub const SCHEMA_SQL: &str =
    include_str!("../migrations/2025-07-05-000000_create_workflow_tables/up.sql");

/// Connection pool shared by the `PostgreSQL` adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Errors raised while preparing `PostgreSQL` storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The pool could not be built or could not hand out a connection.
    #[error("database connection failed: {0}")]
    Connection(#[from] PoolError),

    /// Applying the schema failed.
    #[error("schema bootstrap failed: {0}")]
    Schema(#[from] diesel::result::Error),
}

/// Repository handles used by the services.
#[derive(Clone)]
pub struct Repositories {
    /// Task storage.
    pub tasks: Arc<dyn TaskRepository>,
    /// User storage.
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Returns process-local repositories that start empty.
    ///
    /// The task repository pins assignees in the user repository, so deleting
    /// a referenced user fails even when it races a task write.
    #[must_use]
    pub fn in_memory() -> Self {
        let users = InMemoryUserRepository::new();
        Self {
            tasks: Arc::new(InMemoryTaskRepository::linked_to(users.clone())),
            users: Arc::new(users),
        }
    }

    /// Returns repositories backed by `pool`.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            tasks: Arc::new(PostgresTaskRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
        }
    }
}

/// Builds a connection pool and applies [`SCHEMA_SQL`].
///
/// This blocks while connecting; call it from a blocking context.
///
/// # Errors
///
/// Returns [`StorageError`] when connecting or applying the schema fails.
pub fn connect_postgres(database_url: &str, pool_size: u32) -> Result<PgPool, StorageError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder().max_size(pool_size).build(manager)?;
    let mut connection = pool.get()?;
    connection.batch_execute(SCHEMA_SQL)?;
    Ok(pool)
}
