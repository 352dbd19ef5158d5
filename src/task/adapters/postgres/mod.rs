//! `PostgreSQL` adapters for task workflow persistence.

mod conversions;
mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskRepository, TaskPgPool};
