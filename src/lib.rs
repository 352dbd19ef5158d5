//! Taskflow: workflow validation for procurement and development tasks.
//!
//! Every task follows a fixed, linear status workflow chosen by its type.
//! Reaching a status may require evidence recorded as custom fields, forward
//! moves advance one step at a time, and tasks close only from their last
//! status. Each change is appended to the task's history.
//!
//! # Architecture
//!
//! Taskflow follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`task`]: Workflow rule table, transition engine, and task storage
//! - [`user`]: Users tasks are assigned to
//! - [`http`]: JSON API over the services
//! - [`config`], [`storage`], [`telemetry`]: Server wiring

pub mod config;
pub mod error;
pub mod http;
pub mod storage;
pub mod task;
pub mod telemetry;
pub mod user;
