//! Task workflow management.
//!
//! Tasks follow a fixed, linear workflow chosen by their type. Each step may
//! demand evidence in the form of custom fields, forward moves advance one
//! step at a time, and a task can only be closed once it reaches the last
//! step. The module follows hexagonal architecture:
//!
//! - Domain types and the workflow rule table in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
