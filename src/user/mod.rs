//! User directory: the people tasks are assigned to.
//!
//! Users are referenced by task assignments and history entries, so a user
//! can only be removed once nothing refers to them.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
