//! Unit tests for the task workflow.

mod repository_tests;
mod service_tests;
