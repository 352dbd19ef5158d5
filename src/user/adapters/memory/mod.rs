//! In-memory adapters for user management.

mod directory;

pub use directory::InMemoryUserRepository;
