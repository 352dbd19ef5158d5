//! Application services for user management.

mod directory;

pub use directory::{
    DEMO_USERS, RegisterUserRequest, UserDirectoryError, UserDirectoryResult,
    UserDirectoryService,
};
