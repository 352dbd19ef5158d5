//! Domain model for the users tasks are assigned to.

mod error;
mod ids;
mod user;

pub use error::UserDomainError;
pub use ids::{EmailAddress, UserId, UserName};
pub use user::User;
