//! Service layer for registering, listing, and removing users.

use crate::error::ErrorCode;
use crate::task::{
    ports::{TaskRepository, TaskRepositoryError},
    services::DEFAULT_STORAGE_TIMEOUT,
};
use crate::user::{
    domain::{EmailAddress, User, UserDomainError, UserId, UserName},
    ports::{UserRepository, UserRepositoryError},
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::info;

/// Demo users seeded on request, as `(name, email)` pairs.
pub const DEMO_USERS: [(&str, &str); 4] = [
    ("Dani Lev", "DaniLev@company.com"),
    ("Adma ben", "Admaben@company.com"),
    ("Avi gal", "avigal@company.com"),
    ("Ban dale", "bandale@company.com"),
];

/// Request payload for registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserRequest {
    name: String,
    email: String,
}

impl RegisterUserRequest {
    /// Creates a request from raw name and email values.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Service-level errors for user management.
#[derive(Debug, Error)]
pub enum UserDirectoryError {
    /// Name or email validation failed.
    #[error(transparent)]
    Domain(#[from] UserDomainError),

    /// No user has the requested identifier.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// User repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),

    /// Task repository lookup failed.
    #[error(transparent)]
    TaskRepository(#[from] TaskRepositoryError),

    /// Storage did not answer within the configured deadline.
    #[error("storage did not respond within {0:?}")]
    StorageTimeout(Duration),
}

impl UserDirectoryError {
    /// Returns the machine-readable failure class.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Domain(err) => err.code(),
            Self::UserNotFound(_) => ErrorCode::NotFound,
            Self::Repository(err) => err.code(),
            Self::TaskRepository(err) => err.code(),
            Self::StorageTimeout(_) => ErrorCode::Unavailable,
        }
    }
}

/// Result type for user directory operations.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// User management service.
///
/// Deletion consults the task repository first so storages without foreign
/// keys still refuse to orphan task assignments or history entries.
pub struct UserDirectoryService<U, R>
where
    U: UserRepository + ?Sized,
    R: TaskRepository + ?Sized,
{
    users: Arc<U>,
    tasks: Arc<R>,
    storage_timeout: Duration,
}

impl<U, R> Clone for UserDirectoryService<U, R>
where
    U: UserRepository + ?Sized,
    R: TaskRepository + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            tasks: Arc::clone(&self.tasks),
            storage_timeout: self.storage_timeout,
        }
    }
}

impl<U, R> UserDirectoryService<U, R>
where
    U: UserRepository + ?Sized,
    R: TaskRepository + ?Sized,
{
    /// Creates a new user directory service.
    #[must_use]
    pub const fn new(users: Arc<U>, tasks: Arc<R>) -> Self {
        Self {
            users,
            tasks,
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }

    /// Replaces the deadline applied to every repository call.
    #[must_use]
    pub fn with_storage_timeout(mut self, storage_timeout: Duration) -> Self {
        self.storage_timeout = storage_timeout;
        self
    }

    /// Registers a new user.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::Domain`] for an invalid name or email and
    /// [`UserRepositoryError::DuplicateEmail`] when the address is taken.
    pub async fn register_user(&self, request: RegisterUserRequest) -> UserDirectoryResult<User> {
        let user = User::new(UserName::new(request.name)?, EmailAddress::new(request.email)?);
        self.bounded(self.users.store(&user)).await?;
        info!(user_id = %user.id(), email = %user.email(), "user registered");
        Ok(user)
    }

    /// Retrieves a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError`] when the lookup fails or times out.
    pub async fn find_user(&self, user_id: UserId) -> UserDirectoryResult<Option<User>> {
        self.bounded(self.users.find_by_id(user_id)).await
    }

    /// Returns every user ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError`] when the lookup fails or times out.
    pub async fn list_users(&self) -> UserDirectoryResult<Vec<User>> {
        self.bounded(self.users.list_all()).await
    }

    /// Deletes a user no task or history entry refers to.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::UserNotFound`] for unknown users and
    /// [`UserRepositoryError::StillReferenced`] while tasks refer to the user.
    pub async fn delete_user(&self, user_id: UserId) -> UserDirectoryResult<()> {
        if self.bounded(self.users.find_by_id(user_id)).await?.is_none() {
            return Err(UserDirectoryError::UserNotFound(user_id));
        }
        if self.bounded(self.tasks.references_user(user_id)).await? {
            return Err(UserRepositoryError::StillReferenced(user_id).into());
        }

        self.bounded(self.users.delete(user_id))
            .await
            .map_err(|err| match err {
                UserDirectoryError::Repository(UserRepositoryError::NotFound(id)) => {
                    UserDirectoryError::UserNotFound(id)
                }
                other => other,
            })?;
        info!(user_id = %user_id, "user deleted");
        Ok(())
    }

    /// Registers every demo user whose email is not yet taken.
    ///
    /// Returns the users created by this call; running it twice creates
    /// nothing the second time.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError`] when a lookup or insert fails.
    pub async fn seed_demo_users(&self) -> UserDirectoryResult<Vec<User>> {
        let mut created = Vec::new();
        for (name, email) in DEMO_USERS {
            let address = EmailAddress::new(email)?;
            if self.bounded(self.users.find_by_email(&address)).await?.is_some() {
                continue;
            }
            let user = User::new(UserName::new(name)?, address);
            self.bounded(self.users.store(&user)).await?;
            created.push(user);
        }
        info!(count = created.len(), "demo users seeded");
        Ok(created)
    }

    async fn bounded<T, E>(
        &self,
        operation: impl Future<Output = Result<T, E>>,
    ) -> UserDirectoryResult<T>
    where
        UserDirectoryError: From<E>,
    {
        match timeout(self.storage_timeout, operation).await {
            Ok(result) => result.map_err(UserDirectoryError::from),
            Err(_elapsed) => Err(UserDirectoryError::StorageTimeout(self.storage_timeout)),
        }
    }
}
