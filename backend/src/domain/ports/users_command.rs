//! Driving port for account mutations.

use async_trait::async_trait;

use crate::domain::{Error, ImageUpload, PasswordChange, User, UserId, UserRegistration};

/// Domain use-case port for account management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Register a new account.
    async fn register(&self, registration: UserRegistration) -> Result<User, Error>;

    /// Change the caller's password after verifying the current one.
    async fn change_password(&self, user: &UserId, change: PasswordChange) -> Result<(), Error>;

    /// Store a new avatar and return its media path.
    async fn set_avatar(&self, user: &UserId, image: ImageUpload) -> Result<String, Error>;

    /// Remove the avatar. Fails when none is set.
    async fn clear_avatar(&self, user: &UserId) -> Result<(), Error>;
}
