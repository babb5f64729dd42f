//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{EmailAddress, PersonName, User, UserId, Username};

use super::{Listing, define_port_error};

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError repository "user" {
        /// A unique column already holds the value.
        Duplicate { field: String } => "{field} is already taken",
    }
}

/// Account row to insert; the password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Fresh identifier.
    pub id: UserId,
    /// Public handle.
    pub username: Username,
    /// Login email.
    pub email: EmailAddress,
    /// Given name.
    pub first_name: PersonName,
    /// Family name.
    pub last_name: PersonName,
    /// Encoded password hash.
    pub password_hash: String,
}

/// Stored credentials used to verify a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// Account the credentials belong to.
    pub user_id: UserId,
    /// Encoded password hash.
    pub password_hash: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    async fn create(&self, record: &NewUserRecord) -> Result<User, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch every listed user that exists.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError>;

    /// Page through users ordered by username.
    async fn list(&self, page: PageRequest) -> Result<Listing<User>, UserRepositoryError>;

    /// Look up credentials by login email.
    async fn credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;

    /// Look up credentials by identifier.
    async fn credentials_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;

    /// Replace the stored password hash.
    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserRepositoryError>;

    /// Replace or clear the stored avatar path.
    async fn set_avatar(
        &self,
        id: &UserId,
        avatar: Option<String>,
    ) -> Result<(), UserRepositoryError>;
}
