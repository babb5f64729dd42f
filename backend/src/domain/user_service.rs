//! Account service implementing [`UsersCommand`] and [`UsersQuery`].

use std::sync::Arc;

use async_trait::async_trait;
use pagination::PageRequest;
use tracing::{info, warn};

use super::error_mapping::{
    field_error, map_hasher_error, map_media_error, map_user_repository_error,
};
use super::ports::{
    Listing, MediaStorage, NewUserRecord, PasswordHasher, SubscriptionRepository, UserRepository,
    UsersCommand, UsersQuery,
};
use super::profiles::ProfileDirectory;
use super::{
    Error, ImageUpload, PasswordChange, User, UserId, UserProfile, UserRegistration,
};

/// Media folder for avatars.
pub const AVATAR_MEDIA_FOLDER: &str = "users";

/// Registration, password, avatar and profile operations.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    profiles: ProfileDirectory,
    hasher: Arc<dyn PasswordHasher>,
    media: Arc<dyn MediaStorage>,
}

impl UserService {
    /// Create a service from its collaborators.
    pub fn new(
        users: Arc<dyn UserRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        hasher: Arc<dyn PasswordHasher>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self {
            profiles: ProfileDirectory::new(users.clone(), subscriptions),
            users,
            hasher,
            media,
        }
    }

    async fn existing_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find(id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn discard_avatar(&self, path: &str) {
        if let Err(error) = self.media.delete(path).await {
            warn!(%path, %error, "failed to discard avatar");
        }
    }
}

#[async_trait]
impl UsersCommand for UserService {
    async fn register(&self, registration: UserRegistration) -> Result<User, Error> {
        let password_hash = self
            .hasher
            .hash(&registration.password)
            .map_err(map_hasher_error)?;
        let record = NewUserRecord {
            id: UserId::random(),
            username: registration.username,
            email: registration.email,
            first_name: registration.first_name,
            last_name: registration.last_name,
            password_hash,
        };
        let user = self
            .users
            .create(&record)
            .await
            .map_err(map_user_repository_error)?;
        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    async fn change_password(&self, user: &UserId, change: PasswordChange) -> Result<(), Error> {
        let stored = self
            .users
            .credentials_by_id(user)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))?;
        if !self.hasher.verify(change.current(), &stored.password_hash) {
            return Err(field_error(
                "current_password",
                "incorrect_password",
                "current password is incorrect",
            ));
        }
        let password_hash = self
            .hasher
            .hash(change.new_password())
            .map_err(map_hasher_error)?;
        self.users
            .update_password(user, &password_hash)
            .await
            .map_err(map_user_repository_error)?;
        info!(user_id = %user, "password changed");
        Ok(())
    }

    async fn set_avatar(&self, user: &UserId, image: ImageUpload) -> Result<String, Error> {
        let existing = self.existing_user(user).await?;
        let path = self
            .media
            .save(AVATAR_MEDIA_FOLDER, &image)
            .await
            .map_err(map_media_error)?;
        if let Err(error) = self.users.set_avatar(user, Some(path.clone())).await {
            self.discard_avatar(&path).await;
            return Err(map_user_repository_error(error));
        }
        if let Some(previous) = existing.avatar.as_deref() {
            self.discard_avatar(previous).await;
        }
        Ok(path)
    }

    async fn clear_avatar(&self, user: &UserId) -> Result<(), Error> {
        let existing = self.existing_user(user).await?;
        let Some(previous) = existing.avatar else {
            return Err(field_error("avatar", "no_avatar", "no avatar to delete"));
        };
        self.users
            .set_avatar(user, None)
            .await
            .map_err(map_user_repository_error)?;
        self.discard_avatar(&previous).await;
        Ok(())
    }
}

#[async_trait]
impl UsersQuery for UserService {
    async fn list(
        &self,
        viewer: Option<UserId>,
        page: PageRequest,
    ) -> Result<Listing<UserProfile>, Error> {
        let listing = self
            .users
            .list(page)
            .await
            .map_err(map_user_repository_error)?;
        let items = self.profiles.decorate(viewer.as_ref(), listing.items).await?;
        Ok(Listing::new(items, listing.total))
    }

    async fn profile(&self, viewer: Option<UserId>, id: &UserId) -> Result<UserProfile, Error> {
        self.profiles.profile(viewer.as_ref(), id).await
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
