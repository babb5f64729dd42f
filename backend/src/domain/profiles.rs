//! Viewer-relative user profiles shared by the user, recipe and
//! subscription services.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::error_mapping::{map_subscription_repository_error, map_user_repository_error};
use super::ports::{SubscriptionRepository, UserRepository};
use super::{Error, User, UserId, UserProfile};

/// Attaches `is_subscribed` to users for a given viewer.
#[derive(Clone)]
pub(crate) struct ProfileDirectory {
    users: Arc<dyn UserRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl ProfileDirectory {
    pub(crate) fn new(
        users: Arc<dyn UserRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            users,
            subscriptions,
        }
    }

    /// Fetch one profile, failing with not found.
    pub(crate) async fn profile(
        &self,
        viewer: Option<&UserId>,
        id: &UserId,
    ) -> Result<UserProfile, Error> {
        let user = self
            .users
            .find(id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        let mut profiles = self.decorate(viewer, vec![user]).await?;
        profiles
            .pop()
            .ok_or_else(|| Error::internal("profile lookup returned no rows"))
    }

    /// Profiles for the listed ids keyed by id. Unknown ids are skipped.
    pub(crate) async fn profiles_by_id(
        &self,
        viewer: Option<&UserId>,
        ids: &[UserId],
    ) -> Result<HashMap<UserId, UserProfile>, Error> {
        let mut unique: Vec<UserId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(id.clone());
            }
        }
        let users = self
            .users
            .find_many(&unique)
            .await
            .map_err(map_user_repository_error)?;
        Ok(self
            .decorate(viewer, users)
            .await?
            .into_iter()
            .map(|profile| (profile.user.id.clone(), profile))
            .collect())
    }

    /// Attach the subscription flag to already loaded users, keeping order.
    pub(crate) async fn decorate(
        &self,
        viewer: Option<&UserId>,
        users: Vec<User>,
    ) -> Result<Vec<UserProfile>, Error> {
        let followed: HashSet<UserId> = match viewer {
            Some(viewer) if !users.is_empty() => {
                let ids: Vec<UserId> = users.iter().map(|user| user.id.clone()).collect();
                self.subscriptions
                    .followed_among(viewer, &ids)
                    .await
                    .map_err(map_subscription_repository_error)?
                    .into_iter()
                    .collect()
            }
            _ => HashSet::new(),
        };
        Ok(users
            .into_iter()
            .map(|user| {
                let is_subscribed = followed.contains(&user.id);
                UserProfile {
                    user,
                    is_subscribed,
                }
            })
            .collect())
    }
}
