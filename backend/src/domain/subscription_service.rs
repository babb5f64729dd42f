//! Subscription service implementing [`SubscriptionsCommand`] and
//! [`SubscriptionsQuery`].

use std::sync::Arc;

use async_trait::async_trait;
use pagination::PageRequest;
use tracing::info;

use super::error_mapping::{
    map_recipe_repository_error, map_subscription_repository_error, map_user_repository_error,
};
use super::ports::{
    Listing, RecipeRepository, SubscriptionRepository, SubscriptionsCommand, SubscriptionsQuery,
    UserRepository,
};
use super::{AuthorProfile, Error, RecipesLimit, User, UserId, UserProfile};

/// Follow/unfollow and followed-author listings.
#[derive(Clone)]
pub struct SubscriptionService {
    users: Arc<dyn UserRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    recipes: Arc<dyn RecipeRepository>,
}

impl SubscriptionService {
    /// Create a service over user, subscription and recipe storage.
    pub fn new(
        users: Arc<dyn UserRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        recipes: Arc<dyn RecipeRepository>,
    ) -> Self {
        Self {
            users,
            subscriptions,
            recipes,
        }
    }

    async fn existing_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find(id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn author_profile(
        &self,
        author: User,
        recipes_limit: RecipesLimit,
    ) -> Result<AuthorProfile, Error> {
        let recipes_count = self
            .recipes
            .count_by_author(&author.id)
            .await
            .map_err(map_recipe_repository_error)?;
        let recipes = self
            .recipes
            .summaries_by_author(&author.id, recipes_limit.get())
            .await
            .map_err(map_recipe_repository_error)?;
        Ok(AuthorProfile {
            profile: UserProfile {
                user: author,
                is_subscribed: true,
            },
            recipes_count,
            recipes,
        })
    }
}

#[async_trait]
impl SubscriptionsCommand for SubscriptionService {
    async fn subscribe(
        &self,
        follower: &UserId,
        author: &UserId,
        recipes_limit: RecipesLimit,
    ) -> Result<AuthorProfile, Error> {
        if follower == author {
            return Err(Error::conflict("cannot subscribe to yourself"));
        }
        let author_user = self.existing_user(author).await?;
        self.subscriptions
            .add(follower, author)
            .await
            .map_err(map_subscription_repository_error)?;
        info!(%follower, %author, "subscribed");
        self.author_profile(author_user, recipes_limit).await
    }

    async fn unsubscribe(&self, follower: &UserId, author: &UserId) -> Result<(), Error> {
        self.existing_user(author).await?;
        let removed = self
            .subscriptions
            .remove(follower, author)
            .await
            .map_err(map_subscription_repository_error)?;
        if !removed {
            return Err(Error::not_found("not subscribed to this user"));
        }
        info!(%follower, %author, "unsubscribed");
        Ok(())
    }
}

#[async_trait]
impl SubscriptionsQuery for SubscriptionService {
    async fn subscriptions(
        &self,
        follower: &UserId,
        page: PageRequest,
        recipes_limit: RecipesLimit,
    ) -> Result<Listing<AuthorProfile>, Error> {
        let authors = self
            .subscriptions
            .authors(follower, page)
            .await
            .map_err(map_subscription_repository_error)?;
        let mut items = Vec::with_capacity(authors.items.len());
        for author in authors.items {
            items.push(self.author_profile(author, recipes_limit).await?);
        }
        Ok(Listing::new(items, authors.total))
    }
}
