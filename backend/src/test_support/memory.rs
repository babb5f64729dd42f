//! In-memory implementations of the outbound ports.
//!
//! [`MemoryStore`] keeps every table in one mutex so relation checks see a
//! consistent snapshot. [`memory_http_state`] wires the real domain services
//! over it, letting behaviour tests drive the HTTP surface without
//! PostgreSQL or a media directory.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use pagination::PageRequest;

use crate::domain::ports::{
    AuthTokenRepository, AuthTokenRepositoryError, IngredientRepository,
    IngredientRepositoryError, Listing, MediaStorage, MediaStorageError, NewRecipeRecord,
    NewUserRecord, RecipeFlags, RecipeRelationRepository, RecipeRelationRepositoryError,
    RecipeRepository, RecipeRepositoryError, RecipeUpdateRecord, StoredCredentials,
    SubscriptionRepository, SubscriptionRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    AuthToken, EmailAddress, ImageUpload, Ingredient, IngredientId, IngredientImportOutcome,
    IngredientLine, IngredientService, IngredientTotal,
    NewIngredient, PublicUrls, Recipe, RecipeFilter, RecipeId, RecipeIngredient,
    RecipeRelationService, RecipeService, RecipeServicePorts, RecipeSummary, RelationKind,
    SubscriptionService, TokenLoginService, User, UserId, UserService,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::security::Pbkdf2PasswordHasher;

#[derive(Default)]
struct Tables {
    users: Vec<(User, String)>,
    tokens: Vec<(UserId, AuthToken)>,
    ingredients: Vec<Ingredient>,
    recipes: Vec<Recipe>,
    next_recipe_id: i64,
    favorites: Vec<(UserId, RecipeId)>,
    cart: Vec<(UserId, RecipeId)>,
    subscriptions: Vec<(UserId, UserId)>,
    media: Vec<String>,
}

impl Tables {
    fn relation(&mut self, kind: RelationKind) -> &mut Vec<(UserId, RecipeId)> {
        match kind {
            RelationKind::Favorite => &mut self.favorites,
            RelationKind::ShoppingCart => &mut self.cart,
        }
    }

    fn user(&self, id: &UserId) -> Option<&User> {
        self.users
            .iter()
            .map(|(user, _)| user)
            .find(|user| user.id == *id)
    }

    fn user_mut(&mut self, id: &UserId) -> Option<&mut (User, String)> {
        self.users.iter_mut().find(|(user, _)| user.id == *id)
    }

    fn resolve_lines(
        &self,
        lines: &[IngredientLine],
    ) -> Result<Vec<RecipeIngredient>, RecipeRepositoryError> {
        let mut resolved = lines
            .iter()
            .map(|line| {
                self.ingredients
                    .iter()
                    .find(|ingredient| ingredient.id == line.ingredient_id)
                    .map(|ingredient| RecipeIngredient {
                        ingredient: ingredient.clone(),
                        amount: line.amount,
                    })
                    .ok_or_else(|| {
                        RecipeRepositoryError::unknown_ingredient(format!(
                            "ingredient {} does not exist",
                            line.ingredient_id
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        resolved.sort_by(|left, right| left.ingredient.name.cmp(&right.ingredient.name));
        Ok(resolved)
    }

    fn matches(&self, recipe: &Recipe, filter: &RecipeFilter) -> bool {
        if filter
            .author
            .as_ref()
            .is_some_and(|author| recipe.author != *author)
        {
            return false;
        }
        let Some(viewer) = filter.viewer.as_ref() else {
            return true;
        };
        let pair = (viewer.clone(), recipe.id);
        let flag_ok = |wanted: Option<bool>, rows: &[(UserId, RecipeId)]| {
            wanted.is_none_or(|wanted| rows.contains(&pair) == wanted)
        };
        flag_ok(filter.is_favorited, &self.favorites) && flag_ok(filter.is_in_shopping_cart, &self.cart)
    }
}

fn window<T>(items: Vec<T>, page: PageRequest) -> Listing<T> {
    let total = items.len() as u64;
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    Listing::new(items.into_iter().skip(offset).take(limit).collect(), total)
}

/// Every outbound port backed by in-process tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add catalog entries with sequential keys starting at 1.
    pub fn seed_ingredients(&self, entries: &[(&str, &str)]) -> Vec<Ingredient> {
        let mut tables = self.tables();
        let seeded: Vec<Ingredient> = entries
            .iter()
            .map(|(name, unit)| {
                let next = i64::try_from(tables.ingredients.len()).unwrap_or(i64::MAX);
                let ingredient = Ingredient {
                    id: IngredientId::new(next + 1),
                    name: (*name).to_owned(),
                    measurement_unit: (*unit).to_owned(),
                };
                tables.ingredients.push(ingredient.clone());
                ingredient
            })
            .collect();
        seeded
    }

    /// Number of stored recipes.
    pub fn recipe_count(&self) -> usize {
        self.tables().recipes.len()
    }

    /// Number of rows for `kind` across all users.
    pub fn relation_count(&self, kind: RelationKind) -> usize {
        self.tables().relation(kind).len()
    }

    /// Paths written to media storage and not yet deleted.
    pub fn media_paths(&self) -> Vec<String> {
        self.tables().media.clone()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, record: &NewUserRecord) -> Result<User, UserRepositoryError> {
        let mut tables = self.tables();
        if tables.users.iter().any(|(user, _)| user.email == record.email) {
            return Err(UserRepositoryError::duplicate("email"));
        }
        if tables
            .users
            .iter()
            .any(|(user, _)| user.username == record.username)
        {
            return Err(UserRepositoryError::duplicate("username"));
        }
        let user = User {
            id: record.id.clone(),
            username: record.username.clone(),
            email: record.email.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            avatar: None,
        };
        tables
            .users
            .push((user.clone(), record.password_hash.clone()));
        Ok(user)
    }

    async fn find(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.tables().user(id).cloned())
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError> {
        let tables = self.tables();
        Ok(ids.iter().filter_map(|id| tables.user(id).cloned()).collect())
    }

    async fn list(&self, page: PageRequest) -> Result<Listing<User>, UserRepositoryError> {
        let mut users: Vec<User> = self
            .tables()
            .users
            .iter()
            .map(|(user, _)| user.clone())
            .collect();
        users.sort_by(|left, right| left.username.as_ref().cmp(right.username.as_ref()));
        Ok(window(users, page))
    }

    async fn credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|(user, _)| user.email == *email)
            .map(|(user, hash)| StoredCredentials {
                user_id: user.id.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn credentials_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|(user, _)| user.id == *id)
            .map(|(user, hash)| StoredCredentials {
                user_id: user.id.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserRepositoryError> {
        if let Some((_, hash)) = self.tables().user_mut(id) {
            password_hash.clone_into(hash);
        }
        Ok(())
    }

    async fn set_avatar(
        &self,
        id: &UserId,
        avatar: Option<String>,
    ) -> Result<(), UserRepositoryError> {
        if let Some((user, _)) = self.tables().user_mut(id) {
            user.avatar = avatar;
        }
        Ok(())
    }
}

#[async_trait]
impl AuthTokenRepository for MemoryStore {
    async fn issue(
        &self,
        user: &UserId,
        candidate: &AuthToken,
    ) -> Result<AuthToken, AuthTokenRepositoryError> {
        let mut tables = self.tables();
        if let Some((_, existing)) = tables.tokens.iter().find(|(owner, _)| owner == user) {
            return Ok(existing.clone());
        }
        tables.tokens.push((user.clone(), candidate.clone()));
        Ok(candidate.clone())
    }

    async fn find_user(
        &self,
        token: &AuthToken,
    ) -> Result<Option<UserId>, AuthTokenRepositoryError> {
        Ok(self
            .tables()
            .tokens
            .iter()
            .find(|(_, stored)| stored == token)
            .map(|(owner, _)| owner.clone()))
    }

    async fn revoke(&self, user: &UserId) -> Result<(), AuthTokenRepositoryError> {
        self.tables().tokens.retain(|(owner, _)| owner != user);
        Ok(())
    }
}

#[async_trait]
impl IngredientRepository for MemoryStore {
    async fn search(&self, name_prefix: &str) -> Result<Vec<Ingredient>, IngredientRepositoryError> {
        let prefix = name_prefix.to_lowercase();
        let mut found: Vec<Ingredient> = self
            .tables()
            .ingredients
            .iter()
            .filter(|ingredient| ingredient.name.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        found.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(found)
    }

    async fn find(&self, id: IngredientId) -> Result<Option<Ingredient>, IngredientRepositoryError> {
        Ok(self
            .tables()
            .ingredients
            .iter()
            .find(|ingredient| ingredient.id == id)
            .cloned())
    }

    async fn find_many(
        &self,
        ids: &[IngredientId],
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError> {
        Ok(self
            .tables()
            .ingredients
            .iter()
            .filter(|ingredient| ids.contains(&ingredient.id))
            .cloned()
            .collect())
    }

    async fn import(
        &self,
        ingredients: &[NewIngredient],
    ) -> Result<IngredientImportOutcome, IngredientRepositoryError> {
        let mut outcome = IngredientImportOutcome::default();
        for entry in ingredients {
            let present = self.tables().ingredients.iter().any(|existing| {
                existing.name == entry.name() && existing.measurement_unit == entry.measurement_unit()
            });
            if present {
                outcome.skipped += 1;
            } else {
                self.seed_ingredients(&[(entry.name(), entry.measurement_unit())]);
                outcome.inserted += 1;
            }
        }
        Ok(outcome)
    }
}

#[async_trait]
impl RecipeRepository for MemoryStore {
    async fn create(&self, record: &NewRecipeRecord) -> Result<Recipe, RecipeRepositoryError> {
        let mut tables = self.tables();
        let ingredients = tables.resolve_lines(&record.ingredients)?;
        tables.next_recipe_id += 1;
        let recipe = Recipe {
            id: RecipeId::new(tables.next_recipe_id),
            author: record.author.clone(),
            name: record.name.clone(),
            text: record.text.clone(),
            image: record.image.clone(),
            cooking_time: record.cooking_time,
            ingredients,
            created_at: record.created_at,
        };
        tables.recipes.push(recipe.clone());
        Ok(recipe)
    }

    async fn update(
        &self,
        id: RecipeId,
        changes: &RecipeUpdateRecord,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut tables = self.tables();
        let ingredients = tables.resolve_lines(&changes.ingredients)?;
        let Some(recipe) = tables.recipes.iter_mut().find(|recipe| recipe.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            name.clone_into(&mut recipe.name);
        }
        if let Some(text) = &changes.text {
            text.clone_into(&mut recipe.text);
        }
        if let Some(image) = &changes.image {
            image.clone_into(&mut recipe.image);
        }
        if let Some(cooking_time) = changes.cooking_time {
            recipe.cooking_time = cooking_time;
        }
        recipe.ingredients = ingredients;
        Ok(Some(recipe.clone()))
    }

    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut tables = self.tables();
        let before = tables.recipes.len();
        tables.recipes.retain(|recipe| recipe.id != id);
        tables.favorites.retain(|(_, recipe)| *recipe != id);
        tables.cart.retain(|(_, recipe)| *recipe != id);
        Ok(tables.recipes.len() != before)
    }

    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        Ok(self
            .tables()
            .recipes
            .iter()
            .find(|recipe| recipe.id == id)
            .cloned())
    }

    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Listing<Recipe>, RecipeRepositoryError> {
        let tables = self.tables();
        let mut recipes: Vec<Recipe> = tables
            .recipes
            .iter()
            .filter(|recipe| tables.matches(recipe, filter))
            .cloned()
            .collect();
        recipes.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then(right.id.cmp(&left.id))
        });
        Ok(window(recipes, page))
    }

    async fn summaries_by_author(
        &self,
        author: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<RecipeSummary>, RecipeRepositoryError> {
        let tables = self.tables();
        let mut recipes: Vec<&Recipe> = tables
            .recipes
            .iter()
            .filter(|recipe| recipe.author == *author)
            .collect();
        recipes.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then(right.id.cmp(&left.id))
        });
        Ok(recipes
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(Recipe::summary)
            .collect())
    }

    async fn count_by_author(&self, author: &UserId) -> Result<u64, RecipeRepositoryError> {
        Ok(self
            .tables()
            .recipes
            .iter()
            .filter(|recipe| recipe.author == *author)
            .count() as u64)
    }
}

#[async_trait]
impl RecipeRelationRepository for MemoryStore {
    async fn add(
        &self,
        kind: RelationKind,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<(), RecipeRelationRepositoryError> {
        let mut tables = self.tables();
        if !tables.recipes.iter().any(|stored| stored.id == recipe) {
            return Err(RecipeRelationRepositoryError::missing_recipe(recipe.to_string()));
        }
        let pair = (user.clone(), recipe);
        let rows = tables.relation(kind);
        if rows.contains(&pair) {
            return Err(RecipeRelationRepositoryError::duplicate(format!("{kind} {recipe}")));
        }
        rows.push(pair);
        Ok(())
    }

    async fn remove(
        &self,
        kind: RelationKind,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeRelationRepositoryError> {
        let mut tables = self.tables();
        let rows = tables.relation(kind);
        let before = rows.len();
        rows.retain(|(owner, stored)| !(owner == user && *stored == recipe));
        Ok(rows.len() != before)
    }

    async fn flags(
        &self,
        user: &UserId,
        recipes: &[RecipeId],
    ) -> Result<Vec<RecipeFlags>, RecipeRelationRepositoryError> {
        let tables = self.tables();
        Ok(recipes
            .iter()
            .map(|recipe_id| {
                let pair = (user.clone(), *recipe_id);
                RecipeFlags {
                    recipe_id: *recipe_id,
                    is_favorited: tables.favorites.contains(&pair),
                    is_in_shopping_cart: tables.cart.contains(&pair),
                }
            })
            .collect())
    }

    async fn cart_size(&self, user: &UserId) -> Result<u64, RecipeRelationRepositoryError> {
        Ok(self
            .tables()
            .cart
            .iter()
            .filter(|(owner, _)| owner == user)
            .count() as u64)
    }

    async fn cart_totals(
        &self,
        user: &UserId,
    ) -> Result<Vec<IngredientTotal>, RecipeRelationRepositoryError> {
        let tables = self.tables();
        Ok(tables
            .cart
            .iter()
            .filter(|(owner, _)| owner == user)
            .filter_map(|(_, recipe_id)| tables.recipes.iter().find(|recipe| recipe.id == *recipe_id))
            .flat_map(|recipe| recipe.ingredients.iter())
            .map(|line| IngredientTotal {
                name: line.ingredient.name.clone(),
                measurement_unit: line.ingredient.measurement_unit.clone(),
                amount: u64::from(line.amount),
            })
            .collect())
    }
}

#[async_trait]
impl SubscriptionRepository for MemoryStore {
    async fn add(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<(), SubscriptionRepositoryError> {
        if follower == author {
            return Err(SubscriptionRepositoryError::self_subscription(follower.to_string()));
        }
        let mut tables = self.tables();
        let pair = (follower.clone(), author.clone());
        if tables.subscriptions.contains(&pair) {
            return Err(SubscriptionRepositoryError::duplicate(author.to_string()));
        }
        tables.subscriptions.push(pair);
        Ok(())
    }

    async fn remove(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, SubscriptionRepositoryError> {
        let mut tables = self.tables();
        let before = tables.subscriptions.len();
        tables
            .subscriptions
            .retain(|(who, whom)| !(who == follower && whom == author));
        Ok(tables.subscriptions.len() != before)
    }

    async fn authors(
        &self,
        follower: &UserId,
        page: PageRequest,
    ) -> Result<Listing<User>, SubscriptionRepositoryError> {
        let tables = self.tables();
        let mut authors: Vec<User> = tables
            .subscriptions
            .iter()
            .filter(|(who, _)| who == follower)
            .filter_map(|(_, whom)| tables.user(whom).cloned())
            .collect();
        authors.sort_by(|left, right| left.username.as_ref().cmp(right.username.as_ref()));
        Ok(window(authors, page))
    }

    async fn followed_among(
        &self,
        follower: &UserId,
        candidates: &[UserId],
    ) -> Result<Vec<UserId>, SubscriptionRepositoryError> {
        let tables = self.tables();
        Ok(candidates
            .iter()
            .filter(|candidate| {
                tables
                    .subscriptions
                    .contains(&(follower.clone(), (*candidate).clone()))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MediaStorage for MemoryStore {
    async fn save(&self, folder: &str, image: &ImageUpload) -> Result<String, MediaStorageError> {
        let mut tables = self.tables();
        let path = format!("{folder}/{}.{}", tables.media.len() + 1, image.extension());
        tables.media.push(path.clone());
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<(), MediaStorageError> {
        self.tables().media.retain(|stored| stored != path);
        Ok(())
    }
}

/// Clock ticking one second per reading so creation order is observable.
#[derive(Default)]
pub struct SteppingClock {
    ticks: Mutex<i64>,
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut ticks = self.ticks.lock().unwrap_or_else(PoisonError::into_inner);
        *ticks += 1;
        Utc.timestamp_opt(1_767_225_600 + *ticks, 0)
            .single()
            .unwrap_or_default()
    }
}

/// Handler state running the domain services over `store`.
pub fn memory_http_state(store: &Arc<MemoryStore>, urls: PublicUrls) -> HttpState {
    let hasher = Arc::new(Pbkdf2PasswordHasher::new(1));
    let login = Arc::new(TokenLoginService::new(
        store.clone(),
        store.clone(),
        hasher.clone(),
    ));
    let users = Arc::new(UserService::new(
        store.clone(),
        store.clone(),
        hasher,
        store.clone(),
    ));
    let subscriptions = Arc::new(SubscriptionService::new(
        store.clone(),
        store.clone(),
        store.clone(),
    ));
    let recipes = Arc::new(RecipeService::new(RecipeServicePorts {
        recipes: store.clone(),
        ingredients: store.clone(),
        relations: store.clone(),
        users: store.clone(),
        subscriptions: store.clone(),
        media: store.clone(),
        clock: Arc::new(SteppingClock::default()),
        urls: urls.clone(),
    }));
    let relations = Arc::new(RecipeRelationService::new(store.clone(), store.clone()));
    let ingredients = Arc::new(IngredientService::new(store.clone()));

    HttpState::new(
        HttpStatePorts {
            login,
            users: users.clone(),
            accounts: users,
            subscriptions: subscriptions.clone(),
            subscriptions_query: subscriptions,
            recipes: recipes.clone(),
            recipes_query: recipes,
            relations: relations.clone(),
            shopping_list: relations,
            ingredients,
        },
        urls,
    )
}
