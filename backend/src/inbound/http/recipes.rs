//! Recipe HTTP handlers.
//!
//! ```text
//! GET    /api/recipes/
//! POST   /api/recipes/
//! GET    /api/recipes/download_shopping_cart/
//! GET    /api/recipes/{id}/
//! PUT    /api/recipes/{id}/
//! PATCH  /api/recipes/{id}/
//! DELETE /api/recipes/{id}/
//! GET    /api/recipes/{id}/get-link/
//! POST   /api/recipes/{id}/favorite/
//! DELETE /api/recipes/{id}/favorite/
//! POST   /api/recipes/{id}/shopping_cart/
//! DELETE /api/recipes/{id}/shopping_cart/
//! ```

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, delete, get, post, route, web};
use pagination::{PageLimits, PageQuery, PageRequest};

use crate::domain::{
    RecipeDraft, RecipeFilter, RecipeId, RecipeInput, RelationKind,
    SHOPPING_LIST_FILENAME,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::pages::page_response;
use crate::inbound::http::recipes_dto::{
    RecipeListQuery, RecipeRequest, RecipeResponse, RecipeSummaryResponse, ShortLinkResponse,
};
use crate::inbound::http::schemas::{ErrorSchema, RecipePageSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_filter, recipe_validation_error};

fn recipe_filter(query: &RecipeListQuery, session: &SessionContext) -> ApiResult<RecipeFilter> {
    let author = parse_user_filter(query.author.as_deref(), FieldName::new("author"))?;
    Ok(RecipeFilter {
        author,
        is_favorited: RecipeFilter::parse_flag(query.is_favorited.as_deref()),
        is_in_shopping_cart: RecipeFilter::parse_flag(query.is_in_shopping_cart.as_deref()),
        viewer: None,
    }
    .scoped_to(session.user_id().cloned()))
}

/// List recipes, newest first.
#[utoipa::path(
    get,
    path = "/api/recipes/",
    params(RecipeListQuery, ("limit" = Option<u32>, Query), ("offset" = Option<u64>, Query)),
    responses(
        (status = 200, description = "Recipe page", body = RecipePageSchema),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Unknown token", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes",
    security((), ("token" = []))
)]
#[get("/recipes")]
pub async fn list_recipes(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    filter: web::Query<RecipeListQuery>,
    page: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let filter = recipe_filter(&filter, &session)?;
    let request = PageRequest::from_query(&page, PageLimits::standard());
    let listing = state.recipes_query.list(filter, request).await?;
    let page = page_response(&req, listing, request, |view| {
        RecipeResponse::from_view(view, &state.urls)
    })?;
    Ok(HttpResponse::Ok().json(page))
}

/// Create a recipe authored by the caller.
#[utoipa::path(
    post,
    path = "/api/recipes/",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid recipe", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<HttpResponse> {
    let author = session.require_user_id()?;
    let draft = RecipeDraft::try_from_input(RecipeInput::from(payload.into_inner()))
        .map_err(|err| recipe_validation_error(&err))?;
    let view = state.recipes.create(&author, draft).await?;
    Ok(HttpResponse::Created().json(RecipeResponse::from_view(view, &state.urls)))
}

/// Render the caller's shopping cart as a plain-text attachment.
#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart/",
    responses(
        (status = 200, description = "Shopping list", content_type = "text/plain", body = String),
        (status = 400, description = "Shopping cart is empty", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "downloadShoppingCart"
)]
#[get("/recipes/download_shopping_cart")]
pub async fn download_shopping_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    let list = state.shopping_list.shopping_list(&user).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(SHOPPING_LIST_FILENAME.to_owned())],
        })
        .body(list.render()))
}

/// Fetch one recipe.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe", body = RecipeResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe",
    security((), ("token" = []))
)]
#[get("/recipes/{id}")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = RecipeId::new(path.into_inner());
    let view = state
        .recipes_query
        .get(session.user_id().cloned(), id)
        .await?;
    Ok(HttpResponse::Ok().json(RecipeResponse::from_view(view, &state.urls)))
}

/// Update a recipe; only its author may do so.
#[utoipa::path(
    put,
    path = "/api/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid recipe", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[route("/recipes/{id}", method = "PUT", method = "PATCH")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let view = state
        .recipes
        .update(
            &caller,
            RecipeId::new(path.into_inner()),
            RecipeInput::from(payload.into_inner()),
        )
        .await?;
    Ok(HttpResponse::Ok().json(RecipeResponse::from_view(view, &state.urls)))
}

/// Delete a recipe; only its author may do so.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipes/{id}")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    state
        .recipes
        .delete(&caller, RecipeId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Produce a short link for a recipe.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/get-link/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Short link", body = ShortLinkResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "getRecipeLink",
    security((), ("token" = []))
)]
#[get("/recipes/{id}/get-link")]
pub async fn get_link(
    state: web::Data<HttpState>,
    _session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ShortLinkResponse>> {
    let short_link = state
        .recipes_query
        .short_link(RecipeId::new(path.into_inner()))
        .await?;
    Ok(web::Json(ShortLinkResponse { short_link }))
}

async fn add_relation(
    state: &HttpState,
    session: &SessionContext,
    kind: RelationKind,
    id: i64,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    let summary = state.relations.add(kind, &user, RecipeId::new(id)).await?;
    Ok(HttpResponse::Created().json(RecipeSummaryResponse::from_summary(summary, &state.urls)))
}

async fn remove_relation(
    state: &HttpState,
    session: &SessionContext,
    kind: RelationKind,
    id: i64,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    state
        .relations
        .remove(kind, &user, RecipeId::new(id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Add a recipe to the caller's favorites.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Favorited", body = RecipeSummaryResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Recipe not found", body = ErrorSchema),
        (status = 409, description = "Already a favorite", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "addFavorite"
)]
#[post("/recipes/{id}/favorite")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    add_relation(&state, &session, RelationKind::Favorite, path.into_inner()).await
}

/// Remove a recipe from the caller's favorites.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not a favorite", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "removeFavorite"
)]
#[delete("/recipes/{id}/favorite")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    remove_relation(&state, &session, RelationKind::Favorite, path.into_inner()).await
}

/// Put a recipe in the caller's shopping cart.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Added to cart", body = RecipeSummaryResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Recipe not found", body = ErrorSchema),
        (status = 409, description = "Already in the cart", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "addToShoppingCart"
)]
#[post("/recipes/{id}/shopping_cart")]
pub async fn add_to_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    add_relation(&state, &session, RelationKind::ShoppingCart, path.into_inner()).await
}

/// Take a recipe out of the caller's shopping cart.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not in the cart", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "removeFromShoppingCart"
)]
#[delete("/recipes/{id}/shopping_cart")]
pub async fn remove_from_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    remove_relation(&state, &session, RelationKind::ShoppingCart, path.into_inner()).await
}

/// Register recipe routes; the static download path precedes `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(download_shopping_cart)
        .service(list_recipes)
        .service(create_recipe)
        .service(get_recipe)
        .service(update_recipe)
        .service(delete_recipe)
        .service(get_link)
        .service(add_favorite)
        .service(remove_favorite)
        .service(add_to_cart)
        .service(remove_from_cart);
}

#[cfg(test)]
#[path = "recipes_tests.rs"]
mod tests;
