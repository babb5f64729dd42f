//! User, avatar and subscription handlers.
//!
//! ```text
//! GET    /api/users/
//! POST   /api/users/ {"email":"ada@example.com","username":"ada",...}
//! GET    /api/users/me/
//! POST   /api/users/set_password/
//! PUT    /api/users/me/avatar/ {"avatar":"data:image/png;base64,..."}
//! GET    /api/users/subscriptions/?recipes_limit=3
//! GET    /api/users/{id}/
//! POST   /api/users/{id}/subscribe/
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use pagination::{PageLimits, PageQuery, PageRequest};

use crate::domain::{ImageUpload, PasswordChange, RecipesLimit, UserRegistration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::pages::page_response;
use crate::inbound::http::schemas::{AuthorPageSchema, ErrorSchema, UserPageSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users_dto::{
    AuthorResponse, AvatarRequest, AvatarResponse, RecipesLimitQuery, RegisterRequest,
    RegisteredUserResponse, SetPasswordRequest, UserResponse,
};
use crate::inbound::http::validation::{
    FieldName, image_validation_error, parse_user_id, require_field,
};

/// List users.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use recipe_backend::inbound::http::users::list_users;
///
/// let app = App::new().service(list_users);
/// ```
#[utoipa::path(
    get,
    path = "/api/users/",
    params(("limit" = Option<u32>, Query), ("offset" = Option<u64>, Query)),
    responses(
        (status = 200, description = "User page", body = UserPageSchema),
        (status = 401, description = "Unknown token", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security((), ("token" = []))
)]
#[get("/users")]
pub async fn list_users(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    page: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let request = PageRequest::from_query(&page, PageLimits::standard());
    let listing = state
        .users
        .list(session.user_id().cloned(), request)
        .await?;
    let page = page_response(&req, listing, request, |profile| {
        UserResponse::from_profile(profile, &state.urls)
    })?;
    Ok(HttpResponse::Ok().json(page))
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/users/",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisteredUserResponse),
        (status = 400, description = "Invalid registration", body = ErrorSchema),
        (status = 409, description = "Email or username taken", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security(())
)]
#[post("/users")]
pub async fn register_user(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = UserRegistration::try_from(payload.into_inner())?;
    let user = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(RegisteredUserResponse::from(user)))
}

/// Profile of the caller.
#[utoipa::path(
    get,
    path = "/api/users/me/",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let me = session.require_user_id()?;
    let profile = state.users.profile(Some(me.clone()), &me).await?;
    Ok(web::Json(UserResponse::from_profile(profile, &state.urls)))
}

/// Change the caller's password.
#[utoipa::path(
    post,
    path = "/api/users/set_password/",
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid or wrong password", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "setPassword"
)]
#[post("/users/set_password")]
pub async fn set_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    let change = PasswordChange::try_from(payload.into_inner())?;
    state.accounts.change_password(&me, change).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Upload or replace the caller's avatar.
#[utoipa::path(
    put,
    path = "/api/users/me/avatar/",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar stored", body = AvatarResponse),
        (status = 400, description = "Invalid image", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "setAvatar"
)]
#[put("/users/me/avatar")]
pub async fn set_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AvatarRequest>,
) -> ApiResult<web::Json<AvatarResponse>> {
    let me = session.require_user_id()?;
    let field = FieldName::new("avatar");
    let raw = require_field(payload.into_inner().avatar, field)?;
    let image =
        ImageUpload::from_data_uri(&raw).map_err(|err| image_validation_error(field, &err))?;
    let path = state.accounts.set_avatar(&me, image).await?;
    Ok(web::Json(AvatarResponse {
        avatar: state.urls.media(&path),
    }))
}

/// Remove the caller's avatar.
#[utoipa::path(
    delete,
    path = "/api/users/me/avatar/",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 400, description = "No avatar to remove", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "clearAvatar"
)]
#[delete("/users/me/avatar")]
pub async fn clear_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    state.accounts.clear_avatar(&me).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Authors the caller follows, each with a sample of recipes.
#[utoipa::path(
    get,
    path = "/api/users/subscriptions/",
    params(RecipesLimitQuery, ("limit" = Option<u32>, Query), ("offset" = Option<u64>, Query)),
    responses(
        (status = 200, description = "Followed authors", body = AuthorPageSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "listSubscriptions"
)]
#[get("/users/subscriptions")]
pub async fn list_subscriptions(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    limits: web::Query<RecipesLimitQuery>,
    page: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    let recipes_limit = RecipesLimit::parse(limits.recipes_limit.as_deref());
    let request = PageRequest::from_query(&page, PageLimits::capped());
    let listing = state
        .subscriptions_query
        .subscriptions(&me, request, recipes_limit)
        .await?;
    let page = page_response(&req, listing, request, |author| {
        AuthorResponse::from_author(author, &state.urls)
    })?;
    Ok(HttpResponse::Ok().json(page))
}

/// Fetch one user's profile.
#[utoipa::path(
    get,
    path = "/api/users/{id}/",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security((), ("token" = []))
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = parse_user_id(&path)?;
    let profile = state.users.profile(session.user_id().cloned(), &id).await?;
    Ok(web::Json(UserResponse::from_profile(profile, &state.urls)))
}

/// Follow an author.
#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe/",
    params(("id" = String, Path, description = "Author id"), RecipesLimitQuery),
    responses(
        (status = 201, description = "Now following", body = AuthorResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Author not found", body = ErrorSchema),
        (status = 409, description = "Self or duplicate subscription", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "subscribe"
)]
#[post("/users/{id}/subscribe")]
pub async fn subscribe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    limits: web::Query<RecipesLimitQuery>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    let author = parse_user_id(&path)?;
    let recipes_limit = RecipesLimit::parse(limits.recipes_limit.as_deref());
    let profile = state
        .subscriptions
        .subscribe(&me, &author, recipes_limit)
        .await?;
    Ok(HttpResponse::Created().json(AuthorResponse::from_author(profile, &state.urls)))
}

/// Stop following an author.
#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe/",
    params(("id" = String, Path, description = "Author id")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not subscribed", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "unsubscribe"
)]
#[delete("/users/{id}/subscribe")]
pub async fn unsubscribe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    let author = parse_user_id(&path)?;
    state.subscriptions.unsubscribe(&me, &author).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register user routes; static segments precede `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(register_user)
        .service(current_user)
        .service(set_password)
        .service(set_avatar)
        .service(clear_avatar)
        .service(list_subscriptions)
        .service(get_user)
        .service(subscribe)
        .service(unsubscribe);
}
