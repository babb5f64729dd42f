//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::middleware::NormalizePath;
use actix_web::{App, web};

use crate::domain::ports::{
    MockIngredientsQuery, MockLoginService, MockRecipeRelationsCommand, MockRecipesCommand,
    MockRecipesQuery, MockShoppingListQuery, MockSubscriptionsCommand, MockSubscriptionsQuery,
    MockUsersCommand, MockUsersQuery,
};
use crate::domain::{PublicUrls, UserId};
use crate::inbound::http::error::{json_error_handler, path_error_handler};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Site root used for absolute URLs in handler tests.
pub const BASE_URL: &str = "http://testserver";

/// Well-formed token key accepted by [`authenticated_as`].
pub const TEST_TOKEN: &str = "0123456789abcdef0123456789abcdef01234567";

/// `Authorization` header carrying [`TEST_TOKEN`].
pub fn token_header() -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Token {TEST_TOKEN}"))
}

/// Login port resolving [`TEST_TOKEN`] to `user`.
pub fn authenticated_as(user: &UserId) -> MockLoginService {
    let user = user.clone();
    let mut login = MockLoginService::new();
    login
        .expect_authenticate()
        .withf(|token| token.as_str() == TEST_TOKEN)
        .returning(move |_| Ok(user.clone()));
    login
}

/// Mock driving ports; fields left at their default reject every call.
#[derive(Default)]
pub struct TestPorts {
    pub login: MockLoginService,
    pub users: MockUsersQuery,
    pub accounts: MockUsersCommand,
    pub subscriptions: MockSubscriptionsCommand,
    pub subscriptions_query: MockSubscriptionsQuery,
    pub recipes: MockRecipesCommand,
    pub recipes_query: MockRecipesQuery,
    pub relations: MockRecipeRelationsCommand,
    pub shopping_list: MockShoppingListQuery,
    pub ingredients: MockIngredientsQuery,
}

impl TestPorts {
    /// Wrap the mocks in handler state rooted at [`BASE_URL`].
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            HttpStatePorts {
                login: Arc::new(self.login),
                users: Arc::new(self.users),
                accounts: Arc::new(self.accounts),
                subscriptions: Arc::new(self.subscriptions),
                subscriptions_query: Arc::new(self.subscriptions_query),
                recipes: Arc::new(self.recipes),
                recipes_query: Arc::new(self.recipes_query),
                relations: Arc::new(self.relations),
                shopping_list: Arc::new(self.shopping_list),
                ingredients: Arc::new(self.ingredients),
            },
            PublicUrls::new(BASE_URL),
        )
    }

    /// Register the state plus the JSON and path error handlers on `cfg`.
    pub fn configure(self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.into_state()))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler));
    }
}

/// Application mounting `routes` under `/api` over mock ports, with
/// trailing slashes normalised the way the server does.
pub fn api_app(
    ports: TestPorts,
    routes: fn(&mut web::ServiceConfig),
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(NormalizePath::trim())
        .configure(|cfg| ports.configure(cfg))
        .service(web::scope("/api").configure(routes))
}
