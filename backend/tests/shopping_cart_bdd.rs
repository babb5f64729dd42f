//! Behaviour tests for the shopping cart flow.
//!
//! Scenarios drive the assembled HTTP routes over the in-memory adapters
//! from `test_support::memory`, so the real domain services decide every
//! outcome without PostgreSQL.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use actix_web::http::{Method, header};
use actix_web::middleware::NormalizePath;
use actix_web::{App, test as actix_test, web};
use recipe_backend::Trace;
use recipe_backend::domain::PublicUrls;
use recipe_backend::inbound::http;
use recipe_backend::inbound::http::error::{json_error_handler, path_error_handler};
use recipe_backend::inbound::http::state::HttpState;
use recipe_backend::test_support::images::pixel_data_uri;
use recipe_backend::test_support::memory::{MemoryStore, memory_http_state};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

const PASSWORD: &str = "shopping-list-7";

struct Reply {
    status: u16,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("utf-8 body")
    }
}

struct CartWorld {
    runtime: Runtime,
    local: LocalSet,
    store: Arc<MemoryStore>,
    state: web::Data<HttpState>,
    tokens: RefCell<HashMap<String, String>>,
    recipes: RefCell<HashMap<String, i64>>,
    last: RefCell<Option<Reply>>,
}

impl CartWorld {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = web::Data::new(memory_http_state(
            &store,
            PublicUrls::new("http://testserver"),
        ));
        Self {
            runtime: Runtime::new().expect("tokio runtime"),
            local: LocalSet::new(),
            store,
            state,
            tokens: RefCell::new(HashMap::new()),
            recipes: RefCell::new(HashMap::new()),
            last: RefCell::new(None),
        }
    }

    fn send(&self, method: Method, path: &str, cook: Option<&str>, payload: Option<Value>) -> Reply {
        let token = cook.map(|name| self.token(name));
        let state = self.state.clone();
        let path = path.to_owned();
        self.local.block_on(&self.runtime, async move {
            let app = actix_test::init_service(
                App::new()
                    .app_data(state)
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .app_data(web::PathConfig::default().error_handler(path_error_handler))
                    .wrap(NormalizePath::trim())
                    .wrap(Trace)
                    .service(web::scope("/api").configure(http::configure)),
            )
            .await;
            let mut request = actix_test::TestRequest::default()
                .method(method)
                .uri(&path);
            if let Some(token) = token {
                request = request.insert_header((header::AUTHORIZATION, format!("Token {token}")));
            }
            if let Some(payload) = payload {
                request = request.set_json(payload);
            }
            let response = actix_test::call_service(&app, request.to_request()).await;
            let status = response.status().as_u16();
            let body = actix_test::read_body(response).await.to_vec();
            Reply { status, body }
        })
    }

    fn record(&self, reply: Reply) {
        self.last.replace(Some(reply));
    }

    fn token(&self, cook: &str) -> String {
        self.tokens
            .borrow()
            .get(cook)
            .cloned()
            .unwrap_or_else(|| panic!("{cook} has not signed in"))
    }

    fn recipe_id(&self, name: &str) -> i64 {
        self.recipes
            .borrow()
            .get(name)
            .copied()
            .unwrap_or_else(|| panic!("recipe {name} was not published"))
    }

    fn with_last<R>(&self, check: impl FnOnce(&Reply) -> R) -> R {
        let last = self.last.borrow();
        check(last.as_ref().expect("a request was sent"))
    }
}

#[fixture]
fn world() -> CartWorld {
    CartWorld::new()
}

#[given("a catalog with flour and sugar measured in grams")]
fn a_catalog_with_flour_and_sugar(world: &CartWorld) {
    world
        .store
        .seed_ingredients(&[("Flour", "grams"), ("Sugar", "grams")]);
}

#[given("a signed-in cook named {cook}")]
fn a_signed_in_cook(world: &CartWorld, cook: String) {
    let registered = world.send(
        Method::POST,
        "/api/users/",
        None,
        Some(json!({
            "email": format!("{cook}@example.com"),
            "username": cook,
            "first_name": cook,
            "last_name": "Cook",
            "password": PASSWORD,
        })),
    );
    assert_eq!(registered.status, 201, "{}", registered.text());

    let login = world.send(
        Method::POST,
        "/api/auth/token/login/",
        None,
        Some(json!({ "email": format!("{cook}@example.com"), "password": PASSWORD })),
    );
    assert_eq!(login.status, 200, "{}", login.text());
    let token = login.json()["auth_token"]
        .as_str()
        .expect("auth token")
        .to_owned();
    world.tokens.borrow_mut().insert(cook, token);
}

#[given("{cook} publishes {recipe} with {flour} grams of flour and {sugar} grams of sugar")]
fn cook_publishes_recipe(world: &CartWorld, cook: String, recipe: String, flour: u32, sugar: u32) {
    let created = world.send(
        Method::POST,
        "/api/recipes/",
        Some(&cook),
        Some(json!({
            "name": recipe,
            "text": "Combine and bake.",
            "cooking_time": 25,
            "image": pixel_data_uri(),
            "ingredients": [
                { "id": 1, "amount": flour },
                { "id": 2, "amount": sugar },
            ],
        })),
    );
    assert_eq!(created.status, 201, "{}", created.text());
    let id = created.json()["id"].as_i64().expect("recipe id");
    world.recipes.borrow_mut().insert(recipe, id);
}

#[when("{cook} adds {recipe} to the shopping cart")]
fn cook_adds_recipe_to_cart(world: &CartWorld, cook: String, recipe: String) {
    let id = world.recipe_id(&recipe);
    let reply = world.send(
        Method::POST,
        &format!("/api/recipes/{id}/shopping_cart/"),
        Some(&cook),
        None,
    );
    world.record(reply);
}

#[when("{cook} removes {recipe} from the shopping cart")]
fn cook_removes_recipe_from_cart(world: &CartWorld, cook: String, recipe: String) {
    let id = world.recipe_id(&recipe);
    let reply = world.send(
        Method::DELETE,
        &format!("/api/recipes/{id}/shopping_cart/"),
        Some(&cook),
        None,
    );
    world.record(reply);
}

#[when("{cook} downloads the shopping list")]
fn cook_downloads_the_shopping_list(world: &CartWorld, cook: String) {
    let reply = world.send(
        Method::GET,
        "/api/recipes/download_shopping_cart/",
        Some(&cook),
        None,
    );
    world.record(reply);
}

#[when("{cook} lists recipes in the shopping cart")]
fn cook_lists_recipes_in_cart(world: &CartWorld, cook: String) {
    let reply = world.send(
        Method::GET,
        "/api/recipes/?is_in_shopping_cart=1",
        Some(&cook),
        None,
    );
    world.record(reply);
}

#[when("{cook} deletes {recipe}")]
fn cook_deletes_recipe(world: &CartWorld, cook: String, recipe: String) {
    let id = world.recipe_id(&recipe);
    let reply = world.send(Method::DELETE, &format!("/api/recipes/{id}/"), Some(&cook), None);
    assert_eq!(reply.status, 204, "{}", reply.text());
    world.record(reply);
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &CartWorld, status: u16) {
    world.with_last(|reply| assert_eq!(reply.status, status, "{}", reply.text()));
}

#[then("the shopping list contains the line {line}")]
fn the_shopping_list_contains(world: &CartWorld, line: String) {
    world.with_last(|reply| {
        let text = reply.text();
        assert!(text.starts_with("Shopping list:"), "{text}");
        assert!(text.lines().any(|candidate| candidate == line), "{text}");
    });
}

#[then("the error message is {message}")]
fn the_error_message_is(world: &CartWorld, message: String) {
    world.with_last(|reply| {
        assert_eq!(reply.json()["message"].as_str(), Some(message.as_str()));
    });
}

#[then("the error detail code is {code}")]
fn the_error_detail_code_is(world: &CartWorld, code: String) {
    world.with_last(|reply| {
        assert_eq!(reply.json()["details"]["code"].as_str(), Some(code.as_str()));
    });
}

#[then("the listing holds only {recipe} flagged as in the shopping cart")]
fn the_listing_holds_only(world: &CartWorld, recipe: String) {
    world.with_last(|reply| {
        assert_eq!(reply.status, 200, "{}", reply.text());
        let page = reply.json();
        assert_eq!(page["count"], 1);
        let entry = &page["results"][0];
        assert_eq!(entry["name"].as_str(), Some(recipe.as_str()));
        assert_eq!(entry["is_in_shopping_cart"], true);
        assert_eq!(entry["is_favorited"], false);
    });
}

#[scenario(path = "tests/features/shopping_cart.feature")]
fn shopping_cart_scenarios(world: CartWorld) {
    drop(world);
}
