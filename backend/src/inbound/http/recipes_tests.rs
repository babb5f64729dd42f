//! Tests for recipe handlers.

use super::*;
use crate::domain::ports::{Listing, MockRecipeRelationsCommand, MockRecipesCommand};
use crate::domain::test_fixtures::{recipe, user};
use crate::domain::{Error, IngredientTotal, ShoppingList, UserId, UserProfile};
use crate::inbound::http::test_utils::{TestPorts, api_app, authenticated_as, token_header};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

fn view(id: i64) -> crate::domain::RecipeView {
    let author = user("chef");
    crate::domain::RecipeView {
        recipe: recipe(id, &author.id),
        author: UserProfile {
            user: author,
            is_subscribed: false,
        },
        is_favorited: false,
        is_in_shopping_cart: false,
    }
}

fn recipe_body(ingredients: Value) -> Value {
    json!({
        "name": "Pancakes",
        "text": "Mix and fry.",
        "cooking_time": 20,
        "image": PNG,
        "ingredients": ingredients,
    })
}

async fn call(ports: TestPorts, req: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(api_app(ports, configure)).await;
    let res = actix_test::call_service(&app, req.to_request()).await;
    let status = res.status();
    let body = actix_test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, value)
}

#[actix_web::test]
async fn anonymous_listing_ignores_relation_filters() {
    let mut ports = TestPorts::default();
    ports
        .recipes_query
        .expect_list()
        .withf(|filter, page| {
            filter.viewer.is_none()
                && filter.is_favorited.is_none()
                && page.limit() == 6
                && page.offset() == 0
        })
        .times(1)
        .returning(|_, _| Ok(Listing::new(vec![view(1)], 1)));

    let (status, body) = call(
        ports,
        actix_test::TestRequest::get().uri("/api/recipes/?is_favorited=1"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["next"], Value::Null);
    assert_eq!(body["results"][0]["id"], 1);
    assert_eq!(
        body["results"][0]["image"],
        "http://testserver/media/recipes/pancakes.png"
    );
}

#[actix_web::test]
async fn authenticated_listing_scopes_flags_to_the_caller() {
    let caller = UserId::random();
    let expected = caller.clone();
    let mut ports = TestPorts {
        login: authenticated_as(&caller),
        ..TestPorts::default()
    };
    ports
        .recipes_query
        .expect_list()
        .withf(move |filter, page| {
            filter.viewer.as_ref() == Some(&expected)
                && filter.is_in_shopping_cart == Some(true)
                && page.limit() == 2
        })
        .times(1)
        .returning(|_, _| Ok(Listing::new(vec![view(3), view(2)], 5)));

    let (status, body) = call(
        ports,
        actix_test::TestRequest::get()
            .uri("/api/recipes/?is_in_shopping_cart=1&limit=2")
            .insert_header(token_header()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
    let next = body["next"].as_str().expect("next link");
    assert!(next.contains("is_in_shopping_cart=1"), "{next}");
    assert!(next.contains("offset=2"), "{next}");
}

#[actix_web::test]
async fn malformed_author_filters_are_rejected() {
    let (status, body) = call(
        TestPorts::default(),
        actix_test::TestRequest::get().uri("/api/recipes/?author=seven"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "author");
}

#[actix_web::test]
async fn create_requires_a_token() {
    let mut ports = TestPorts::default();
    ports.recipes.expect_create().never();

    let (status, body) = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/recipes/")
            .set_json(recipe_body(json!([{"id": 1, "amount": 10}]))),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[case(json!([]), "empty_ingredients")]
#[case(json!([{"id": 1, "amount": 0}]), "amount_too_small")]
#[case(json!([{"id": 1, "amount": 2}, {"id": 1, "amount": 3}]), "duplicate_ingredient")]
#[actix_web::test]
async fn invalid_ingredient_sets_never_reach_the_service(
    #[case] ingredients: Value,
    #[case] code: &str,
) {
    let caller = UserId::random();
    let mut ports = TestPorts {
        login: authenticated_as(&caller),
        ..TestPorts::default()
    };
    ports.recipes.expect_create().never();

    let (status, body) = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/recipes/")
            .insert_header(token_header())
            .set_json(recipe_body(ingredients)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "ingredients");
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn create_returns_the_stored_recipe() {
    let caller = UserId::random();
    let author = caller.clone();
    let mut ports = TestPorts {
        login: authenticated_as(&caller),
        ..TestPorts::default()
    };
    ports
        .recipes
        .expect_create()
        .withf(move |who, draft| {
            *who == author
                && draft.ingredients.lines().len() == 1
                && draft.cooking_time.get() == 20
        })
        .times(1)
        .returning(|_, _| Ok(view(9)));

    let (status, body) = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/recipes")
            .insert_header(token_header())
            .set_json(recipe_body(json!([{"id": 1, "amount": 200}]))),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 9);
    assert_eq!(body["ingredients"][0]["amount"], 200);
}

#[actix_web::test]
async fn non_authors_cannot_update() {
    let caller = UserId::random();
    let mut ports = TestPorts {
        login: authenticated_as(&caller),
        ..TestPorts::default()
    };
    let mut recipes = MockRecipesCommand::new();
    recipes
        .expect_update()
        .times(1)
        .returning(|_, _, _| Err(Error::forbidden("only the author may change this recipe")));
    ports.recipes = recipes;

    let (status, body) = call(
        ports,
        actix_test::TestRequest::patch()
            .uri("/api/recipes/4/")
            .insert_header(token_header())
            .set_json(json!({"ingredients": [{"id": 1, "amount": 5}]})),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[actix_web::test]
async fn partial_updates_reach_the_service_with_the_raw_payload() {
    let caller = UserId::random();
    let mut ports = TestPorts {
        login: authenticated_as(&caller),
        ..TestPorts::default()
    };
    let mut recipes = MockRecipesCommand::new();
    recipes
        .expect_update()
        .withf(|_, id, input| {
            *id == RecipeId::new(4)
                && input.name.as_deref() == Some("Hijacked")
                && input.ingredients.is_none()
        })
        .times(1)
        .returning(|_, _, _| Err(Error::forbidden("only the author may change this recipe")));
    ports.recipes = recipes;

    let (status, body) = call(
        ports,
        actix_test::TestRequest::patch()
            .uri("/api/recipes/4/")
            .insert_header(token_header())
            .set_json(json!({"name": "Hijacked"})),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[actix_web::test]
async fn delete_returns_no_content() {
    let caller = UserId::random();
    let mut ports = TestPorts {
        login: authenticated_as(&caller),
        ..TestPorts::default()
    };
    ports
        .recipes
        .expect_delete()
        .withf(|_, id| id.get() == 4)
        .times(1)
        .returning(|_, _| Ok(()));

    let (status, _) = call(
        ports,
        actix_test::TestRequest::delete()
            .uri("/api/recipes/4/")
            .insert_header(token_header()),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn non_numeric_recipe_ids_are_not_found() {
    let (status, body) = call(
        TestPorts::default(),
        actix_test::TestRequest::get().uri("/api/recipes/pancakes/"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[actix_web::test]
async fn short_links_are_returned_under_a_hyphenated_key() {
    let mut ports = TestPorts::default();
    ports
        .recipes_query
        .expect_short_link()
        .returning(|_| Ok("http://testserver/short/a1B2c3".to_owned()));

    let (status, body) = call(
        ports,
        actix_test::TestRequest::get().uri("/api/recipes/4/get-link/"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"short-link": "http://testserver/short/a1B2c3"}));
}

#[rstest]
#[case("/api/recipes/4/favorite/", RelationKind::Favorite)]
#[case("/api/recipes/4/shopping_cart/", RelationKind::ShoppingCart)]
#[actix_web::test]
async fn adding_a_relation_returns_the_summary(#[case] uri: &str, #[case] kind: RelationKind) {
    let caller = UserId::random();
    let mut relations = MockRecipeRelationsCommand::new();
    relations
        .expect_add()
        .withf(move |k, _, id| *k == kind && id.get() == 4)
        .times(1)
        .returning(|_, _, _| Ok(view(4).recipe.summary()));
    let ports = TestPorts {
        login: authenticated_as(&caller),
        relations,
        ..TestPorts::default()
    };

    let (status, body) = call(
        ports,
        actix_test::TestRequest::post()
            .uri(uri)
            .insert_header(token_header()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({
            "id": 4,
            "name": "Pancakes",
            "image": "http://testserver/media/recipes/pancakes.png",
            "cooking_time": 20,
        })
    );
}

#[actix_web::test]
async fn duplicate_favorites_conflict() {
    let caller = UserId::random();
    let mut relations = MockRecipeRelationsCommand::new();
    relations
        .expect_add()
        .returning(|kind, _, _| Err(Error::conflict(kind.duplicate_message())));
    let ports = TestPorts {
        login: authenticated_as(&caller),
        relations,
        ..TestPorts::default()
    };

    let (status, body) = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/recipes/4/favorite/")
            .insert_header(token_header()),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "recipe is already in favorites");
}

#[actix_web::test]
async fn removing_an_absent_cart_entry_is_not_found() {
    let caller = UserId::random();
    let mut relations = MockRecipeRelationsCommand::new();
    relations
        .expect_remove()
        .returning(|kind, _, _| Err(Error::not_found(kind.missing_message())));
    let ports = TestPorts {
        login: authenticated_as(&caller),
        relations,
        ..TestPorts::default()
    };

    let (status, body) = call(
        ports,
        actix_test::TestRequest::delete()
            .uri("/api/recipes/4/shopping_cart/")
            .insert_header(token_header()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "recipe is not in the shopping cart");
}

#[actix_web::test]
async fn shopping_list_downloads_as_a_text_attachment() {
    let caller = UserId::random();
    let mut ports = TestPorts {
        login: authenticated_as(&caller),
        ..TestPorts::default()
    };
    ports.shopping_list.expect_shopping_list().returning(|_| {
        Ok(ShoppingList::aggregate(vec![
            IngredientTotal {
                name: "Sugar".to_owned(),
                measurement_unit: "grams".to_owned(),
                amount: 100,
            },
            IngredientTotal {
                name: "Sugar".to_owned(),
                measurement_unit: "grams".to_owned(),
                amount: 50,
            },
        ]))
    });
    let app = actix_test::init_service(api_app(ports, configure)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/recipes/download_shopping_cart/")
            .insert_header(token_header())
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let disposition = res
        .headers()
        .get("content-disposition")
        .and_then(|value| value.to_str().ok())
        .expect("content disposition")
        .to_owned();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains("shopping_list.txt"));
    let body = actix_test::read_body(res).await;
    let text = String::from_utf8(body.to_vec()).expect("utf-8 body");
    assert!(text.contains("Sugar (grams): 150"), "{text}");
}

#[actix_web::test]
async fn empty_carts_cannot_be_downloaded() {
    let caller = UserId::random();
    let mut ports = TestPorts {
        login: authenticated_as(&caller),
        ..TestPorts::default()
    };
    ports.shopping_list.expect_shopping_list().returning(|_| {
        Err(Error::invalid_request("shopping cart is empty")
            .with_details(json!({"field": "shopping_cart", "code": "empty_cart"})))
    });

    let (status, body) = call(
        ports,
        actix_test::TestRequest::get()
            .uri("/api/recipes/download_shopping_cart/")
            .insert_header(token_header()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "empty_cart");
}
