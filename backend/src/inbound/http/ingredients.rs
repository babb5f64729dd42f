//! Ingredient catalog handlers.
//!
//! The catalog is read-only over HTTP; mutation verbs answer 405.
//!
//! ```text
//! GET /api/ingredients/?name=sug
//! GET /api/ingredients/{id}/
//! ```

use actix_web::{HttpResponse, delete, get, post, route, web};

use crate::domain::{Error, IngredientId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::recipes_dto::{IngredientResponse, IngredientSearchQuery};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const READ_ONLY: &str = "the ingredient catalog is read-only";

/// Search ingredients by case-insensitive name prefix.
#[utoipa::path(
    get,
    path = "/api/ingredients/",
    params(IngredientSearchQuery),
    responses(
        (status = 200, description = "Matching ingredients", body = [IngredientResponse]),
        (status = 401, description = "Unknown token", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "searchIngredients",
    security((), ("token" = []))
)]
#[get("/ingredients")]
pub async fn search_ingredients(
    state: web::Data<HttpState>,
    _session: SessionContext,
    query: web::Query<IngredientSearchQuery>,
) -> ApiResult<web::Json<Vec<IngredientResponse>>> {
    let IngredientSearchQuery { name } = query.into_inner();
    let found = state.ingredients.search(name).await?;
    Ok(web::Json(
        found.into_iter().map(IngredientResponse::from).collect(),
    ))
}

/// Fetch one ingredient.
#[utoipa::path(
    get,
    path = "/api/ingredients/{id}/",
    params(("id" = i64, Path, description = "Ingredient id")),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "getIngredient",
    security((), ("token" = []))
)]
#[get("/ingredients/{id}")]
pub async fn get_ingredient(
    state: web::Data<HttpState>,
    _session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<IngredientResponse>> {
    let ingredient = state
        .ingredients
        .get(IngredientId::new(path.into_inner()))
        .await?;
    Ok(web::Json(IngredientResponse::from(ingredient)))
}

#[post("/ingredients")]
async fn create_ingredient() -> ApiResult<HttpResponse> {
    Err(Error::method_not_allowed(READ_ONLY))
}

#[route("/ingredients/{id}", method = "PUT", method = "PATCH")]
async fn update_ingredient() -> ApiResult<HttpResponse> {
    Err(Error::method_not_allowed(READ_ONLY))
}

#[delete("/ingredients/{id}")]
async fn delete_ingredient() -> ApiResult<HttpResponse> {
    Err(Error::method_not_allowed(READ_ONLY))
}

/// Register ingredient routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(search_ingredients)
        .service(create_ingredient)
        .service(get_ingredient)
        .service(update_ingredient)
        .service(delete_ingredient);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::ingredient;
    use crate::inbound::http::test_utils::{TestPorts, api_app};
    use actix_web::http::{Method, StatusCode};
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn search_passes_the_prefix_through() {
        let mut ports = TestPorts::default();
        ports
            .ingredients
            .expect_search()
            .withf(|name| name.as_deref() == Some("sug"))
            .times(1)
            .returning(|_| Ok(vec![ingredient(17, "Sugar", "g")]));
        let app = actix_test::init_service(api_app(ports, configure)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/ingredients/?name=sug")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body,
            json!([{"id": 17, "name": "Sugar", "measurement_unit": "g"}])
        );
    }

    #[actix_web::test]
    async fn missing_ingredients_are_not_found() {
        let mut ports = TestPorts::default();
        ports
            .ingredients
            .expect_get()
            .returning(|_| Err(Error::not_found("ingredient not found")));
        let app = actix_test::init_service(api_app(ports, configure)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/ingredients/404/")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[case(Method::POST, "/api/ingredients/")]
    #[case(Method::PUT, "/api/ingredients/1/")]
    #[case(Method::PATCH, "/api/ingredients/1/")]
    #[case(Method::DELETE, "/api/ingredients/1/")]
    #[actix_web::test]
    async fn mutation_verbs_are_not_allowed(#[case] method: Method, #[case] uri: &str) {
        let app = actix_test::init_service(api_app(TestPorts::default(), configure)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::default()
                .method(method)
                .uri(uri)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["code"], "method_not_allowed");
    }
}
