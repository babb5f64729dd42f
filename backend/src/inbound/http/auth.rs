//! Token login and logout handlers.
//!
//! ```text
//! POST /api/auth/token/login/ {"email":"ada@example.com","password":"s3cret"}
//! POST /api/auth/token/logout/
//! ```

use actix_web::{HttpResponse, post, web};

use crate::domain::LoginCredentials;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users_dto::{LoginRequest, TokenResponse};

/// Exchange credentials for the caller's token.
///
/// Logging in twice returns the same token until it is revoked.
#[utoipa::path(
    post,
    path = "/api/auth/token/login/",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Malformed credentials", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security(())
)]
#[post("/auth/token/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let token = state.login.login(&credentials).await?;
    Ok(web::Json(TokenResponse {
        auth_token: token.as_str().to_owned(),
    }))
}

/// Revoke the caller's token.
#[utoipa::path(
    post,
    path = "/api/auth/token/logout/",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/token/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    state.login.logout(&user).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register token routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login).service(logout);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthToken, Error, ErrorCode, UserId};
    use crate::inbound::http::test_utils::{
        TEST_TOKEN, TestPorts, api_app, authenticated_as, token_header,
    };
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use rstest_bdd_macros::{given, then, when};
    use serde_json::{Value, json};

    #[given("a complete login body")]
    fn a_complete_login_body() -> LoginRequest {
        LoginRequest {
            email: Some("ada@example.com".to_owned()),
            password: Some("s3cret".to_owned()),
        }
    }

    #[given("a login body without a password")]
    fn a_login_body_without_a_password() -> LoginRequest {
        LoginRequest {
            password: None,
            ..a_complete_login_body()
        }
    }

    #[when("the body is validated")]
    fn the_body_is_validated(request: LoginRequest) -> ApiResult<LoginCredentials> {
        Ok(LoginCredentials::try_from(request)?)
    }

    #[then("credentials are produced")]
    fn credentials_are_produced(result: ApiResult<LoginCredentials>) {
        let credentials = result.expect("valid credentials");
        assert_eq!(credentials.email().as_ref(), "ada@example.com");
    }

    #[then("the missing field is reported")]
    fn the_missing_field_is_reported(result: ApiResult<LoginCredentials>) {
        let error = result.expect_err("should be an error");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.details().expect("details")["field"], "password");
    }

    #[rstest]
    fn login_validation_happy_path() {
        credentials_are_produced(the_body_is_validated(a_complete_login_body()));
    }

    #[rstest]
    fn login_validation_unhappy_path() {
        the_missing_field_is_reported(the_body_is_validated(a_login_body_without_a_password()));
    }

    #[actix_web::test]
    async fn login_returns_the_token() {
        let mut ports = TestPorts::default();
        ports
            .login
            .expect_login()
            .withf(|credentials| credentials.email().as_ref() == "ada@example.com")
            .times(1)
            .returning(|_| AuthToken::parse(TEST_TOKEN).map_err(|err| Error::internal(err.to_string())));
        let app = actix_test::init_service(api_app(ports, configure)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/auth/token/login/")
                .set_json(json!({"email": "ada@example.com", "password": "s3cret"}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body, json!({"auth_token": TEST_TOKEN}));
    }

    #[actix_web::test]
    async fn bad_credentials_are_unauthorised() {
        let mut ports = TestPorts::default();
        ports.login.expect_login().returning(|_| {
            Err(Error::unauthorized(
                "unable to log in with the provided credentials",
            ))
        });
        let app = actix_test::init_service(api_app(ports, configure)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/auth/token/login/")
                .set_json(json!({"email": "ada@example.com", "password": "wrong"}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn logout_revokes_the_callers_token() {
        let caller = UserId::random();
        let expected = caller.clone();
        let mut ports = TestPorts {
            login: authenticated_as(&caller),
            ..TestPorts::default()
        };
        ports
            .login
            .expect_logout()
            .withf(move |user| *user == expected)
            .times(1)
            .returning(|_| Ok(()));
        let app = actix_test::init_service(api_app(ports, configure)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/auth/token/logout/")
                .insert_header(token_header())
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn logout_without_a_token_is_unauthorised() {
        let app = actix_test::init_service(api_app(TestPorts::default(), configure)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/auth/token/logout/")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
