//! Token session extractor keeping HTTP handlers free of header parsing.
//!
//! Clients authenticate with `Authorization: Token <key>`. A request without
//! the header is anonymous; a request carrying an unknown or malformed token
//! is rejected with `401 Unauthorized` even on public endpoints.

use actix_web::http::header::{AUTHORIZATION, HeaderValue};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{AuthToken, Error, UserId};
use crate::inbound::http::state::HttpState;

/// Authorization scheme accepted in the `Authorization` header.
pub const TOKEN_SCHEME: &str = "Token";

/// Caller identity resolved from the request token, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user_id: Option<UserId>,
}

impl SessionContext {
    /// Session for a request that carried no token.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session for a caller whose token resolved to `user_id`.
    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// The authenticated caller, if any.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Require an authenticated caller or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id
            .clone()
            .ok_or_else(|| Error::unauthorized("authentication credentials were not provided"))
    }
}

/// Extract the token from an `Authorization` header value.
///
/// Returns `Ok(None)` when no header was sent.
fn parse_authorization(header: Option<&HeaderValue>) -> Result<Option<AuthToken>, Error> {
    let Some(value) = header else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
    let (scheme, key) = raw
        .trim()
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("authorization header must be `Token <key>`"))?;
    if !scheme.eq_ignore_ascii_case(TOKEN_SCHEME) {
        return Err(Error::unauthorized("unsupported authorization scheme"));
    }
    AuthToken::parse(key.trim())
        .map(Some)
        .map_err(|_| Error::unauthorized("invalid token"))
}

impl FromRequest for SessionContext {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = parse_authorization(req.headers().get(AUTHORIZATION));
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let Some(token) = token? else {
                return Ok(Self::anonymous());
            };
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let user_id = state.login.authenticate(&token).await?;
            Ok(Self::authenticated(user_id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;

    use crate::domain::ports::MockLoginService;
    use crate::inbound::http::test_utils::{TEST_TOKEN, TestPorts, token_header};

    fn whoami_app(
        login: MockLoginService,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let ports = TestPorts {
            login,
            ..TestPorts::default()
        };
        App::new().app_data(web::Data::new(ports.into_state())).route(
            "/whoami",
            web::get().to(|session: SessionContext| async move {
                let body = session
                    .user_id()
                    .map_or_else(|| "anonymous".to_owned(), ToString::to_string);
                HttpResponse::Ok().body(body)
            }),
        )
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some("Token abc"), false)]
    #[case(Some("Bearer 0123456789abcdef0123456789abcdef01234567"), false)]
    #[case(Some("Token"), false)]
    fn header_shapes_are_checked(#[case] raw: Option<&str>, #[case] accepted: bool) {
        let header = raw.map(|value| HeaderValue::from_str(value).expect("header"));
        assert_eq!(parse_authorization(header.as_ref()).is_ok(), accepted);
    }

    #[rstest]
    fn scheme_is_case_insensitive() {
        let header = HeaderValue::from_str(&format!("token {TEST_TOKEN}")).expect("header");
        let token = parse_authorization(Some(&header))
            .expect("parsed")
            .expect("token present");
        assert_eq!(token.as_str(), TEST_TOKEN);
    }

    #[actix_web::test]
    async fn missing_header_is_anonymous() {
        let mut login = MockLoginService::new();
        login.expect_authenticate().never();
        let app = actix_test::init_service(whoami_app(login)).await;

        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/whoami").to_request())
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(res).await, "anonymous");
    }

    #[actix_web::test]
    async fn known_token_resolves_the_caller() {
        let user = UserId::random();
        let expected = user.to_string();
        let mut login = MockLoginService::new();
        login
            .expect_authenticate()
            .withf(|token| token.as_str() == TEST_TOKEN)
            .times(1)
            .returning(move |_| Ok(user.clone()));
        let app = actix_test::init_service(whoami_app(login)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/whoami")
                .insert_header(token_header())
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(res).await, expected.as_bytes());
    }

    #[actix_web::test]
    async fn unknown_token_is_unauthorised_even_on_public_routes() {
        let mut login = MockLoginService::new();
        login
            .expect_authenticate()
            .returning(|_| Err(Error::unauthorized("invalid token")));
        let app = actix_test::init_service(whoami_app(login)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/whoami")
                .insert_header(token_header())
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    fn anonymous_sessions_require_login() {
        let err = SessionContext::anonymous()
            .require_user_id()
            .expect_err("anonymous");
        assert_eq!(err.code(), crate::domain::ErrorCode::Unauthorized);
    }
}
