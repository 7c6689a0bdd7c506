//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers that take an [`AuthenticatedUser`] never run for requests with a
//! missing, malformed, invalid or expired token, or one whose account has
//! since been deleted; those fail with `401 Unauthorized` before any domain
//! logic or ownership check.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error};

use crate::domain::ports::TokenServiceError;
use crate::domain::{AuthenticatedIdentity, Error, Username};

use super::state::HttpState;

const BEARER_SCHEME: &str = "Bearer";

/// Identity proven by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(AuthenticatedIdentity);

impl AuthenticatedUser {
    pub fn username(&self) -> &Username {
        self.0.username()
    }

    pub fn into_username(self) -> Username {
        self.0.into_username()
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("login required"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) || token.is_empty() {
        return Err(Error::unauthorized("bearer token required"));
    }
    Ok(token.to_owned())
}

fn map_token_error(err: TokenServiceError) -> Error {
    match err {
        TokenServiceError::Expired => Error::unauthorized("token has expired"),
        TokenServiceError::Invalid { message } => {
            debug!(%message, "rejected bearer token");
            Error::unauthorized("invalid token")
        }
        TokenServiceError::Issue { message } => {
            error!(%message, "token service failed during verification");
            Error::internal("token verification failed")
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token?;
            let state = state.ok_or_else(|| Error::internal("http state is not configured"))?;
            let username = state.tokens.verify(&token).await.map_err(map_token_error)?;
            state.accounts.ensure_active(&username).await?;
            Ok(Self(AuthenticatedIdentity::new(username)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{StatePorts, expect_token};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.username().to_string())
    }

    async fn call(ports: StatePorts, header: Option<&str>) -> (StatusCode, String) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ports.into_state()))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;
        let mut req = test::TestRequest::get().uri("/whoami");
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        let res = test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let body = test::read_body(res).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[actix_web::test]
    async fn valid_tokens_yield_the_identity() {
        let mut ports = StatePorts::default();
        expect_token(&mut ports, "good", "alice");
        let (status, body) = call(ports, Some("Bearer good")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "alice");
    }

    #[rstest]
    #[case(None)]
    #[case(Some("good"))]
    #[case(Some("Basic good"))]
    #[case(Some("Bearer "))]
    #[actix_web::test]
    async fn missing_or_malformed_headers_are_unauthorised(#[case] header: Option<&str>) {
        let (status, _) = call(StatePorts::default(), header).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn tokens_for_deleted_accounts_are_unauthorised() {
        let mut ports = StatePorts::default();
        let identity = Username::new("alice").expect("username");
        ports
            .tokens
            .expect_verify()
            .times(1)
            .return_once(move |_| Ok(identity));
        ports
            .accounts
            .expect_ensure_active()
            .times(1)
            .returning(|_| Err(Error::unauthorized("account no longer exists")));
        let (status, body) = call(ports, Some("Bearer orphaned")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let payload: serde_json::Value = serde_json::from_str(&body).expect("error json");
        assert_eq!(payload["message"], "account no longer exists");
    }

    #[rstest]
    #[case(TokenServiceError::expired(), "token has expired")]
    #[case(TokenServiceError::invalid("bad signature"), "invalid token")]
    #[actix_web::test]
    async fn rejected_tokens_are_unauthorised(
        #[case] failure: TokenServiceError,
        #[case] message: &str,
    ) {
        let mut ports = StatePorts::default();
        ports
            .tokens
            .expect_verify()
            .times(1)
            .return_once(move |_| Err(failure));
        let (status, body) = call(ports, Some("Bearer stale")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let payload: serde_json::Value = serde_json::from_str(&body).expect("error json");
        assert_eq!(payload["message"], message);
    }
}
