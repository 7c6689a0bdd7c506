//! Per-request time budget.
//!
//! Handlers that do not finish within the budget are dropped and the client
//! receives `503 service_unavailable` in the usual error envelope. Dropping
//! the handler future abandons any in-flight store call; writes already
//! acknowledged by the store are not rolled back.

use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::Error as DomainError;

/// Middleware bounding how long a request may run.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use actix_web::App;
/// use forum_backend::middleware::RequestTimeout;
///
/// let app = App::new().wrap(RequestTimeout::new(Duration::from_secs(10)));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RequestTimeout {
    budget: Duration,
}

impl RequestTimeout {
    pub const fn new(budget: Duration) -> Self {
        Self { budget }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestTimeout
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTimeoutMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTimeoutMiddleware {
            service,
            budget: self.budget,
        }))
    }
}

/// Service wrapper produced by [`RequestTimeout`].
pub struct RequestTimeoutMiddleware<S> {
    service: S,
    budget: Duration,
}

impl<S, B> Service<ServiceRequest> for RequestTimeoutMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let path = req.path().to_owned();
        let budget = self.budget;
        let fut = self.service.call(req);
        Box::pin(async move {
            match tokio::time::timeout(budget, fut).await {
                Ok(res) => res.map(ServiceResponse::map_into_boxed_body),
                Err(_) => {
                    warn!(
                        path = %path,
                        budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
                        "request exceeded its time budget"
                    );
                    Err(DomainError::service_unavailable("request timed out").into())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Trace;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use serde_json::Value;

    async fn slow() -> HttpResponse {
        tokio::time::sleep(Duration::from_millis(200)).await;
        HttpResponse::Ok().finish()
    }

    async fn fast() -> HttpResponse {
        HttpResponse::Ok().body("done")
    }

    async fn echo_id(path: web::Path<String>) -> HttpResponse {
        HttpResponse::Ok().body(path.into_inner())
    }

    #[actix_web::test]
    async fn fast_handlers_pass_through() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTimeout::new(Duration::from_secs(1)))
                .route("/", web::get().to(fast)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await.as_ref(), b"done");
    }

    #[actix_web::test]
    async fn routed_requests_reach_path_handlers() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTimeout::new(Duration::from_secs(1)))
                .wrap(Trace)
                .service(web::scope("/api").route("/items/{id}", web::get().to(echo_id))),
        )
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/items/42").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await.as_ref(), b"42");
    }

    #[actix_web::test]
    async fn slow_handlers_become_service_unavailable() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTimeout::new(Duration::from_millis(20)))
                .wrap(Trace)
                .route("/", web::get().to(slow)),
        )
        .await;
        let err = test::try_call_service(&app, test::TestRequest::get().uri("/").to_request())
            .await
            .err()
            .expect("timeout should surface as an error");
        let res = err.error_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        let header = res
            .headers()
            .get(crate::domain::TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        assert!(header.is_some());
        let bytes = actix_web::body::to_bytes(res.into_body())
            .await
            .expect("body bytes");
        let body: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["code"], "service_unavailable");
        assert_eq!(body["traceId"].as_str().map(str::to_owned), header);
    }
}
