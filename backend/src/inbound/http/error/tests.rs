//! Tests for rendering domain errors over HTTP.

use super::*;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACE_ID: &str = "9b2f1c3e-5a4d-4e6f-8a7b-1c2d3e4f5a6b";

#[fixture]
fn store_failure() -> Error {
    Error::internal("relation \"documents\" does not exist")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "collection": "posts" }))
}

async fn render(error: &Error) -> (StatusCode, Option<String>, Value) {
    let response = error.error_response();
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let body = serde_json::from_slice(&bytes).expect("error body is JSON");
    (status, header, body)
}

#[rstest]
#[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::Unauthorized, StatusCode::UNAUTHORIZED)]
#[case(ErrorCode::Forbidden, StatusCode::FORBIDDEN)]
#[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
#[case(ErrorCode::Conflict, StatusCode::CONFLICT)]
#[case(ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE)]
#[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
fn each_code_has_one_status(#[case] code: ErrorCode, #[case] status: StatusCode) {
    assert_eq!(Error::new(code, "message").status_code(), status);
}

#[rstest]
#[actix_web::test]
async fn internal_failures_hide_their_cause(store_failure: Error) {
    let (status, header, body) = render(&store_failure).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(
        body,
        json!({ "code": "internal_error", "message": REDACTED_MESSAGE, "traceId": TRACE_ID })
    );
}

#[actix_web::test]
async fn validation_failures_keep_field_details() {
    let error = Error::invalid_request("title must not be empty")
        .with_details(json!({ "field": "title", "code": "empty_value" }));
    let (status, header, body) = render(&error).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(header.is_none(), "no trace id outside a request scope");
    assert_eq!(body["details"]["field"], "title");
    assert_eq!(body["message"], "title must not be empty");
}

#[actix_web::test]
async fn ownership_denials_are_forbidden_not_redacted() {
    let error = Error::forbidden("only the owner may modify this post");
    let (status, _, body) = render(&error).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
    assert_eq!(body["message"], "only the owner may modify this post");
}

#[rstest]
fn client_side_framework_errors_become_invalid_requests() {
    let err: Error = actix_web::error::ErrorBadRequest("expected value at line 1").into();
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(err.message().contains("expected value"));
}

#[rstest]
fn server_side_framework_errors_are_redacted() {
    let err: Error = actix_web::error::ErrorInternalServerError("pool poisoned").into();
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), REDACTED_MESSAGE);
    assert_eq!(err.details(), None);
}
