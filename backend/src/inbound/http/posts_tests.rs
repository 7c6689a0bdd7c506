//! Handler tests for posts.

use super::*;
use crate::domain::{BODY_MAX, CommunityName, Error, Username};
use crate::inbound::http::test_utils::{StatePorts, expect_token};
use actix_web::http::StatusCode;
use actix_web::test;
use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

const POST_UUID: &str = "7b0e4c1e-2f7a-4d8e-9d43-5b0b7c3a9e11";

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_post)
        .service(list_posts)
        .service(get_post)
        .service(update_post)
        .service(delete_post);
}

fn post_id() -> Uuid {
    Uuid::parse_str(POST_UUID).expect("fixture uuid")
}

fn post(title: &str) -> Post {
    let at = Utc
        .with_ymd_and_hms(2025, 4, 1, 8, 0, 0)
        .single()
        .expect("timestamp");
    Post {
        id: post_id(),
        title: title.to_owned(),
        body: "body".to_owned(),
        community: CommunityName::new("rust").expect("community"),
        owner: Username::new("alice").expect("username"),
        up_count: 2,
        down_count: 1,
        comments_count: 4,
        created_at: at,
        updated_at: at,
    }
}

#[actix_web::test]
async fn posts_render_counts_in_camel_case() {
    let mut ports = StatePorts::default();
    ports
        .posts_query
        .expect_get_post()
        .withf(|id| *id == post_id())
        .times(1)
        .returning(|_| Ok(post("hello")));
    let app = test::init_service(ports.app(routes)).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/posts/{POST_UUID}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["upCount"], 2);
    assert_eq!(body["downCount"], 1);
    assert_eq!(body["commentsCount"], 4);
    assert_eq!(body["community"], "rust");
}

#[actix_web::test]
async fn malformed_ids_are_bad_requests() {
    let app = test::init_service(StatePorts::default().app(routes)).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/posts/p1")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "invalid_uuid");
}

#[actix_web::test]
async fn listing_forwards_the_community_filter() {
    let mut ports = StatePorts::default();
    ports
        .posts_query
        .expect_list_posts()
        .withf(|community| community.as_ref().map(ToString::to_string) == Some("rust".into()))
        .times(1)
        .returning(|_| Ok(vec![post("a")]));
    let app = test::init_service(ports.app(routes)).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/posts?community=rust")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Vec<PostResponse> = test::read_body_json(res).await;
    assert_eq!(body.len(), 1);
}

#[rstest]
#[case(json!({ "title": "", "body": "b", "community": "rust" }), "title")]
#[case(json!({ "title": "t", "body": "x".repeat(BODY_MAX + 1), "community": "rust" }), "body")]
#[case(json!({ "title": "t", "body": "b", "community": "r" }), "community")]
#[actix_web::test]
async fn create_validates_before_calling_the_service(#[case] body: Value, #[case] field: &str) {
    let mut ports = StatePorts::default();
    expect_token(&mut ports, "t", "alice");
    let app = test::init_service(ports.app(routes)).await;
    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(("Authorization", "Bearer t"))
        .set_json(body)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let payload: Value = test::read_body_json(res).await;
    assert_eq!(payload["details"]["field"], field);
}

#[actix_web::test]
async fn create_sets_the_caller_as_owner() {
    let mut ports = StatePorts::default();
    expect_token(&mut ports, "t", "alice");
    ports
        .posts
        .expect_create_post()
        .withf(|req| req.owner.to_string() == "alice" && req.title == "Hello")
        .times(1)
        .returning(|req| Ok(post(&req.title)));
    let app = test::init_service(ports.app(routes)).await;
    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(("Authorization", "Bearer t"))
        .set_json(json!({ "title": " Hello ", "body": "text", "community": "rust" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn empty_updates_are_rejected() {
    let mut ports = StatePorts::default();
    expect_token(&mut ports, "t", "alice");
    let app = test::init_service(ports.app(routes)).await;
    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/posts/{POST_UUID}"))
        .insert_header(("Authorization", "Bearer t"))
        .set_json(json!({}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn non_owners_are_forbidden_from_deleting() {
    let mut ports = StatePorts::default();
    expect_token(&mut ports, "t", "mallory");
    ports
        .posts
        .expect_delete_post()
        .withf(|_, caller| caller.to_string() == "mallory")
        .times(1)
        .returning(|_, _| Err(Error::forbidden("only the owner may modify this post")));
    let app = test::init_service(ports.app(routes)).await;
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/posts/{POST_UUID}"))
        .insert_header(("Authorization", "Bearer t"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
