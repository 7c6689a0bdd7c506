//! Comment HTTP handlers.
//!
//! ```text
//! POST /api/v1/posts/{id}/comments {"body":"..."}
//! GET /api/v1/posts/{id}/comments
//! PATCH /api/v1/comments/{id} {"body":"..."}
//! DELETE /api/v1/comments/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreateCommentRequest, UpdateCommentRequest};
use crate::domain::{Comment, validate_comment_body};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::posts::POST_ID;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, map_content_validation_error, parse_uuid};

pub(crate) const COMMENT_ID: FieldName = FieldName::new("id");

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub body: String,
    pub owner: String,
    pub up_count: u64,
    pub down_count: u64,
    pub edited: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(value: Comment) -> Self {
        Self {
            id: value.id.to_string(),
            post_id: value.post_id.to_string(),
            body: value.body,
            owner: value.owner.to_string(),
            up_count: value.up_count,
            down_count: value.down_count,
            edited: value.edited,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

fn parse_body(payload: web::Json<CommentBody>) -> ApiResult<String> {
    validate_comment_body(&payload.into_inner().body).map_err(map_content_validation_error)
}

/// Comment on a post as the caller.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/comments",
    params(("id" = String, Path, description = "Post id")),
    request_body = CommentBody,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such post", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "createComment"
)]
#[post("/posts/{id}/comments")]
pub async fn create_comment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<CommentBody>,
) -> ApiResult<HttpResponse> {
    let post_id = parse_uuid(&path.into_inner(), POST_ID)?;
    let body = parse_body(payload)?;
    let comment = state
        .comments
        .create_comment(CreateCommentRequest {
            post_id,
            body,
            owner: user.into_username(),
        })
        .await?;
    Ok(HttpResponse::Created().json(CommentResponse::from(comment)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}/comments",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Comments, oldest first", body = [CommentResponse]),
        (status = 404, description = "No such post", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "listComments",
    security([])
)]
#[get("/posts/{id}/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<CommentResponse>>> {
    let post_id = parse_uuid(&path.into_inner(), POST_ID)?;
    let comments = state.comments_query.list_comments(post_id).await?;
    Ok(web::Json(
        comments.into_iter().map(CommentResponse::from).collect(),
    ))
}

/// Replace a comment's body. Only its owner may do so.
#[utoipa::path(
    patch,
    path = "/api/v1/comments/{id}",
    params(("id" = String, Path, description = "Comment id")),
    request_body = CommentBody,
    responses(
        (status = 200, description = "Updated comment", body = CommentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the comment owner", body = ErrorSchema),
        (status = 404, description = "No such comment", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "updateComment"
)]
#[patch("/comments/{id}")]
pub async fn update_comment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<CommentBody>,
) -> ApiResult<web::Json<CommentResponse>> {
    let id = parse_uuid(&path.into_inner(), COMMENT_ID)?;
    let body = parse_body(payload)?;
    let comment = state
        .comments
        .update_comment(UpdateCommentRequest {
            id,
            caller: user.into_username(),
            body,
        })
        .await?;
    Ok(web::Json(CommentResponse::from(comment)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    params(("id" = String, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the comment owner", body = ErrorSchema),
        (status = 404, description = "No such comment", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "deleteComment"
)]
#[delete("/comments/{id}")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path.into_inner(), COMMENT_ID)?;
    state.comments.delete_comment(id, user.username()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BODY_MAX, Error, Username};
    use crate::inbound::http::test_utils::{StatePorts, expect_token};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};
    use uuid::Uuid;

    const POST_UUID: &str = "0c9f7f8e-4b5a-4c43-8e0e-1d2b3c4d5e6f";
    const COMMENT_UUID: &str = "a1b2c3d4-e5f6-4a7b-8c9d-0e1f2a3b4c5d";

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(create_comment)
            .service(list_comments)
            .service(update_comment)
            .service(delete_comment);
    }

    fn comment(body: &str, edited: bool) -> Comment {
        let at = Utc
            .with_ymd_and_hms(2025, 5, 5, 5, 5, 5)
            .single()
            .expect("timestamp");
        Comment {
            id: Uuid::parse_str(COMMENT_UUID).expect("uuid"),
            post_id: Uuid::parse_str(POST_UUID).expect("uuid"),
            body: body.to_owned(),
            owner: Username::new("alice").expect("username"),
            up_count: 0,
            down_count: 0,
            edited,
            created_at: at,
            updated_at: at,
        }
    }

    #[actix_web::test]
    async fn listing_a_missing_post_is_not_found() {
        let mut ports = StatePorts::default();
        ports
            .comments_query
            .expect_list_comments()
            .times(1)
            .returning(|_| Err(Error::not_found("post not found")));
        let app = test::init_service(ports.app(routes)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/posts/{POST_UUID}/comments"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn comments_are_attached_to_the_path_post() {
        let mut ports = StatePorts::default();
        expect_token(&mut ports, "t", "alice");
        ports
            .comments
            .expect_create_comment()
            .withf(|req| req.post_id.to_string() == POST_UUID && req.body == "nice")
            .times(1)
            .returning(|req| Ok(comment(&req.body, false)));
        let app = test::init_service(ports.app(routes)).await;
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/posts/{POST_UUID}/comments"))
            .insert_header(("Authorization", "Bearer t"))
            .set_json(json!({ "body": "nice" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["postId"], POST_UUID);
        assert_eq!(body["edited"], false);
    }

    #[actix_web::test]
    async fn oversized_bodies_are_rejected() {
        let mut ports = StatePorts::default();
        expect_token(&mut ports, "t", "alice");
        let app = test::init_service(ports.app(routes)).await;
        let req = test::TestRequest::patch()
            .uri(&format!("/api/v1/comments/{COMMENT_UUID}"))
            .insert_header(("Authorization", "Bearer t"))
            .set_json(json!({ "body": "x".repeat(BODY_MAX + 1) }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn edits_report_the_edited_flag() {
        let mut ports = StatePorts::default();
        expect_token(&mut ports, "t", "alice");
        ports
            .comments
            .expect_update_comment()
            .times(1)
            .returning(|req| Ok(comment(&req.body, true)));
        let app = test::init_service(ports.app(routes)).await;
        let req = test::TestRequest::patch()
            .uri(&format!("/api/v1/comments/{COMMENT_UUID}"))
            .insert_header(("Authorization", "Bearer t"))
            .set_json(json!({ "body": "fixed typo" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: CommentResponse = test::read_body_json(res).await;
        assert!(body.edited);
        assert_eq!(body.body, "fixed typo");
    }
}
