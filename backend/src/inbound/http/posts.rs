//! Post HTTP handlers.
//!
//! ```text
//! POST /api/v1/posts {"title":"...","body":"...","community":"rust"}
//! GET /api/v1/posts?community=rust
//! GET /api/v1/posts/{id}
//! PATCH /api/v1/posts/{id} {"title":"..."}
//! DELETE /api/v1/posts/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{CreatePostRequest, UpdatePostRequest};
use crate::domain::{Post, validate_post_body, validate_title};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    COMMUNITY, ErrorCode, FieldName, field_error, map_content_validation_error,
    parse_community_name, parse_uuid,
};

pub(crate) const POST_ID: FieldName = FieldName::new("id");

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostBody {
    pub title: String,
    pub body: String,
    pub community: String,
}

/// Partial edit. Omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostBody {
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PostListQuery {
    /// Restrict the listing to one community.
    pub community: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub body: String,
    pub community: String,
    pub owner: String,
    pub up_count: u64,
    pub down_count: u64,
    pub comments_count: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Post> for PostResponse {
    fn from(value: Post) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title,
            body: value.body,
            community: value.community.to_string(),
            owner: value.owner.to_string(),
            up_count: value.up_count,
            down_count: value.down_count,
            comments_count: value.comments_count,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Publish a post into an existing community.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostBody,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such community", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreatePostBody>,
) -> ApiResult<HttpResponse> {
    let CreatePostBody {
        title,
        body,
        community,
    } = payload.into_inner();
    let title = validate_title(&title).map_err(map_content_validation_error)?;
    let body = validate_post_body(&body).map_err(map_content_validation_error)?;
    let community = parse_community_name(community, COMMUNITY)?;
    let post = state
        .posts
        .create_post(CreatePostRequest {
            title,
            body,
            community,
            owner: user.into_username(),
        })
        .await?;
    Ok(HttpResponse::Created().json(PostResponse::from(post)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(PostListQuery),
    responses(
        (status = 200, description = "Posts, newest first", body = [PostResponse]),
        (status = 400, description = "Invalid community filter", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "listPosts",
    security([])
)]
#[get("/posts")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    query: web::Query<PostListQuery>,
) -> ApiResult<web::Json<Vec<PostResponse>>> {
    let community = query
        .into_inner()
        .community
        .map(|raw| parse_community_name(raw, COMMUNITY))
        .transpose()?;
    let posts = state.posts_query.list_posts(community).await?;
    Ok(web::Json(posts.into_iter().map(PostResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post", body = PostResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 404, description = "No such post", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "getPost",
    security([])
)]
#[get("/posts/{id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PostResponse>> {
    let id = parse_uuid(&path.into_inner(), POST_ID)?;
    let post = state.posts_query.get_post(id).await?;
    Ok(web::Json(PostResponse::from(post)))
}

/// Edit title and/or body. Only the post owner may do so.
#[utoipa::path(
    patch,
    path = "/api/v1/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    request_body = UpdatePostBody,
    responses(
        (status = 200, description = "Updated post", body = PostResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the post owner", body = ErrorSchema),
        (status = 404, description = "No such post", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "updatePost"
)]
#[patch("/posts/{id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdatePostBody>,
) -> ApiResult<web::Json<PostResponse>> {
    let id = parse_uuid(&path.into_inner(), POST_ID)?;
    let UpdatePostBody { title, body } = payload.into_inner();
    if title.is_none() && body.is_none() {
        return Err(field_error(
            FieldName::new("title"),
            ErrorCode::EmptyValue,
            "supply a title or a body to update",
        ));
    }
    let title = title
        .map(|raw| validate_title(&raw))
        .transpose()
        .map_err(map_content_validation_error)?;
    let body = body
        .map(|raw| validate_post_body(&raw))
        .transpose()
        .map_err(map_content_validation_error)?;
    let post = state
        .posts
        .update_post(UpdatePostRequest {
            id,
            caller: user.into_username(),
            title,
            body,
        })
        .await?;
    Ok(web::Json(PostResponse::from(post)))
}

/// Delete a post and its comments. Only the post owner may do so.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the post owner", body = ErrorSchema),
        (status = 404, description = "No such post", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path.into_inner(), POST_ID)?;
    state.posts.delete_post(id, user.username()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "posts_tests.rs"]
mod tests;
