//! Community HTTP handlers.
//!
//! ```text
//! POST /api/v1/communities {"name":"rust","description":"..."}
//! GET /api/v1/communities
//! GET /api/v1/communities/rust
//! DELETE /api/v1/communities/rust
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CreateCommunityRequest;
use crate::domain::{Community, CommunityName, validate_description};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    NAME, map_community_validation_error, parse_community_name,
};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunityBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunityResponse {
    pub name: String,
    pub description: String,
    pub creator: String,
    pub created_at: String,
}

impl From<Community> for CommunityResponse {
    fn from(value: Community) -> Self {
        Self {
            name: value.name.to_string(),
            description: value.description,
            creator: value.creator.to_string(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Create a community owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/communities",
    request_body = CreateCommunityBody,
    responses(
        (status = 201, description = "Community created", body = CommunityResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Name taken", body = ErrorSchema)
    ),
    tags = ["communities"],
    operation_id = "createCommunity"
)]
#[post("/communities")]
pub async fn create_community(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateCommunityBody>,
) -> ApiResult<HttpResponse> {
    let CreateCommunityBody { name, description } = payload.into_inner();
    let name = CommunityName::new(name).map_err(map_community_validation_error)?;
    let description =
        validate_description(&description).map_err(map_community_validation_error)?;
    let community = state
        .communities
        .create_community(CreateCommunityRequest {
            name,
            description,
            creator: user.into_username(),
        })
        .await?;
    Ok(HttpResponse::Created().json(CommunityResponse::from(community)))
}

#[utoipa::path(
    get,
    path = "/api/v1/communities",
    responses(
        (status = 200, description = "Communities ordered by name", body = [CommunityResponse]),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["communities"],
    operation_id = "listCommunities",
    security([])
)]
#[get("/communities")]
pub async fn list_communities(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CommunityResponse>>> {
    let communities = state.communities_query.list_communities().await?;
    Ok(web::Json(
        communities.into_iter().map(CommunityResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/communities/{name}",
    params(("name" = String, Path, description = "Community name")),
    responses(
        (status = 200, description = "Community", body = CommunityResponse),
        (status = 404, description = "No such community", body = ErrorSchema)
    ),
    tags = ["communities"],
    operation_id = "getCommunity",
    security([])
)]
#[get("/communities/{name}")]
pub async fn get_community(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CommunityResponse>> {
    let name = parse_community_name(path.into_inner(), NAME)?;
    let community = state.communities_query.get_community(&name).await?;
    Ok(web::Json(CommunityResponse::from(community)))
}

/// Delete a community. Only its creator may do so.
#[utoipa::path(
    delete,
    path = "/api/v1/communities/{name}",
    params(("name" = String, Path, description = "Community name")),
    responses(
        (status = 204, description = "Community deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the creator", body = ErrorSchema),
        (status = 404, description = "No such community", body = ErrorSchema)
    ),
    tags = ["communities"],
    operation_id = "deleteCommunity"
)]
#[delete("/communities/{name}")]
pub async fn delete_community(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let name = parse_community_name(path.into_inner(), NAME)?;
    state
        .communities
        .delete_community(&name, user.username())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
