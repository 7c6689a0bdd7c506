//! Profile HTTP handlers.
//!
//! ```text
//! GET /api/v1/profiles/alice
//! PATCH /api/v1/profiles/alice {"bio":"..."}
//! ```

use actix_web::{get, patch, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::UpdateBioRequest;
use crate::domain::{ProfileView, validate_bio};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_profile_validation_error, parse_username};

/// Profile with activity counts.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub username: String,
    pub bio: String,
    pub cake_day: String,
    pub post_count: u64,
    pub comment_count: u64,
}

impl From<ProfileView> for ProfileResponse {
    fn from(value: ProfileView) -> Self {
        Self {
            username: value.profile.username.to_string(),
            bio: value.profile.bio,
            cake_day: value.profile.cake_day.to_rfc3339(),
            post_count: value.post_count,
            comment_count: value.comment_count,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBioBody {
    pub bio: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/profiles/{username}",
    params(("username" = String, Path, description = "Account handle")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such profile", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "getProfile"
)]
#[get("/profiles/{username}")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let username = parse_username(path.into_inner())?;
    let view = state.profiles.get_profile(&username).await?;
    Ok(web::Json(ProfileResponse::from(view)))
}

/// Replace the bio. Only the profile owner may do so.
#[utoipa::path(
    patch,
    path = "/api/v1/profiles/{username}",
    params(("username" = String, Path, description = "Account handle")),
    request_body = UpdateBioBody,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the profile owner", body = ErrorSchema),
        (status = 404, description = "No such profile", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "updateProfile"
)]
#[patch("/profiles/{username}")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateBioBody>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let username = parse_username(path.into_inner())?;
    let bio = validate_bio(&payload.bio).map_err(map_profile_validation_error)?;
    let view = state
        .profile_edits
        .update_bio(UpdateBioRequest {
            username,
            caller: user.into_username(),
            bio,
        })
        .await?;
    Ok(web::Json(ProfileResponse::from(view)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BIO_MAX, Profile, Username};
    use crate::inbound::http::test_utils::{StatePorts, expect_token};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(get_profile).service(update_profile);
    }

    fn view(bio: &str) -> ProfileView {
        ProfileView {
            profile: Profile {
                username: Username::new("alice").expect("username"),
                bio: bio.to_owned(),
                cake_day: Utc
                    .with_ymd_and_hms(2025, 2, 1, 0, 0, 0)
                    .single()
                    .expect("timestamp"),
            },
            post_count: 3,
            comment_count: 5,
        }
    }

    #[actix_web::test]
    async fn profiles_include_activity_counts() {
        let mut ports = StatePorts::default();
        expect_token(&mut ports, "t", "bob");
        ports
            .profiles
            .expect_get_profile()
            .times(1)
            .returning(|_| Ok(view("hello")));
        let app = test::init_service(ports.app(routes)).await;
        let req = test::TestRequest::get()
            .uri("/api/v1/profiles/alice")
            .insert_header(("Authorization", "Bearer t"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body,
            json!({
                "username": "alice",
                "bio": "hello",
                "cakeDay": "2025-02-01T00:00:00+00:00",
                "postCount": 3,
                "commentCount": 5,
            })
        );
    }

    #[actix_web::test]
    async fn oversized_bios_are_rejected() {
        let mut ports = StatePorts::default();
        expect_token(&mut ports, "t", "alice");
        let app = test::init_service(ports.app(routes)).await;
        let req = test::TestRequest::patch()
            .uri("/api/v1/profiles/alice")
            .insert_header(("Authorization", "Bearer t"))
            .set_json(json!({ "bio": "x".repeat(BIO_MAX + 1) }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "bio");
    }

    #[actix_web::test]
    async fn bio_updates_carry_the_caller() {
        let mut ports = StatePorts::default();
        expect_token(&mut ports, "t", "alice");
        ports
            .profile_edits
            .expect_update_bio()
            .withf(|req| req.caller.to_string() == "alice" && req.bio == "new bio")
            .times(1)
            .returning(|req| Ok(view(&req.bio)));
        let app = test::init_service(ports.app(routes)).await;
        let req = test::TestRequest::patch()
            .uri("/api/v1/profiles/alice")
            .insert_header(("Authorization", "Bearer t"))
            .set_json(json!({ "bio": "  new bio " }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
