//! Vote HTTP handlers.
//!
//! ```text
//! POST /api/v1/posts/{id}/votes {"value":1}
//! POST /api/v1/comments/{id}/votes {"value":-1,"voterId":"alice"}
//! ```
//!
//! The vote is always recorded for the authenticated caller. `voterId` and
//! `subjectId` are optional echoes of the caller and the path id; when
//! present they must agree with them.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::CastVoteRequest;
use crate::domain::{SubjectRef, Username, VoteTally};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::comments::COMMENT_ID;
use crate::inbound::http::posts::POST_ID;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    SUBJECT_ID, VOTER_ID, map_username_field_error, mismatch_error, parse_uuid, parse_vote_value,
};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    /// `1` for an upvote, `-1` for a downvote.
    pub value: i64,
    pub voter_id: Option<String>,
    pub subject_id: Option<String>,
}

/// Tally recomputed from the ledger after the vote.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteTallyResponse {
    pub up_count: u64,
    pub down_count: u64,
}

impl From<VoteTally> for VoteTallyResponse {
    fn from(value: VoteTally) -> Self {
        Self {
            up_count: value.up_count,
            down_count: value.down_count,
        }
    }
}

fn parse_vote_request(
    payload: VoteRequest,
    subject: SubjectRef,
    voter: Username,
) -> ApiResult<CastVoteRequest> {
    let VoteRequest {
        value,
        voter_id,
        subject_id,
    } = payload;
    if let Some(raw) = subject_id {
        let claimed = parse_uuid(&raw, SUBJECT_ID)?;
        if claimed != subject.id {
            return Err(mismatch_error(
                SUBJECT_ID,
                "subjectId does not match the voted resource",
            ));
        }
    }
    let claimed_voter = voter_id
        .map(|raw| Username::new(raw).map_err(|err| map_username_field_error(err, VOTER_ID)))
        .transpose()?;
    Ok(CastVoteRequest {
        subject,
        voter,
        claimed_voter,
        value: parse_vote_value(value)?,
    })
}

async fn cast(
    state: &HttpState,
    user: AuthenticatedUser,
    subject: SubjectRef,
    payload: VoteRequest,
) -> ApiResult<web::Json<VoteTallyResponse>> {
    let request = parse_vote_request(payload, subject, user.into_username())?;
    let tally = state.votes.cast_vote(request).await?;
    Ok(web::Json(VoteTallyResponse::from(tally)))
}

/// Cast or change the caller's vote on a post.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/votes",
    params(("id" = String, Path, description = "Post id")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Recomputed tally", body = VoteTallyResponse),
        (status = 400, description = "Invalid vote", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "voterId is not the caller", body = ErrorSchema),
        (status = 404, description = "No such post", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["votes"],
    operation_id = "voteOnPost"
)]
#[post("/posts/{id}/votes")]
pub async fn vote_on_post(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<VoteRequest>,
) -> ApiResult<web::Json<VoteTallyResponse>> {
    let id: Uuid = parse_uuid(&path.into_inner(), POST_ID)?;
    cast(&state, user, SubjectRef::post(id), payload.into_inner()).await
}

/// Cast or change the caller's vote on a comment.
#[utoipa::path(
    post,
    path = "/api/v1/comments/{id}/votes",
    params(("id" = String, Path, description = "Comment id")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Recomputed tally", body = VoteTallyResponse),
        (status = 400, description = "Invalid vote", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "voterId is not the caller", body = ErrorSchema),
        (status = 404, description = "No such comment", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["votes"],
    operation_id = "voteOnComment"
)]
#[post("/comments/{id}/votes")]
pub async fn vote_on_comment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<VoteRequest>,
) -> ApiResult<web::Json<VoteTallyResponse>> {
    let id: Uuid = parse_uuid(&path.into_inner(), COMMENT_ID)?;
    cast(&state, user, SubjectRef::comment(id), payload.into_inner()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Error, SubjectKind, VoteValue};
    use crate::inbound::http::test_utils::{StatePorts, expect_token};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    const SUBJECT: &str = "5f0c6a8e-1b2d-4e3f-8a9b-0c1d2e3f4a5b";

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(vote_on_post).service(vote_on_comment);
    }

    async fn send(ports: StatePorts, uri: &str, body: Value) -> (StatusCode, Value) {
        let app = test::init_service(ports.app(routes)).await;
        let req = test::TestRequest::post()
            .uri(uri)
            .insert_header(("Authorization", "Bearer t"))
            .set_json(body)
            .to_request();
        let res = test::call_service(&app, req).await;
        let status = res.status();
        let body: Value = test::read_body_json(res).await;
        (status, body)
    }

    fn authenticated(name: &str) -> StatePorts {
        let mut ports = StatePorts::default();
        expect_token(&mut ports, "t", name);
        ports
    }

    #[rstest]
    #[case("posts", SubjectKind::Post)]
    #[case("comments", SubjectKind::Comment)]
    #[actix_web::test]
    async fn votes_are_cast_for_the_caller(#[case] segment: &str, #[case] kind: SubjectKind) {
        let mut ports = authenticated("alice");
        ports
            .votes
            .expect_cast_vote()
            .withf(move |req| {
                req.subject.kind == kind
                    && req.subject.id.to_string() == SUBJECT
                    && req.voter.to_string() == "alice"
                    && req.claimed_voter.is_none()
                    && req.value == VoteValue::Down
            })
            .times(1)
            .returning(|_| Ok(VoteTally::new(1, 2)));
        let (status, body) = send(
            ports,
            &format!("/api/v1/{segment}/{SUBJECT}/votes"),
            json!({ "value": -1 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "upCount": 1, "downCount": 2 }));
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    #[case(-5)]
    #[actix_web::test]
    async fn out_of_range_values_are_rejected(#[case] value: i64) {
        let (status, body) = send(
            authenticated("alice"),
            &format!("/api/v1/posts/{SUBJECT}/votes"),
            json!({ "value": value }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "value");
    }

    #[actix_web::test]
    async fn claimed_voters_are_forwarded_for_the_identity_check() {
        let mut ports = authenticated("alice");
        ports
            .votes
            .expect_cast_vote()
            .withf(|req| req.claimed_voter.as_ref().map(ToString::to_string) == Some("bob".into()))
            .times(1)
            .returning(|_| Err(Error::forbidden("only the owner may modify this vote")));
        let (status, _) = send(
            ports,
            &format!("/api/v1/posts/{SUBJECT}/votes"),
            json!({ "value": 1, "voterId": "bob" }),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn mismatched_subject_ids_are_rejected() {
        let (status, body) = send(
            authenticated("alice"),
            &format!("/api/v1/posts/{SUBJECT}/votes"),
            json!({ "value": 1, "subjectId": "00000000-0000-0000-0000-000000000000" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["code"], "mismatch");
    }

    #[actix_web::test]
    async fn missing_subjects_are_not_found() {
        let mut ports = authenticated("alice");
        ports
            .votes
            .expect_cast_vote()
            .times(1)
            .returning(|_| Err(Error::not_found("post not found")));
        let (status, _) = send(
            ports,
            &format!("/api/v1/posts/{SUBJECT}/votes"),
            json!({ "value": 1, "subjectId": SUBJECT }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
