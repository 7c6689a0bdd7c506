//! Domain primitives, services and ports.
//!
//! Purpose: define the forum's strongly typed entities and the use-case
//! services that inbound adapters drive through the ports in [`ports`].
//! Services depend only on port traits; concrete stores, hashers and token
//! codecs are injected at construction time.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Username, Email, UserAccount: identities and accounts.
//! - Community, Post, Comment, Profile: forum records.
//! - VoteService, VoteLedger, VoteAggregator: the voting workflow.
//! - authorize / ensure_owner: the ownership guard.

pub mod auth;
pub mod community;
pub mod error;
pub mod ownership;
pub mod ports;
pub mod post;
pub mod profile;
pub mod trace_id;
pub mod user;
pub mod voting;

mod account_service;
mod comment_service;
mod community_service;
mod post_service;
mod profile_service;
mod store_errors;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::account_service::AccountService;
pub use self::auth::{
    AuthenticatedIdentity, IssuedToken, LoginCredentials, LoginValidationError, PASSWORD_MIN,
    SignupDetails, SignupValidationError,
};
pub use self::comment_service::CommentService;
pub use self::community::{
    Community, CommunityName, CommunityValidationError, DESCRIPTION_MAX, validate_description,
};
pub use self::community_service::CommunityService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ownership::{
    Access, OwnedResource, ResourceKind, authorize, ensure_identity, ensure_owner,
};
pub use self::post::{
    BODY_MAX, Comment, ContentValidationError, Post, TITLE_MAX, validate_comment_body,
    validate_post_body, validate_title,
};
pub use self::post_service::PostService;
pub use self::profile::{BIO_MAX, Profile, ProfileValidationError, ProfileView, validate_bio};
pub use self::profile_service::ProfileService;
pub use self::trace_id::TraceId;
pub use self::user::{Email, PublicAccount, UserAccount, UserValidationError, Username};
pub use self::voting::{
    AggregationFailurePolicy, SubjectKind, SubjectRef, VoteAggregator, VoteLedger, VoteRecord,
    VoteService, VoteTally, VoteTransition, VoteValidationError, VoteValue,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use forum_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
