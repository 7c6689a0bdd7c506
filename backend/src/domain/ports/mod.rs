//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`DocumentStore`, `TokenService`, `PasswordHasher`) describe
//! what the domain needs from infrastructure. Driving ports (`*Command`,
//! `*Query`) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod comment_command;
mod comment_query;
mod community_command;
mod community_query;
mod document_store;
mod password_hasher;
mod post_command;
mod post_query;
mod profile_command;
mod profile_query;
mod token_service;
mod vote_command;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, LoginSession};
#[cfg(test)]
pub use comment_command::MockCommentCommand;
pub use comment_command::{CommentCommand, CreateCommentRequest, UpdateCommentRequest};
#[cfg(test)]
pub use comment_query::MockCommentQuery;
pub use comment_query::CommentQuery;
#[cfg(test)]
pub use community_command::MockCommunityCommand;
pub use community_command::{CommunityCommand, CreateCommunityRequest};
#[cfg(test)]
pub use community_query::MockCommunityQuery;
pub use community_query::CommunityQuery;
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    Collection, ConditionalSum, Document, DocumentStore, DocumentStoreError, Filter,
    GroupByQuery, GroupTotals, ID_FIELD, document_id, from_document, to_document,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use post_command::MockPostCommand;
pub use post_command::{CreatePostRequest, PostCommand, UpdatePostRequest};
#[cfg(test)]
pub use post_query::MockPostQuery;
pub use post_query::PostQuery;
#[cfg(test)]
pub use profile_command::MockProfileCommand;
pub use profile_command::{ProfileCommand, UpdateBioRequest};
#[cfg(test)]
pub use profile_query::MockProfileQuery;
pub use profile_query::ProfileQuery;
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenService, TokenServiceError};
#[cfg(test)]
pub use vote_command::MockVoteCommand;
pub use vote_command::{CastVoteRequest, VoteCommand};
