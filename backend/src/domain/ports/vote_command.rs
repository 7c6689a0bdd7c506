//! Driving port for casting votes on posts and comments.

use async_trait::async_trait;

use crate::domain::{Error, SubjectRef, Username, VoteTally, VoteValue};

/// Request to cast or change a vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastVoteRequest {
    pub subject: SubjectRef,
    /// Authenticated caller; the vote is recorded under this identity.
    pub voter: Username,
    /// Voter named in the payload, if any. It must match `voter`.
    pub claimed_voter: Option<Username>,
    pub value: VoteValue,
}

/// Domain use-case port for voting.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteCommand: Send + Sync {
    /// Record the vote and return the subject's recomputed tally.
    async fn cast_vote(&self, request: CastVoteRequest) -> Result<VoteTally, Error>;
}
