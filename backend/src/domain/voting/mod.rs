//! Voting on posts and comments.
//!
//! The ledger keeps one [`VoteRecord`] per (subject, voter) pair; the
//! aggregator recomputes a subject's [`VoteTally`] from its ledger entries; and
//! [`VoteService`] sequences ledger upsert, aggregation and write-back of the
//! counts onto the subject document.
//!
//! Vote lifecycle per (subject, voter): `NoVote -> Voted(+1) <-> Voted(-1)`.
//! There is no way back to `NoVote`.

mod aggregator;
mod ledger;
mod service;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Username;
use super::ports::Collection;

pub use aggregator::VoteAggregator;
pub use ledger::VoteLedger;
pub use service::VoteService;

/// Ledger field holding the subject id.
pub const SUBJECT_FIELD: &str = "subject_id";
/// Ledger field holding the signed vote value.
pub const VALUE_FIELD: &str = "value";
/// Subject field holding the aggregated up votes.
pub const UP_COUNT_FIELD: &str = "up_count";
/// Subject field holding the aggregated down votes.
pub const DOWN_COUNT_FIELD: &str = "down_count";

/// Raised when a vote value is not one of the two signed units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteValidationError {
    OutOfRange { value: i64 },
}

impl fmt::Display for VoteValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { value } => {
                write!(f, "vote value must be 1 or -1, got {value}")
            }
        }
    }
}

impl std::error::Error for VoteValidationError {}

/// A signed unit vote.
///
/// # Examples
/// ```
/// use forum_backend::domain::VoteValue;
///
/// assert_eq!(VoteValue::try_from(-1), Ok(VoteValue::Down));
/// assert!(VoteValue::try_from(2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = VoteValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Up),
            -1 => Ok(Self::Down),
            other => Err(VoteValidationError::OutOfRange { value: other }),
        }
    }
}

impl From<VoteValue> for i64 {
    fn from(value: VoteValue) -> Self {
        value.as_i64()
    }
}

/// Kinds of votable subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    Post,
    Comment,
}

impl SubjectKind {
    /// Collection holding the subjects themselves.
    pub const fn subject_collection(self) -> Collection {
        match self {
            Self::Post => Collection::Posts,
            Self::Comment => Collection::Comments,
        }
    }

    /// Collection holding the vote ledger for this kind of subject.
    pub const fn ledger_collection(self) -> Collection {
        match self {
            Self::Post => Collection::PostVotes,
            Self::Comment => Collection::CommentVotes,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

/// Identifies one votable subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectRef {
    pub kind: SubjectKind,
    pub id: Uuid,
}

impl SubjectRef {
    pub const fn post(id: Uuid) -> Self {
        Self {
            kind: SubjectKind::Post,
            id,
        }
    }

    pub const fn comment(id: Uuid) -> Self {
        Self {
            kind: SubjectKind::Comment,
            id,
        }
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.as_str(), self.id)
    }
}

/// One voter's current vote on one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// Composite ledger key, see [`VoteRecord::ledger_key`].
    pub id: String,
    pub subject_id: Uuid,
    pub voter: Username,
    pub value: VoteValue,
    pub cast_at: DateTime<Utc>,
}

impl VoteRecord {
    /// Deterministic key enforcing one record per (subject, voter).
    pub fn ledger_key(subject_id: &Uuid, voter: &Username) -> String {
        format!("{subject_id}:{voter}")
    }
}

/// Ledger state change caused by casting a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    /// Value held before the cast; `None` when the voter had not voted.
    pub previous: Option<VoteValue>,
    pub current: VoteValue,
}

/// Up and down totals for a subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub up_count: u64,
    pub down_count: u64,
}

impl VoteTally {
    pub const fn new(up_count: u64, down_count: u64) -> Self {
        Self {
            up_count,
            down_count,
        }
    }
}

/// What the workflow does when aggregation fails after the ledger write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AggregationFailurePolicy {
    /// Surface the persistence failure to the caller.
    #[default]
    Propagate,
    /// Log the failure, skip the write-back and report neutral `(0, 0)` counts.
    FailOpen,
}
