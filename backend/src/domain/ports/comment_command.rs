//! Driving port for comment mutations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Error, Username};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommentRequest {
    pub post_id: Uuid,
    pub body: String,
    pub owner: Username,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCommentRequest {
    pub id: Uuid,
    pub caller: Username,
    pub body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentCommand: Send + Sync {
    /// Add a comment and recompute the parent post's `comments_count`.
    async fn create_comment(&self, request: CreateCommentRequest) -> Result<Comment, Error>;

    /// Owner-only edit; marks the comment as edited.
    async fn update_comment(&self, request: UpdateCommentRequest) -> Result<Comment, Error>;

    /// Owner-only delete; recomputes the parent post's `comments_count`.
    async fn delete_comment(&self, id: Uuid, caller: &Username) -> Result<(), Error>;
}
