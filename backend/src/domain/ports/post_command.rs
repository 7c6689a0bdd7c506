//! Driving port for post mutations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CommunityName, Error, Post, Username};

/// Request to publish a post into an existing community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
    pub community: CommunityName,
    pub owner: Username,
}

/// Partial edit of a post. `None` leaves the field as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePostRequest {
    pub id: Uuid,
    pub caller: Username,
    pub title: Option<String>,
    pub body: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostCommand: Send + Sync {
    async fn create_post(&self, request: CreatePostRequest) -> Result<Post, Error>;

    /// Owner-only edit.
    async fn update_post(&self, request: UpdatePostRequest) -> Result<Post, Error>;

    /// Owner-only delete; the post's comments go with it.
    async fn delete_post(&self, id: Uuid, caller: &Username) -> Result<(), Error>;
}
