//! Driving port for reading posts.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CommunityName, Error, Post};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostQuery: Send + Sync {
    /// Posts newest first, optionally restricted to one community.
    async fn list_posts(&self, community: Option<CommunityName>) -> Result<Vec<Post>, Error>;

    async fn get_post(&self, id: Uuid) -> Result<Post, Error>;
}
