//! Driving port for reading comments.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentQuery: Send + Sync {
    /// Comments on a post, oldest first. A missing post is `not_found`.
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, Error>;
}
