//! Driving port for creating and deleting communities.

use async_trait::async_trait;

use crate::domain::{Community, CommunityName, Error, Username};

/// Request to create a community owned by `creator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommunityRequest {
    pub name: CommunityName,
    /// Already validated description.
    pub description: String,
    pub creator: Username,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunityCommand: Send + Sync {
    /// Create a community; a taken name is a conflict.
    async fn create_community(&self, request: CreateCommunityRequest) -> Result<Community, Error>;

    /// Delete a community. Only its creator may do so.
    async fn delete_community(&self, name: &CommunityName, caller: &Username)
    -> Result<(), Error>;
}
