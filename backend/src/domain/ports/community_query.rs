//! Driving port for reading communities.

use async_trait::async_trait;

use crate::domain::{Community, CommunityName, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunityQuery: Send + Sync {
    /// All communities ordered by name.
    async fn list_communities(&self) -> Result<Vec<Community>, Error>;

    async fn get_community(&self, name: &CommunityName) -> Result<Community, Error>;
}
