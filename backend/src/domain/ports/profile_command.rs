//! Driving port for profile edits.

use async_trait::async_trait;

use crate::domain::{Error, ProfileView, Username};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBioRequest {
    pub username: Username,
    pub caller: Username,
    /// Already validated bio.
    pub bio: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Owner-only bio update.
    async fn update_bio(&self, request: UpdateBioRequest) -> Result<ProfileView, Error>;
}
