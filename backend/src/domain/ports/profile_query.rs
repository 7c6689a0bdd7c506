//! Driving port for reading profiles.

use async_trait::async_trait;

use crate::domain::{Error, ProfileView, Username};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Profile with post and comment counts computed at read time.
    async fn get_profile(&self, username: &Username) -> Result<ProfileView, Error>;
}
