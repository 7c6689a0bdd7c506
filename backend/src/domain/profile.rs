//! Public user profiles.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ownership::{OwnedResource, ResourceKind};
use super::Username;

/// Maximum bio length in characters.
pub const BIO_MAX: usize = 280;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    BioTooLong { max: usize },
}

impl fmt::Display for ProfileValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BioTooLong { max } => write!(f, "bio must be at most {max} characters"),
        }
    }
}

impl std::error::Error for ProfileValidationError {}

/// Trim and bound a bio.
pub fn validate_bio(raw: &str) -> Result<String, ProfileValidationError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > BIO_MAX {
        return Err(ProfileValidationError::BioTooLong { max: BIO_MAX });
    }
    Ok(trimmed.to_owned())
}

/// Stored profile, created alongside the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "id")]
    pub username: Username,
    pub bio: String,
    /// Registration date.
    pub cake_day: DateTime<Utc>,
}

impl OwnedResource for Profile {
    const KIND: ResourceKind = ResourceKind::Profile;

    fn owner(&self) -> &Username {
        &self.username
    }

    fn resource_id(&self) -> String {
        self.username.to_string()
    }
}

/// Profile with activity counts derived at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub profile: Profile,
    pub post_count: u64,
    pub comment_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  hi there ", Ok("hi there".to_owned()))]
    #[case("", Ok(String::new()))]
    fn bios_are_trimmed(#[case] raw: &str, #[case] expected: Result<String, ProfileValidationError>) {
        assert_eq!(validate_bio(raw), expected);
    }

    #[rstest]
    fn long_bios_are_rejected() {
        let raw = "b".repeat(BIO_MAX + 1);
        assert_eq!(
            validate_bio(&raw),
            Err(ProfileValidationError::BioTooLong { max: BIO_MAX })
        );
    }
}
