//! Communities group posts under a unique name chosen by their creator.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ownership::{OwnedResource, ResourceKind};
use super::user::{HANDLE_MAX, HANDLE_MIN, handle_regex};
use super::Username;

/// Maximum community description length in characters.
pub const DESCRIPTION_MAX: usize = 500;

/// Validation errors for community payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommunityValidationError {
    EmptyName,
    NameTooShort { min: usize },
    NameTooLong { max: usize },
    NameInvalidCharacters,
    DescriptionTooLong { max: usize },
}

impl fmt::Display for CommunityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "community name must not be empty"),
            Self::NameTooShort { min } => {
                write!(f, "community name must be at least {min} characters")
            }
            Self::NameTooLong { max } => {
                write!(f, "community name must be at most {max} characters")
            }
            Self::NameInvalidCharacters => write!(
                f,
                "community name may only contain letters, numbers, underscores, or hyphens",
            ),
            Self::DescriptionTooLong { max } => {
                write!(f, "community description must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for CommunityValidationError {}

/// Unique community handle; doubles as the community's document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommunityName(String);

impl CommunityName {
    pub fn new(name: impl Into<String>) -> Result<Self, CommunityValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CommunityValidationError::EmptyName);
        }
        let length = name.chars().count();
        if length < HANDLE_MIN {
            return Err(CommunityValidationError::NameTooShort { min: HANDLE_MIN });
        }
        if length > HANDLE_MAX {
            return Err(CommunityValidationError::NameTooLong { max: HANDLE_MAX });
        }
        if !handle_regex().is_match(&name) {
            return Err(CommunityValidationError::NameInvalidCharacters);
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for CommunityName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CommunityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CommunityName> for String {
    fn from(value: CommunityName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CommunityName {
    type Error = CommunityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validate a community description, trimming surrounding whitespace.
pub fn validate_description(raw: &str) -> Result<String, CommunityValidationError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > DESCRIPTION_MAX {
        return Err(CommunityValidationError::DescriptionTooLong {
            max: DESCRIPTION_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

/// Stored community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    #[serde(rename = "id")]
    pub name: CommunityName,
    pub description: String,
    pub creator: Username,
    pub created_at: DateTime<Utc>,
}

impl OwnedResource for Community {
    const KIND: ResourceKind = ResourceKind::Community;

    fn owner(&self) -> &Username {
        &self.creator
    }

    fn resource_id(&self) -> String {
        self.name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", CommunityValidationError::EmptyName)]
    #[case("rs", CommunityValidationError::NameTooShort { min: 3 })]
    #[case("rust lang", CommunityValidationError::NameInvalidCharacters)]
    fn rejects_invalid_names(#[case] raw: &str, #[case] expected: CommunityValidationError) {
        assert_eq!(CommunityName::new(raw).expect_err("invalid name"), expected);
    }

    #[rstest]
    fn description_is_trimmed_and_bounded() {
        assert_eq!(validate_description("  hello ").expect("valid"), "hello");
        let long = "x".repeat(DESCRIPTION_MAX + 1);
        assert_eq!(
            validate_description(&long).expect_err("too long"),
            CommunityValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX
            }
        );
    }

    #[rstest]
    fn stored_under_name_as_id() {
        let community = Community {
            name: CommunityName::new("rustaceans").expect("valid"),
            description: String::new(),
            creator: Username::new("alice").expect("valid"),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&community).expect("serialises");
        assert_eq!(value["id"], "rustaceans");
    }
}
