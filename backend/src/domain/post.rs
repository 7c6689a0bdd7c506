//! Posts and comments: the votable subjects of the forum.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ownership::{OwnedResource, ResourceKind};
use super::{CommunityName, Username};

/// Maximum title length in characters.
pub const TITLE_MAX: usize = 300;
/// Maximum post or comment body length in characters.
pub const BODY_MAX: usize = 40_000;

/// Validation errors for post and comment content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentValidationError {
    EmptyTitle,
    TitleTooLong { max: usize },
    EmptyBody,
    BodyTooLong { max: usize },
}

impl fmt::Display for ContentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::EmptyBody => write!(f, "body must not be empty"),
            Self::BodyTooLong { max } => write!(f, "body must be at most {max} characters"),
        }
    }
}

impl std::error::Error for ContentValidationError {}

/// Trim and bound a post title.
pub fn validate_title(raw: &str) -> Result<String, ContentValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ContentValidationError::EmptyTitle);
    }
    if trimmed.chars().count() > TITLE_MAX {
        return Err(ContentValidationError::TitleTooLong { max: TITLE_MAX });
    }
    Ok(trimmed.to_owned())
}

/// Bound a post body. Posts may have an empty body.
pub fn validate_post_body(raw: &str) -> Result<String, ContentValidationError> {
    if raw.chars().count() > BODY_MAX {
        return Err(ContentValidationError::BodyTooLong { max: BODY_MAX });
    }
    Ok(raw.to_owned())
}

/// Comments must carry text.
pub fn validate_comment_body(raw: &str) -> Result<String, ContentValidationError> {
    if raw.trim().is_empty() {
        return Err(ContentValidationError::EmptyBody);
    }
    validate_post_body(raw)
}

/// Stored post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub community: CommunityName,
    pub owner: Username,
    /// Written back by the vote workflow only.
    pub up_count: u64,
    /// Written back by the vote workflow only.
    pub down_count: u64,
    pub comments_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Post {
    const KIND: ResourceKind = ResourceKind::Post;

    fn owner(&self) -> &Username {
        &self.owner
    }

    fn resource_id(&self) -> String {
        self.id.to_string()
    }
}

/// Stored comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub body: String,
    pub owner: Username,
    pub up_count: u64,
    pub down_count: u64,
    /// Set once the owner edits the body.
    pub edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Comment {
    const KIND: ResourceKind = ResourceKind::Comment;

    fn owner(&self) -> &Username {
        &self.owner
    }

    fn resource_id(&self) -> String {
        self.id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", Err(ContentValidationError::EmptyTitle))]
    #[case("   ", Err(ContentValidationError::EmptyTitle))]
    #[case("  Hello  ", Ok("Hello".to_owned()))]
    fn titles_are_trimmed(
        #[case] raw: &str,
        #[case] expected: Result<String, ContentValidationError>,
    ) {
        assert_eq!(validate_title(raw), expected);
    }

    #[rstest]
    fn overlong_title_is_rejected() {
        let raw = "t".repeat(TITLE_MAX + 1);
        assert_eq!(
            validate_title(&raw),
            Err(ContentValidationError::TitleTooLong { max: TITLE_MAX })
        );
    }

    #[rstest]
    fn post_bodies_may_be_empty_but_comments_may_not() {
        assert_eq!(validate_post_body(""), Ok(String::new()));
        assert_eq!(
            validate_comment_body("  "),
            Err(ContentValidationError::EmptyBody)
        );
    }
}
