//! User identity and account model.
//!
//! A [`Username`] is the identity carried by issued tokens and recorded as the
//! owner of posts, comments and communities. Accounts add the contact email
//! and the stored password hash, which never leaves the domain layer.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ownership::{OwnedResource, ResourceKind};

/// Validation errors returned by the user-facing name and email constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUsername,
    UsernameTooShort { min: usize },
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    EmptyEmail,
    InvalidEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, numbers, underscores, or hyphens",
            ),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must contain a local part and a domain"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Minimum allowed length for a handle (usernames and community names).
pub const HANDLE_MIN: usize = 3;
/// Maximum allowed length for a handle (usernames and community names).
pub const HANDLE_MAX: usize = 32;

static HANDLE_RE: OnceLock<Regex> = OnceLock::new();

/// Character class shared by usernames and community names.
pub(crate) fn handle_regex() -> &'static Regex {
    HANDLE_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        let pattern = "^[A-Za-z0-9_-]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("handle regex failed to compile: {error}"))
    })
}

/// Stable user handle; doubles as the authenticated identity.
///
/// # Examples
/// ```
/// use forum_backend::domain::Username;
///
/// let name = Username::new("alice").expect("valid username");
/// assert_eq!(name.as_ref(), "alice");
/// assert!(Username::new("a b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(username.into())
    }

    fn from_owned(username: String) -> Result<Self, UserValidationError> {
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        let length = username.chars().count();
        if length < HANDLE_MIN {
            return Err(UserValidationError::UsernameTooShort { min: HANDLE_MIN });
        }
        if length > HANDLE_MAX {
            return Err(UserValidationError::UsernameTooLong { max: HANDLE_MAX });
        }
        if !handle_regex().is_match(&username) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Contact email captured at sign-up.
///
/// Only a structural check is applied: a non-empty local part, an `@`, and a
/// domain containing a dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`]. Surrounding whitespace is trimmed.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = email.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty() || !domain.contains('.') || domain.starts_with('.') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Stored user account.
///
/// `password_hash` is a PHC string produced by the password hasher port and
/// is skipped when the account is rendered through [`UserAccount::public_view`].
/// A deleted account stays behind as a tombstone with `deleted_at` set, so its
/// username cannot be registered again and inherit the old content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Unique handle and document id.
    #[serde(rename = "id")]
    pub username: Username,
    /// Contact email.
    pub email: Email,
    /// Encoded password hash.
    pub password_hash: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Set once the owner deletes the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Account details safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicAccount {
    pub username: Username,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Strip the password hash.
    pub fn public_view(&self) -> PublicAccount {
        PublicAccount {
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }

    /// Whether the account can still log in and act.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

impl OwnedResource for UserAccount {
    const KIND: ResourceKind = ResourceKind::Account;

    fn owner(&self) -> &Username {
        &self.username
    }

    fn resource_id(&self) -> String {
        self.username.to_string()
    }
}

#[cfg(test)]
mod tests;
