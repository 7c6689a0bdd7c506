//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure becomes an `invalid_request` error whose details
//! name the offending field and a stable machine-readable code.

use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    CommunityName, CommunityValidationError, ContentValidationError, Error, LoginValidationError,
    ProfileValidationError, SignupValidationError, UserValidationError, Username,
    VoteValidationError, VoteValue,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    EmptyValue,
    TooShort,
    TooLong,
    InvalidCharacters,
    InvalidEmail,
    InvalidUuid,
    InvalidVote,
    Mismatch,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::EmptyValue => "empty_value",
            ErrorCode::TooShort => "too_short",
            ErrorCode::TooLong => "too_long",
            ErrorCode::InvalidCharacters => "invalid_characters",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidVote => "invalid_vote",
            ErrorCode::Mismatch => "mismatch",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) const USERNAME: FieldName = FieldName::new("username");
pub(crate) const EMAIL: FieldName = FieldName::new("email");
pub(crate) const PASSWORD: FieldName = FieldName::new("password");
pub(crate) const NAME: FieldName = FieldName::new("name");
pub(crate) const DESCRIPTION: FieldName = FieldName::new("description");
pub(crate) const TITLE: FieldName = FieldName::new("title");
pub(crate) const BODY: FieldName = FieldName::new("body");
pub(crate) const BIO: FieldName = FieldName::new("bio");
pub(crate) const VALUE: FieldName = FieldName::new("value");
pub(crate) const VOTER_ID: FieldName = FieldName::new("voterId");
pub(crate) const SUBJECT_ID: FieldName = FieldName::new("subjectId");
pub(crate) const COMMUNITY: FieldName = FieldName::new("community");

/// Build an `invalid_request` error carrying field context.
pub(crate) fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    Error::invalid_request(format!("{name} must be a valid UUID")).with_details(json!({
        "field": name,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

fn username_error_code(err: &UserValidationError) -> (FieldName, ErrorCode) {
    match err {
        UserValidationError::EmptyUsername => (USERNAME, ErrorCode::EmptyValue),
        UserValidationError::UsernameTooShort { .. } => (USERNAME, ErrorCode::TooShort),
        UserValidationError::UsernameTooLong { .. } => (USERNAME, ErrorCode::TooLong),
        UserValidationError::UsernameInvalidCharacters => (USERNAME, ErrorCode::InvalidCharacters),
        UserValidationError::EmptyEmail => (EMAIL, ErrorCode::EmptyValue),
        UserValidationError::InvalidEmail => (EMAIL, ErrorCode::InvalidEmail),
    }
}

pub(crate) fn map_user_validation_error(err: UserValidationError) -> Error {
    let (field, code) = username_error_code(&err);
    field_error(field, code, err.to_string())
}

/// Same as [`map_user_validation_error`] but reported against another field,
/// for usernames supplied under a different name such as `voterId`.
pub(crate) fn map_username_field_error(err: UserValidationError, field: FieldName) -> Error {
    let (_, code) = username_error_code(&err);
    field_error(field, code, err.to_string())
}

pub(crate) fn map_signup_validation_error(err: SignupValidationError) -> Error {
    match err {
        SignupValidationError::User(inner) => map_user_validation_error(inner),
        SignupValidationError::PasswordTooShort { .. } => {
            field_error(PASSWORD, ErrorCode::TooShort, err.to_string())
        }
    }
}

pub(crate) fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyUsername => USERNAME,
        LoginValidationError::EmptyPassword => PASSWORD,
    };
    field_error(field, ErrorCode::EmptyValue, err.to_string())
}

pub(crate) fn map_community_validation_error(err: CommunityValidationError) -> Error {
    let (field, code) = match err {
        CommunityValidationError::EmptyName => (NAME, ErrorCode::EmptyValue),
        CommunityValidationError::NameTooShort { .. } => (NAME, ErrorCode::TooShort),
        CommunityValidationError::NameTooLong { .. } => (NAME, ErrorCode::TooLong),
        CommunityValidationError::NameInvalidCharacters => (NAME, ErrorCode::InvalidCharacters),
        CommunityValidationError::DescriptionTooLong { .. } => (DESCRIPTION, ErrorCode::TooLong),
    };
    field_error(field, code, err.to_string())
}

pub(crate) fn map_content_validation_error(err: ContentValidationError) -> Error {
    let (field, code) = match err {
        ContentValidationError::EmptyTitle => (TITLE, ErrorCode::EmptyValue),
        ContentValidationError::TitleTooLong { .. } => (TITLE, ErrorCode::TooLong),
        ContentValidationError::EmptyBody => (BODY, ErrorCode::EmptyValue),
        ContentValidationError::BodyTooLong { .. } => (BODY, ErrorCode::TooLong),
    };
    field_error(field, code, err.to_string())
}

pub(crate) fn map_profile_validation_error(err: ProfileValidationError) -> Error {
    match err {
        ProfileValidationError::BioTooLong { .. } => {
            field_error(BIO, ErrorCode::TooLong, err.to_string())
        }
    }
}

/// Parse a username taken from the request path.
pub(crate) fn parse_username(raw: String) -> Result<Username, Error> {
    Username::new(raw).map_err(map_user_validation_error)
}

/// Parse a community name taken from the request path or query.
pub(crate) fn parse_community_name(raw: String, field: FieldName) -> Result<CommunityName, Error> {
    CommunityName::new(raw).map_err(|err| {
        let code = match err {
            CommunityValidationError::EmptyName => ErrorCode::EmptyValue,
            CommunityValidationError::NameTooShort { .. } => ErrorCode::TooShort,
            CommunityValidationError::NameTooLong { .. }
            | CommunityValidationError::DescriptionTooLong { .. } => ErrorCode::TooLong,
            CommunityValidationError::NameInvalidCharacters => ErrorCode::InvalidCharacters,
        };
        field_error(field, code, err.to_string())
    })
}

pub(crate) fn parse_vote_value(raw: i64) -> Result<VoteValue, Error> {
    VoteValue::try_from(raw).map_err(|err: VoteValidationError| {
        field_error(VALUE, ErrorCode::InvalidVote, err.to_string())
    })
}

pub(crate) fn mismatch_error(field: FieldName, message: impl Into<String>) -> Error {
    field_error(field, ErrorCode::Mismatch, message)
}
