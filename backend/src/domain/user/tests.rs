//! Tests for usernames, emails and account views.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case("", UserValidationError::EmptyUsername)]
#[case("   ", UserValidationError::EmptyUsername)]
#[case("ab", UserValidationError::UsernameTooShort { min: HANDLE_MIN })]
#[case(
    "abcdefghijklmnopqrstuvwxyz0123456",
    UserValidationError::UsernameTooLong { max: HANDLE_MAX }
)]
#[case("bad name", UserValidationError::UsernameInvalidCharacters)]
#[case("émile", UserValidationError::UsernameInvalidCharacters)]
fn rejects_invalid_usernames(#[case] raw: &str, #[case] expected: UserValidationError) {
    let err = Username::new(raw).expect_err("invalid username must fail");
    assert_eq!(err, expected);
}

#[rstest]
#[case("alice")]
#[case("bob_the-builder")]
#[case("abc")]
fn accepts_valid_usernames(#[case] raw: &str) {
    let name = Username::new(raw).expect("valid username");
    assert_eq!(name.as_ref(), raw);
}

#[rstest]
fn username_deserialisation_validates() {
    assert!(serde_json::from_value::<Username>(json!("x")).is_err());
    let name: Username = serde_json::from_value(json!("carol")).expect("valid");
    assert_eq!(name.to_string(), "carol");
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::InvalidEmail)]
#[case("@example.com", UserValidationError::InvalidEmail)]
#[case("alice@localhost", UserValidationError::InvalidEmail)]
#[case("alice@.com", UserValidationError::InvalidEmail)]
fn rejects_invalid_emails(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Email::new(raw).expect_err("invalid email"), expected);
}

#[rstest]
fn email_is_trimmed() {
    let email = Email::new("  alice@example.com ").expect("valid email");
    assert_eq!(email.as_ref(), "alice@example.com");
}

#[rstest]
fn public_view_omits_password_hash() {
    let account = UserAccount {
        username: Username::new("alice").expect("valid"),
        email: Email::new("alice@example.com").expect("valid"),
        password_hash: "$argon2id$secret".to_owned(),
        created_at: Utc::now(),
        deleted_at: None,
    };
    let view = account.public_view();
    assert_eq!(view.username, account.username);
    assert_eq!(view.created_at, account.created_at);
}

#[rstest]
fn tombstones_are_inactive_and_keep_their_marker() {
    let deleted_at = Utc::now();
    let account = UserAccount {
        username: Username::new("alice").expect("valid"),
        email: Email::new("alice@example.com").expect("valid"),
        password_hash: String::new(),
        created_at: deleted_at,
        deleted_at: Some(deleted_at),
    };
    assert!(!account.is_active());
    let value = serde_json::to_value(&account).expect("serialise");
    assert!(value.get("deleted_at").is_some());
    let back: UserAccount = serde_json::from_value(value).expect("deserialise");
    assert_eq!(back, account);
}
