//! Ownership guard shared by every edit and delete path.
//!
//! Services load the resource first, so a missing resource is reported as
//! `not_found` before the guard runs. The guard then compares the recorded
//! owner with the authenticated caller and denies with `forbidden` before any
//! mutation reaches the store.

use std::fmt;

use serde_json::json;
use tracing::warn;

use super::{Error, Username};

/// Outcome of an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Kinds of owned resources, used in denial messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Account,
    Profile,
    Community,
    Post,
    Comment,
    Vote,
}

impl ResourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Profile => "profile",
            Self::Community => "community",
            Self::Post => "post",
            Self::Comment => "comment",
            Self::Vote => "vote",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored record with a single owning identity.
pub trait OwnedResource {
    const KIND: ResourceKind;

    /// Identity recorded as the owner.
    fn owner(&self) -> &Username;

    /// Identifier used in denial details.
    fn resource_id(&self) -> String;
}

/// Compare the recorded owner with the caller.
///
/// # Examples
/// ```
/// use forum_backend::domain::{Access, Username, authorize};
///
/// let alice = Username::new("alice").unwrap();
/// let bob = Username::new("bob").unwrap();
/// assert_eq!(authorize(&alice, &alice), Access::Allow);
/// assert_eq!(authorize(&alice, &bob), Access::Deny);
/// ```
pub fn authorize(owner: &Username, caller: &Username) -> Access {
    if owner == caller {
        Access::Allow
    } else {
        Access::Deny
    }
}

/// Reject the caller with `forbidden` unless they own the resource.
pub fn ensure_owner<R: OwnedResource>(resource: &R, caller: &Username) -> Result<(), Error> {
    guard(R::KIND, &resource.resource_id(), resource.owner(), caller)
}

/// Ownership check for resources identified only by their owner, such as an
/// account addressed by username or a vote cast on behalf of a voter.
pub fn ensure_identity(
    kind: ResourceKind,
    owner: &Username,
    caller: &Username,
) -> Result<(), Error> {
    guard(kind, owner.as_ref(), owner, caller)
}

fn guard(kind: ResourceKind, id: &str, owner: &Username, caller: &Username) -> Result<(), Error> {
    match authorize(owner, caller) {
        Access::Allow => Ok(()),
        Access::Deny => {
            warn!(
                resource = kind.as_str(),
                resource_id = id,
                caller = caller.as_ref(),
                "ownership check denied mutation"
            );
            Err(Error::forbidden(format!("only the owner may modify this {kind}"))
                .with_details(json!({ "resource": kind.as_str(), "id": id })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    struct Note {
        id: u32,
        owner: Username,
    }

    impl OwnedResource for Note {
        const KIND: ResourceKind = ResourceKind::Post;

        fn owner(&self) -> &Username {
            &self.owner
        }

        fn resource_id(&self) -> String {
            self.id.to_string()
        }
    }

    #[fixture]
    fn alice() -> Username {
        Username::new("alice").expect("valid username")
    }

    #[fixture]
    fn bob() -> Username {
        Username::new("bob").expect("valid username")
    }

    #[rstest]
    fn owner_is_allowed(alice: Username) {
        let note = Note {
            id: 7,
            owner: alice.clone(),
        };
        assert!(ensure_owner(&note, &alice).is_ok());
    }

    #[rstest]
    fn other_identity_is_forbidden(alice: Username, bob: Username) {
        let note = Note { id: 7, owner: alice };
        let err = ensure_owner(&note, &bob).expect_err("non-owner must be denied");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.message(), "only the owner may modify this post");
        let details = err.details().expect("details attached");
        assert_eq!(details["id"], "7");
    }

    #[rstest]
    #[case(ResourceKind::Account)]
    #[case(ResourceKind::Vote)]
    fn identity_checks_use_the_same_rule(
        #[case] kind: ResourceKind,
        alice: Username,
        bob: Username,
    ) {
        assert!(ensure_identity(kind, &alice, &alice).is_ok());
        let err = ensure_identity(kind, &alice, &bob).expect_err("denied");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn comparison_is_case_sensitive(alice: Username) {
        let upper = Username::new("Alice").expect("valid username");
        assert_eq!(authorize(&alice, &upper), Access::Deny);
    }
}
