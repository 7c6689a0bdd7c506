//! Driving port for account registration, login and removal.
//!
//! Handlers call this port with validated payloads; password hashing and
//! token signing stay behind their own driven ports.

use async_trait::async_trait;

use crate::domain::{Error, IssuedToken, LoginCredentials, PublicAccount, SignupDetails, Username};

/// Successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    pub username: Username,
    pub token: IssuedToken,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Register an account and its profile. A taken username is a conflict.
    async fn sign_up(&self, details: SignupDetails) -> Result<PublicAccount, Error>;

    /// Check credentials and issue a token. Unknown users and wrong passwords
    /// fail identically.
    async fn log_in(&self, credentials: LoginCredentials) -> Result<LoginSession, Error>;

    /// Owner-only account removal. The profile goes; the account remains as
    /// a tombstone reserving the username.
    async fn delete_account(&self, username: &Username, caller: &Username) -> Result<(), Error>;

    /// Confirm a token subject still names a live account. Missing and
    /// deleted accounts are `unauthorized`.
    async fn ensure_active(&self, username: &Username) -> Result<(), Error>;
}
