//! Port for issuing and verifying signed identity tokens.
//!
//! Inbound adapters verify the bearer token before any handler logic runs, so
//! an invalid or expired token never reaches the ownership guard.

use async_trait::async_trait;

use crate::domain::{IssuedToken, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token service adapters.
    pub enum TokenServiceError {
        /// The token signature, structure or claims are not acceptable.
        Invalid { message: String } => "token is invalid: {message}",
        /// The token was valid but its expiry has passed.
        Expired => "token has expired",
        /// The token could not be produced.
        Issue { message: String } => "token could not be issued: {message}",
    }
}

/// Issues tokens carrying an identity claim and an expiry, and verifies them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Produce a signed token for `identity`.
    async fn issue(&self, identity: &Username) -> Result<IssuedToken, TokenServiceError>;

    /// Check signature and expiry, returning the identity the token names.
    async fn verify(&self, token: &str) -> Result<Username, TokenServiceError>;
}
