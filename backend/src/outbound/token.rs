//! HS256 JSON Web Token adapter for the token service port.
//!
//! Tokens carry the username in `sub` plus `iat`/`exp`. Expiry is checked
//! against the injected clock rather than the system time so tests can move
//! time forward.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{TokenService, TokenServiceError};
use crate::domain::{IssuedToken, Username};

/// Shortest secret accepted for HMAC signing, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest token lifetime accepted, in hours (one year).
pub const MAX_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Raised when the token service cannot be configured as requested.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenConfigError {
    #[error("token secret must be at least {min} bytes, got {actual}")]
    WeakSecret { min: usize, actual: usize },
    #[error("token lifetime must be between 1 hour and {max_hours} hours, got {ttl}")]
    InvalidTtl { ttl: Duration, max_hours: i64 },
}

/// Signs and verifies identity tokens with a shared secret.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Build a service from a secret of at least [`MIN_SECRET_LEN`] bytes and
    /// a lifetime between one hour and [`MAX_TTL_HOURS`].
    pub fn new(
        secret: Zeroizing<Vec<u8>>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenConfigError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenConfigError::WeakSecret {
                min: MIN_SECRET_LEN,
                actual: secret.len(),
            });
        }
        if ttl < Duration::hours(1) || ttl > Duration::hours(MAX_TTL_HOURS) {
            return Err(TokenConfigError::InvalidTtl {
                ttl,
                max_hours: MAX_TTL_HOURS,
            });
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(&secret),
            decoding: DecodingKey::from_secret(&secret),
            ttl,
            clock,
        })
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);
        validation
    }

    fn timestamp(seconds: i64) -> Result<DateTime<Utc>, TokenServiceError> {
        DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| TokenServiceError::issue("expiry out of range"))
    }
}

#[async_trait]
impl TokenService for JwtTokenService {
    async fn issue(&self, identity: &Username) -> Result<IssuedToken, TokenServiceError> {
        let now = self.clock.utc();
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenServiceError::issue("token expiry out of range"))?
            .timestamp();
        let claims = Claims {
            sub: identity.to_string(),
            iat: now.timestamp(),
            exp,
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenServiceError::issue(err.to_string()))?;
        Ok(IssuedToken {
            token,
            expires_at: Self::timestamp(exp)?,
        })
    }

    async fn verify(&self, token: &str) -> Result<Username, TokenServiceError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Self::validation())
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenServiceError::expired(),
                _ => TokenServiceError::invalid(err.to_string()),
            })?;
        if data.claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenServiceError::expired());
        }
        Username::new(data.claims.sub)
            .map_err(|err| TokenServiceError::invalid(format!("subject: {err}")))
    }
}
