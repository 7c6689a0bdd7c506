//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers parse and validate transport input, call a driving port from
//! [`state::HttpState`] and render the result. Every failure leaves as a
//! domain [`crate::domain::Error`] so clients see one error envelope.

pub mod auth;
pub mod comments;
pub mod communities;
pub mod error;
pub mod health;
pub mod posts;
pub mod profiles;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;
pub mod votes;

use actix_web::web;

use crate::domain::Error;

pub use error::ApiResult;

fn reject(err: impl Into<actix_web::Error>) -> actix_web::Error {
    Error::from(err.into()).into()
}

/// JSON extractor configuration rendering payload errors in the domain
/// error envelope instead of actix's plain-text body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| reject(err))
}

/// Query-string extractor configuration with the same error envelope.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| reject(err))
}
