//! Request middleware.
//!
//! Purpose: define middleware components for request lifecycle concerns such
//! as trace propagation and the per-request time budget.

pub mod timeout;
pub mod trace;

pub use timeout::RequestTimeout;
pub use trace::Trace;
