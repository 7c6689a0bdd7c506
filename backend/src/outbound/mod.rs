//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL document store using Diesel
//! - **memory_store**: in-process document store for development and tests
//! - **token**: HS256 bearer tokens
//! - **password**: Argon2 password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory_store;
pub mod password;
pub mod persistence;
pub mod token;
