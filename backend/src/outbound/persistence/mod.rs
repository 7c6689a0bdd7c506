//! PostgreSQL persistence for the document store.
//!
//! The store is backed by PostgreSQL via Diesel with async support through
//! `diesel-async` and `bb8` connection pooling. Raw SQL stays internal to the
//! adapter; the domain only sees the `DocumentStore` port.
//!
//! # Example
//!
//! ```ignore
//! use forum_backend::outbound::persistence::{DbPool, DieselDocumentStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/forum")).await?;
//! let store = DieselDocumentStore::new(pool);
//! ```

mod diesel_document_store;
pub(crate) mod diesel_helpers;
mod migrations;
mod pool;

pub use diesel_document_store::DieselDocumentStore;
pub use migrations::run_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
