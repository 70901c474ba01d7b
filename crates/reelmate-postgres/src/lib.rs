//! PostgreSQL storage backend for Reelmate.
//!
//! Implements `reelmate_core::storage::StorageBackend` over a `PgPool`,
//! with the same schema shape and semantics as the embedded SQLite backend.

pub mod migrations;
pub mod storage;

pub use storage::PgStorage;
