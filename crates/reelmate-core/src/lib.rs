//! Core domain model, storage abstraction, and service layer for Reelmate,
//! a social film-catalog backend.
//!
//! The interesting part lives in [`service::friends`]: directed friendship
//! edges between user identities, guarded by an existence-validation
//! contract and queried with a set-intersection (mutual friends) operation.
//! Everything else is the plumbing that subsystem depends on: user identity
//! CRUD, the MPA rating reference catalog, and a pluggable
//! [`storage::StorageBackend`].

pub mod error;
pub mod model;
pub mod service;
pub mod storage;
