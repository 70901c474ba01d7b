use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier assigned by the storage backend, as a monotonic sequence
/// starting at 1. Never reused within one database.
pub type UserId = i64;

/// A user identity together with its outgoing friendship edges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub login: String,
    /// Display name. Falls back to `login` when a request leaves it blank.
    pub name: String,
    pub birthday: NaiveDate,
    /// Identifiers of every user this user lists as a friend, ascending.
    /// Derived from the friendship table on load; never written directly.
    #[serde(default)]
    pub friends: BTreeSet<UserId>,
}

/// Scalar user fields as accepted from a caller. Used for both insert and
/// update: the id comes from the store (or the request path) and the
/// friends set is always derived.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: NaiveDate,
}
