use serde::{Deserialize, Serialize};

pub type MpaId = i32;

/// One Motion Picture Association age-rating tier. Read-only reference
/// data; the five standard tiers are seeded by the schema migrations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MpaRating {
    pub id: MpaId,
    pub name: String,
}
