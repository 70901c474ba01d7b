use crate::error::{Error, Result};
use crate::model::mpa::{MpaId, MpaRating};
use crate::service::ReelmateEngine;

/// Rating-catalog twin of `users::ensure_exists`: the same validation
/// contract applied to a different entity kind.
pub(crate) async fn ensure_exists(engine: &ReelmateEngine, id: MpaId) -> Result<()> {
    if !engine.storage.mpa_rating_exists(id).await? {
        tracing::debug!(rating_id = id, "MPA rating lookup failed validation");
        return Err(Error::RatingNotFound(id));
    }
    Ok(())
}

/// All rating tiers in ascending identifier order.
pub async fn list(engine: &ReelmateEngine) -> Result<Vec<MpaRating>> {
    engine.storage.list_mpa_ratings().await
}

pub async fn get(engine: &ReelmateEngine, id: MpaId) -> Result<MpaRating> {
    ensure_exists(engine, id).await?;
    engine
        .storage
        .get_mpa_rating(id)
        .await?
        .ok_or(Error::RatingNotFound(id))
}
