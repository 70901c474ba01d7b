use thiserror::Error;

use crate::model::mpa::MpaId;
use crate::model::user::UserId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("user with id {0} does not exist")]
    UserNotFound(UserId),

    #[error("MPA rating with id {0} does not exist")]
    RatingNotFound(MpaId),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
