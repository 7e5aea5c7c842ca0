use std::error::Error;

use thiserror::Error;

pub mod database;
pub mod memory;
pub mod store;

pub const LOCATION_NUMBER_NOT_UNIQUE: &str = "Location number must be unique.";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("the requested location does not exist")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("the parent location does not exist")]
    InvalidParent,
    #[error("the location still has child locations")]
    HasChildren,
    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}

impl RequestError {
    pub(crate) fn location_number_conflict() -> Self {
        Self::Conflict(LOCATION_NUMBER_NOT_UNIQUE.to_owned())
    }
}

impl From<database::DatabaseError> for RequestError {
    fn from(value: database::DatabaseError) -> Self {
        match value {
            database::DatabaseError::NotFound => Self::NotFound,
            database::DatabaseError::UniqueViolation(_) => {
                Self::location_number_conflict()
            }
            database::DatabaseError::ForeignKeyViolation(_) => Self::InvalidParent,
            database::DatabaseError::Other(why) => Self::Other(why),
        }
    }
}

pub type RequestResult<O> = Result<O, RequestError>;
