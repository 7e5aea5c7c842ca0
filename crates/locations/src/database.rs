use std::{error, fmt::Debug, result};

use async_trait::async_trait;
use model::{location::Location, WithId};
use serde::Serialize;
use thiserror::Error;
use utility::id::{HasId, Id};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("row not found")]
    NotFound,
    /// A unique constraint rejected the write. Holds the constraint name if
    /// the backend reports one.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    /// A foreign key rejected the write, either because the referenced row
    /// does not exist or because the deleted row is still referenced.
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    #[error(transparent)]
    Other(Box<dyn error::Error + Send + Sync>),
}

pub type Result<T> = result::Result<T, DatabaseError>;

#[async_trait]
pub trait Repo<T: Serialize + HasId + Send>
where
    <T as HasId>::IdType: Debug + Clone + Serialize + Send,
{
    async fn get(&mut self, id: Id<T>) -> Result<WithId<T>>;
    async fn get_all(&mut self) -> Result<Vec<WithId<T>>>;
    /// Stores a new element. The id is assigned by the database.
    async fn insert(&mut self, element: T) -> Result<WithId<T>>;
    /// Overwrites all fields of an existing element.
    async fn update(&mut self, element: WithId<T>) -> Result<WithId<T>>;
    async fn delete(&mut self, id: Id<T>) -> Result<()>;
}

#[async_trait]
pub trait LocationRepo: Repo<Location> {
    async fn location_by_number(
        &mut self,
        location_number: &str,
    ) -> Result<Option<WithId<Location>>>;

    /// Returns all direct children of a location, ordered by id.
    async fn children_of(
        &mut self,
        id: &Id<Location>,
    ) -> Result<Vec<WithId<Location>>>;
}

#[async_trait]
pub trait DatabaseOperations: LocationRepo {
    /// Cheap round trip to check that the backend is reachable.
    async fn health_check(&mut self) -> Result<()>;
}

#[async_trait]
pub trait DatabaseTransaction: DatabaseOperations {
    async fn commit(self) -> Result<()>;
}

pub trait DatabaseAutocommit: DatabaseOperations {}

/// trait to implement a location database.
/// multiple concurrent accesses should be possible by e.g. cloning the database object.
///
/// # WARNING
///
/// Backends may serialize transactions. Do not use `auto()` while holding a
/// transaction of the same database.
#[async_trait]
pub trait Database: Clone + Send + Sync + Sized {
    type Transaction: DatabaseTransaction + Send;
    type Autocommit: DatabaseAutocommit + Send;

    async fn transaction(&self) -> Result<Self::Transaction>;

    fn auto(&self) -> Self::Autocommit;
}
