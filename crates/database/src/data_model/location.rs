use async_trait::async_trait;
use locations::database::{LocationRepo, Repo, Result};
use model::{location::Location, WithId};
use sqlx::prelude::FromRow;
use utility::id::Id;

use crate::queries::location::{
    children_of, delete, get, get_all, get_by_location_number, insert, update,
};
use crate::PgDatabaseAutocommit;
use crate::PgDatabaseTransaction;

use super::DatabaseRow;

/// A location. E.g., a building, a floor or a room.
/// Table: locations
#[derive(Debug, Clone, FromRow)]
pub struct LocationRow {
    pub id: i32,
    pub building: Option<String>,
    pub name: Option<String>,
    pub location_number: String,
    pub area: Option<f64>,
    pub parent_id: Option<i32>,
}

impl DatabaseRow for LocationRow {
    type Model = Location;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        Location {
            building: self.building,
            name: self.name,
            location_number: self.location_number,
            area: self.area,
            parent_id: self.parent_id.map(Id::new),
        }
    }
}

// Repo

#[async_trait]
impl Repo<Location> for PgDatabaseAutocommit {
    async fn get(&mut self, id: Id<Location>) -> Result<WithId<Location>> {
        get(&self.pool, id).await
    }

    async fn get_all(&mut self) -> Result<Vec<WithId<Location>>> {
        get_all(&self.pool).await
    }

    async fn insert(&mut self, element: Location) -> Result<WithId<Location>> {
        insert(&self.pool, element).await
    }

    async fn update(&mut self, element: WithId<Location>) -> Result<WithId<Location>> {
        update(&self.pool, element).await
    }

    async fn delete(&mut self, id: Id<Location>) -> Result<()> {
        delete(&self.pool, id).await
    }
}

#[async_trait]
impl<'a> Repo<Location> for PgDatabaseTransaction<'a> {
    async fn get(&mut self, id: Id<Location>) -> Result<WithId<Location>> {
        get(&mut *self.tx, id).await
    }

    async fn get_all(&mut self) -> Result<Vec<WithId<Location>>> {
        get_all(&mut *self.tx).await
    }

    async fn insert(&mut self, element: Location) -> Result<WithId<Location>> {
        insert(&mut *self.tx, element).await
    }

    async fn update(&mut self, element: WithId<Location>) -> Result<WithId<Location>> {
        update(&mut *self.tx, element).await
    }

    async fn delete(&mut self, id: Id<Location>) -> Result<()> {
        delete(&mut *self.tx, id).await
    }
}

// Location Repo

#[async_trait]
impl LocationRepo for PgDatabaseAutocommit {
    async fn location_by_number(
        &mut self,
        location_number: &str,
    ) -> Result<Option<WithId<Location>>> {
        get_by_location_number(&self.pool, location_number).await
    }

    async fn children_of(
        &mut self,
        id: &Id<Location>,
    ) -> Result<Vec<WithId<Location>>> {
        children_of(&self.pool, id).await
    }
}

#[async_trait]
impl<'a> LocationRepo for PgDatabaseTransaction<'a> {
    async fn location_by_number(
        &mut self,
        location_number: &str,
    ) -> Result<Option<WithId<Location>>> {
        get_by_location_number(&mut *self.tx, location_number).await
    }

    async fn children_of(
        &mut self,
        id: &Id<Location>,
    ) -> Result<Vec<WithId<Location>>> {
        children_of(&mut *self.tx, id).await
    }
}
