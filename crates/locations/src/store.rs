use model::{
    location::{
        Location, LocationPatch, LocationWithChildren, LocationWithRelations,
        NewLocation,
    },
    tree::LocationTree,
    Patch, WithId,
};
use utility::{id::Id, let_also::LetAlso};

use crate::{
    database::{
        Database, DatabaseError, DatabaseOperations, DatabaseTransaction,
        LocationRepo, Repo,
    },
    RequestError, RequestResult,
};

/// Owns the location tree. All state lives in the database, so clones of a
/// store can serve requests concurrently.
#[derive(Debug, Clone)]
pub struct LocationStore<D>
where
    D: Database + Send + Sync + Sized + 'static,
{
    pub database: D,
}

impl<D> LocationStore<D>
where
    D: Database,
{
    pub fn new(database: D) -> Self {
        Self { database }
    }

    pub async fn health_check(&self) -> RequestResult<()> {
        Ok(self.database.auto().health_check().await?)
    }

    /// Stores a new location.
    ///
    /// Fails with `Conflict` if the location number is already taken. The
    /// check and the insert share a transaction, and the unique index of the
    /// database backs it against concurrent inserts.
    pub async fn create(&self, input: NewLocation) -> RequestResult<WithId<Location>> {
        log::info!("creating location: {:?}", input);
        let mut tx = self.database.transaction().await?;

        if tx
            .location_by_number(&input.location_number)
            .await?
            .is_some()
        {
            log::warn!(
                "location number {} already exists.",
                input.location_number
            );
            return Err(RequestError::location_number_conflict());
        }

        let location = tx.insert(input.into()).await?;
        tx.commit().await?;

        log::info!("created location with id {}", location.id);
        Ok(location)
    }

    /// Returns every location with its parent and children resolved.
    pub async fn find_all(&self) -> RequestResult<Vec<LocationWithRelations>> {
        log::info!("finding all locations");
        self.database
            .auto()
            .get_all()
            .await?
            .let_owned(LocationTree::new)
            .with_relations()
            .let_owned(Ok)
    }

    /// Returns a single location with its children resolved.
    pub async fn find_one(
        &self,
        id: Id<Location>,
    ) -> RequestResult<LocationWithChildren> {
        log::info!("finding location with id {}", id);
        let mut db = self.database.auto();
        let location = db.get(id).await.map_err(|why| not_found(why, &id))?;
        let children = db.children_of(&id).await?;
        Ok(LocationWithChildren { location, children })
    }

    /// Merges the fields present in `patch` onto the stored location and
    /// writes back the complete merged record. An empty patch writes nothing
    /// and returns the stored location.
    pub async fn update(
        &self,
        id: Id<Location>,
        patch: LocationPatch,
    ) -> RequestResult<WithId<Location>> {
        log::info!("updating location with id {}", id);
        let mut tx = self.database.transaction().await?;
        let existing = tx.get(id).await.map_err(|why| not_found(why, &id))?;

        if patch.is_empty() {
            log::info!("nothing to update for location {}", id);
            return Ok(existing);
        }

        if let Some(location_number) = &patch.location_number {
            let conflicting = tx.location_by_number(location_number).await?;
            if conflicting.is_some_and(|other| other.id != id) {
                log::warn!(
                    "location number {} conflicts with an existing location.",
                    location_number
                );
                return Err(RequestError::location_number_conflict());
            }
        }

        let merged = existing.map(|location| patch.apply(location));
        if merged.content.parent_id == Some(id) {
            log::warn!("location {} can not be its own parent.", id);
            return Err(RequestError::InvalidParent);
        }

        let updated = tx.update(merged).await?;
        tx.commit().await?;

        log::info!("updated location with id {}", id);
        Ok(updated)
    }

    /// Deletes a location. Locations which still have children are kept and
    /// `HasChildren` is returned instead.
    pub async fn remove(&self, id: Id<Location>) -> RequestResult<()> {
        log::info!("removing location with id {}", id);
        let mut db = self.database.auto();
        let location = db.get(id).await.map_err(|why| not_found(why, &id))?;
        db.delete(location.id).await.map_err(|why| match why {
            DatabaseError::ForeignKeyViolation(_) => {
                log::warn!("location {} still has children.", id);
                RequestError::HasChildren
            }
            why => why.into(),
        })?;
        log::info!("removed location with id {}", id);
        Ok(())
    }
}

fn not_found(why: DatabaseError, id: &Id<Location>) -> RequestError {
    if let DatabaseError::NotFound = why {
        log::error!("location with id {} not found", id);
    }
    why.into()
}
