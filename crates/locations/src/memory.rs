//! A database kept entirely in process memory.
//!
//! Enforces the same constraints as the PostgreSQL schema (unique location
//! numbers, parent ids referencing existing locations, no deletion of
//! referenced locations), so the store behaves the same on both backends.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use model::{location::Location, WithId};
use tokio::sync::{Mutex, OwnedMutexGuard};
use utility::id::Id;

use crate::database::{
    Database, DatabaseAutocommit, DatabaseError, DatabaseOperations,
    DatabaseTransaction, LocationRepo, Repo, Result,
};

const UNIQUE_LOCATION_NUMBER: &str = "locations_location_number_key";
const PARENT_FOREIGN_KEY: &str = "locations_parent_id_fkey";

#[derive(Debug, Clone, Default)]
struct MemoryState {
    last_id: i32,
    rows: BTreeMap<i32, Location>,
}

impl MemoryState {
    fn row(id: i32, location: &Location) -> WithId<Location> {
        WithId::new(Id::new(id), location.clone())
    }

    fn get(&self, id: &Id<Location>) -> Result<WithId<Location>> {
        self.rows
            .get(&id.raw())
            .map(|location| Self::row(id.raw(), location))
            .ok_or(DatabaseError::NotFound)
    }

    fn get_all(&self) -> Vec<WithId<Location>> {
        self.rows
            .iter()
            .map(|(id, location)| Self::row(*id, location))
            .collect()
    }

    fn by_number(&self, location_number: &str) -> Option<WithId<Location>> {
        self.rows
            .iter()
            .find(|(_, location)| location.location_number == location_number)
            .map(|(id, location)| Self::row(*id, location))
    }

    fn children_of(&self, id: &Id<Location>) -> Vec<WithId<Location>> {
        self.rows
            .iter()
            .filter(|(_, location)| location.parent_id == Some(*id))
            .map(|(id, location)| Self::row(*id, location))
            .collect()
    }

    fn check_constraints(&self, id: Option<i32>, location: &Location) -> Result<()> {
        if let Some(existing) = self.by_number(&location.location_number) {
            if Some(existing.id.raw()) != id {
                return Err(DatabaseError::UniqueViolation(
                    UNIQUE_LOCATION_NUMBER.to_owned(),
                ));
            }
        }
        if let Some(parent_id) = location.parent_id {
            // a row may reference itself, just like in postgres.
            let references_self = Some(parent_id.raw()) == id;
            if !references_self && !self.rows.contains_key(&parent_id.raw()) {
                return Err(DatabaseError::ForeignKeyViolation(
                    PARENT_FOREIGN_KEY.to_owned(),
                ));
            }
        }
        Ok(())
    }

    fn insert(&mut self, location: Location) -> Result<WithId<Location>> {
        self.check_constraints(None, &location)?;
        self.last_id += 1;
        let id = self.last_id;
        self.rows.insert(id, location.clone());
        Ok(WithId::new(Id::new(id), location))
    }

    fn update(&mut self, location: WithId<Location>) -> Result<WithId<Location>> {
        let id = location.id.raw();
        if !self.rows.contains_key(&id) {
            return Err(DatabaseError::NotFound);
        }
        self.check_constraints(Some(id), &location.content)?;
        self.rows.insert(id, location.content.clone());
        Ok(location)
    }

    fn delete(&mut self, id: &Id<Location>) -> Result<()> {
        if !self.rows.contains_key(&id.raw()) {
            return Err(DatabaseError::NotFound);
        }
        let referenced = self
            .rows
            .iter()
            .any(|(child, location)| *child != id.raw() && location.parent_id == Some(*id));
        if referenced {
            return Err(DatabaseError::ForeignKeyViolation(
                PARENT_FOREIGN_KEY.to_owned(),
            ));
        }
        self.rows.remove(&id.raw());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct MemoryAutocommit {
    state: Arc<Mutex<MemoryState>>,
}

impl DatabaseAutocommit for MemoryAutocommit {}

/// Holds the database lock for its whole lifetime. Writes go to a staged copy
/// which replaces the shared state on commit and is dropped otherwise.
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl DatabaseTransaction for MemoryTransaction {
    async fn commit(self) -> Result<()> {
        let MemoryTransaction { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    type Transaction = MemoryTransaction;
    type Autocommit = MemoryAutocommit;

    async fn transaction(&self) -> Result<Self::Transaction> {
        let guard = self.state.clone().lock_owned().await;
        Ok(MemoryTransaction {
            staged: guard.clone(),
            guard,
        })
    }

    fn auto(&self) -> Self::Autocommit {
        MemoryAutocommit {
            state: self.state.clone(),
        }
    }
}

#[async_trait]
impl Repo<Location> for MemoryAutocommit {
    async fn get(&mut self, id: Id<Location>) -> Result<WithId<Location>> {
        self.state.lock().await.get(&id)
    }

    async fn get_all(&mut self) -> Result<Vec<WithId<Location>>> {
        Ok(self.state.lock().await.get_all())
    }

    async fn insert(&mut self, element: Location) -> Result<WithId<Location>> {
        self.state.lock().await.insert(element)
    }

    async fn update(&mut self, element: WithId<Location>) -> Result<WithId<Location>> {
        self.state.lock().await.update(element)
    }

    async fn delete(&mut self, id: Id<Location>) -> Result<()> {
        self.state.lock().await.delete(&id)
    }
}

#[async_trait]
impl LocationRepo for MemoryAutocommit {
    async fn location_by_number(
        &mut self,
        location_number: &str,
    ) -> Result<Option<WithId<Location>>> {
        Ok(self.state.lock().await.by_number(location_number))
    }

    async fn children_of(
        &mut self,
        id: &Id<Location>,
    ) -> Result<Vec<WithId<Location>>> {
        Ok(self.state.lock().await.children_of(id))
    }
}

#[async_trait]
impl DatabaseOperations for MemoryAutocommit {
    async fn health_check(&mut self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl Repo<Location> for MemoryTransaction {
    async fn get(&mut self, id: Id<Location>) -> Result<WithId<Location>> {
        self.staged.get(&id)
    }

    async fn get_all(&mut self) -> Result<Vec<WithId<Location>>> {
        Ok(self.staged.get_all())
    }

    async fn insert(&mut self, element: Location) -> Result<WithId<Location>> {
        self.staged.insert(element)
    }

    async fn update(&mut self, element: WithId<Location>) -> Result<WithId<Location>> {
        self.staged.update(element)
    }

    async fn delete(&mut self, id: Id<Location>) -> Result<()> {
        self.staged.delete(&id)
    }
}

#[async_trait]
impl LocationRepo for MemoryTransaction {
    async fn location_by_number(
        &mut self,
        location_number: &str,
    ) -> Result<Option<WithId<Location>>> {
        Ok(self.staged.by_number(location_number))
    }

    async fn children_of(
        &mut self,
        id: &Id<Location>,
    ) -> Result<Vec<WithId<Location>>> {
        Ok(self.staged.children_of(id))
    }
}

#[async_trait]
impl DatabaseOperations for MemoryTransaction {
    async fn health_check(&mut self) -> Result<()> {
        Ok(())
    }
}
