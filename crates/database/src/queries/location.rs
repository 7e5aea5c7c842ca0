use locations::database::{DatabaseError, Result};
use model::{location::Location, WithId};
use sqlx::{Executor, Postgres};
use utility::{
    id::{Id, IdWrapper},
    let_also::LetAlso,
};

use crate::data_model::{location::LocationRow, with_id, with_ids};

use super::convert_error;

// Repo

pub async fn get<'c, E>(executor: E, id: Id<Location>) -> Result<WithId<Location>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, building, name, location_number, area, parent_id
        FROM locations
        WHERE id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: LocationRow| with_id(row))
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Location>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, building, name, location_number, area, parent_id
        FROM locations
        ORDER BY id ASC;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|rows: Vec<LocationRow>| Ok(with_ids(rows)))
}

pub async fn insert<'c, E>(executor: E, location: Location) -> Result<WithId<Location>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        INSERT INTO locations(
            building,
            name,
            location_number,
            area,
            parent_id
        )
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, building, name, location_number, area, parent_id;
        ",
    )
    .bind(&location.building)
    .bind(&location.name)
    .bind(&location.location_number)
    .bind(location.area)
    .bind(location.parent_id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: LocationRow| with_id(row))
}

pub async fn update<'c, E>(
    executor: E,
    location: WithId<Location>,
) -> Result<WithId<Location>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        UPDATE locations
        SET building = $1,
            name = $2,
            location_number = $3,
            area = $4,
            parent_id = $5
        WHERE id = $6
        RETURNING id, building, name, location_number, area, parent_id;
        ",
    )
    .bind(&location.content.building)
    .bind(&location.content.name)
    .bind(&location.content.location_number)
    .bind(location.content.area)
    .bind(location.content.parent_id.raw())
    .bind(location.id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: LocationRow| with_id(row))
}

pub async fn delete<'c, E>(executor: E, id: Id<Location>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM locations WHERE id = $1;")
        .bind(id.raw())
        .execute(executor)
        .await
        .map_err(convert_error)?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound);
    }
    Ok(())
}

// Location Repo

pub async fn get_by_location_number<'c, E>(
    executor: E,
    location_number: &str,
) -> Result<Option<WithId<Location>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, building, name, location_number, area, parent_id
        FROM locations
        WHERE location_number = $1;
        ",
    )
    .bind(location_number)
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?
    .map(|row: LocationRow| with_id(row))
    .let_owned(Ok)
}

pub async fn children_of<'c, E>(
    executor: E,
    id: &Id<Location>,
) -> Result<Vec<WithId<Location>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, building, name, location_number, area, parent_id
        FROM locations
        WHERE parent_id = $1
        ORDER BY id ASC;
        ",
    )
    .bind(id.raw())
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|rows: Vec<LocationRow>| Ok(with_ids(rows)))
}

// Operations

pub async fn ping<'c, E>(executor: E) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query("SELECT 1;")
        .execute(executor)
        .await
        .map_err(convert_error)
        .map(|_| ())
}
