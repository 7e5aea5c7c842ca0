use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utility::id::{HasId, Id};

use crate::{ExampleData, Patch, WithId};

/// Smallest area a location may have, in square meters.
pub const MIN_AREA: f64 = 1.0;

/// A physical location, e.g. a building, a floor or a single room.
/// Locations form a tree through `parent_id`.
/// Table: locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub building: Option<String>,
    pub name: Option<String>,
    /// Business key. Unique across all locations.
    pub location_number: String,
    /// Area in square meters.
    pub area: Option<f64>,
    pub parent_id: Option<Id<Location>>,
}

impl HasId for Location {
    type IdType = i32;
}

impl ExampleData for Location {
    fn example_data() -> Self {
        Self {
            building: Some("A".to_owned()),
            name: Some("Headquarters".to_owned()),
            location_number: "HQ-001".to_owned(),
            area: Some(1000.0),
            parent_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("the area must be at least {min}, got {0}", min = MIN_AREA)]
    AreaTooSmall(f64),
    #[error("the area must be a finite number")]
    AreaNotFinite,
    #[error("the location number must not be empty")]
    EmptyLocationNumber,
}

fn validate_area(area: Option<f64>) -> Result<(), ValidationError> {
    match area {
        Some(area) if !area.is_finite() => Err(ValidationError::AreaNotFinite),
        Some(area) if area < MIN_AREA => Err(ValidationError::AreaTooSmall(area)),
        _ => Ok(()),
    }
}

fn validate_location_number(number: Option<&str>) -> Result<(), ValidationError> {
    match number {
        Some(number) if number.trim().is_empty() => {
            Err(ValidationError::EmptyLocationNumber)
        }
        _ => Ok(()),
    }
}

/// Input for creating a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewLocation {
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub location_number: String,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub parent_id: Option<Id<Location>>,
}

impl NewLocation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_location_number(Some(&self.location_number))?;
        validate_area(self.area)
    }
}

impl From<NewLocation> for Location {
    fn from(value: NewLocation) -> Self {
        Self {
            building: value.building,
            name: value.name,
            location_number: value.location_number,
            area: value.area,
            parent_id: value.parent_id,
        }
    }
}

impl ExampleData for NewLocation {
    fn example_data() -> Self {
        let location = Location::example_data();
        Self {
            building: location.building,
            name: location.name,
            location_number: location.location_number,
            area: location.area,
            parent_id: location.parent_id,
        }
    }
}

/// Partial update of a location.
///
/// Nullable fields are tri-state: `None` leaves the stored value alone,
/// `Some(None)` clears it and `Some(Some(_))` replaces it. A `null`
/// location number counts as absent, since the business key can not be
/// cleared.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LocationPatch {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schemars(with = "Option<String>")]
    pub building: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schemars(with = "Option<String>")]
    pub name: Option<Option<String>>,

    #[serde(default)]
    pub location_number: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schemars(with = "Option<f64>")]
    pub area: Option<Option<f64>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schemars(with = "Option<i32>")]
    pub parent_id: Option<Option<Id<Location>>>,
}

impl LocationPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_location_number(self.location_number.as_deref())?;
        validate_area(self.area.flatten())
    }
}

impl Patch<Location> for LocationPatch {
    fn apply(self, mut target: Location) -> Location {
        if let Some(building) = self.building {
            target.building = building;
        }
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(location_number) = self.location_number {
            target.location_number = location_number;
        }
        if let Some(area) = self.area {
            target.area = area;
        }
        if let Some(parent_id) = self.parent_id {
            target.parent_id = parent_id;
        }
        target
    }

    fn is_empty(&self) -> bool {
        self.building.is_none()
            && self.name.is_none()
            && self.location_number.is_none()
            && self.area.is_none()
            && self.parent_id.is_none()
    }
}

/// A location with both of its relations resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationWithRelations {
    #[serde(flatten)]
    pub location: WithId<Location>,
    pub parent: Option<WithId<Location>>,
    pub children: Vec<WithId<Location>>,
}

/// A location with its children resolved. The parent is only referenced by
/// `parentId`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationWithChildren {
    #[serde(flatten)]
    pub location: WithId<Location>,
    pub children: Vec<WithId<Location>>,
}
