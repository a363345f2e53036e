//! Domain models that mirror the SQLite schema. These stay light-weight data
//! holders; the store fills them and the projection layer turns them into
//! transfer objects.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
/// A bird species record. Sightings point at it by `id`.
pub struct Bird {
    /// Primary key, assigned by SQLite on insert and never changed afterwards.
    pub id: i64,
    pub name: String,
    pub color: String,
    /// Weight in kilograms.
    pub weight: f64,
    /// Height in centimeters.
    pub height: f64,
}

impl fmt::Display for Bird {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.color)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A single observation of a bird. The bird is referenced by id only; the
/// row does not own the bird's lifecycle.
pub struct Sighting {
    pub id: i64,
    pub bird_id: i64,
    pub location: String,
    pub date_time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
/// A sighting joined with the bird it references. Store scans that feed the
/// projection layer return this shape so no further lookups are needed.
pub struct SightingRecord {
    pub sighting: Sighting,
    pub bird: Bird,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Editable bird fields, used for both inserts and updates.
pub struct NewBird {
    pub name: String,
    pub color: String,
    pub weight: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload for creating a sighting. `bird_id` must name an existing bird.
pub struct NewSighting {
    pub bird_id: i64,
    pub location: String,
    pub date_time: NaiveDateTime,
}
