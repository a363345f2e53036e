//! Transfer objects and the projection from stored entities into them.
//!
//! Projection is pure: a [`SightingRecord`] already carries its joined bird,
//! so flattening it into a [`SightingDto`] never goes back to the store.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{Bird, SightingRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirdDto {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub weight: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SightingDto {
    pub id: i64,
    /// Full copy of the referenced bird rather than just its id.
    pub bird: BirdDto,
    pub location: String,
    pub date_time: NaiveDateTime,
}

impl BirdDto {
    /// Field-for-field copy; an absent bird projects to nothing.
    pub fn project(bird: Option<&Bird>) -> Option<Self> {
        bird.map(Self::from)
    }
}

impl From<&Bird> for BirdDto {
    fn from(bird: &Bird) -> Self {
        Self {
            id: bird.id,
            name: bird.name.clone(),
            color: bird.color.clone(),
            weight: bird.weight,
            height: bird.height,
        }
    }
}

impl From<Bird> for BirdDto {
    fn from(bird: Bird) -> Self {
        Self {
            id: bird.id,
            name: bird.name,
            color: bird.color,
            weight: bird.weight,
            height: bird.height,
        }
    }
}

impl SightingDto {
    pub fn project(record: Option<&SightingRecord>) -> Option<Self> {
        record.map(Self::from)
    }
}

impl From<&SightingRecord> for SightingDto {
    fn from(record: &SightingRecord) -> Self {
        Self {
            id: record.sighting.id,
            bird: BirdDto::from(&record.bird),
            location: record.sighting.location.clone(),
            date_time: record.sighting.date_time,
        }
    }
}

impl From<SightingRecord> for SightingDto {
    fn from(record: SightingRecord) -> Self {
        Self {
            id: record.sighting.id,
            bird: record.bird.into(),
            location: record.sighting.location,
            date_time: record.sighting.date_time,
        }
    }
}
