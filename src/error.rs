//! Error taxonomy shared by the store, the query engine and the catalog.

use std::fmt;

use thiserror::Error;

/// Which table a missing id was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Bird,
    Sighting,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Bird => write!(f, "Bird"),
            Entity::Sighting => write!(f, "Sighting"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },

    #[error("Invalid input: {0}")]
    Validation(String),

    /// A sighting was submitted for a bird id with no matching row.
    #[error("Bird {0} does not exist")]
    UnknownBird(i64),

    #[error("Bird {id} still has {sightings} sighting(s)")]
    BirdInUse { id: i64, sightings: i64 },

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

impl CatalogError {
    pub fn bird_not_found(id: i64) -> Self {
        CatalogError::NotFound {
            entity: Entity::Bird,
            id,
        }
    }

    pub fn sighting_not_found(id: i64) -> Self {
        CatalogError::NotFound {
            entity: Entity::Sighting,
            id,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
