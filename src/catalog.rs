//! Service boundary over the store. Every operation returns a typed outcome:
//! a value, `CatalogError::NotFound`, or another `CatalogError` carrying the
//! reason, so callers branch on variants instead of messages.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use chrono::NaiveDateTime;
use log::info;
use rusqlite::{params, Connection};

use crate::db;
use crate::dto::{BirdDto, SightingDto};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{NewBird, NewSighting};
use crate::query::{self, BirdQuery, SightingQuery};

/// Owns the single SQLite connection. SQLite serializes writers anyway, so a
/// plain mutex is all the coordination needed.
pub struct Catalog {
    conn: Mutex<Connection>,
}

impl Catalog {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Open (creating if needed) the database at `path`. The special path
    /// `:memory:` gives a throwaway store.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = if path.as_os_str() == ":memory:" {
            db::open_in_memory()?
        } else {
            db::ensure_schema(path)?
        };
        Ok(Self::new(conn))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(db::open_in_memory()?))
    }

    fn conn(&self) -> CatalogResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CatalogError::Poisoned)
    }

    pub fn seed_if_empty(&self, now: NaiveDateTime) -> CatalogResult<bool> {
        db::seed_if_empty(&*self.conn()?, now)
    }

    /// Cheap round trip used by the health endpoint.
    pub fn ping(&self) -> CatalogResult<()> {
        self.conn()?
            .query_row("SELECT 1", params![], |_| Ok(()))?;
        Ok(())
    }

    pub fn create_bird(&self, bird: &NewBird) -> CatalogResult<BirdDto> {
        check_bird(bird)?;
        let created = db::insert_bird(&*self.conn()?, bird)?;
        info!("Created bird {} ({})", created.id, created.name);
        Ok(created.into())
    }

    pub fn bird(&self, id: i64) -> CatalogResult<BirdDto> {
        db::find_bird(&*self.conn()?, id)?
            .map(BirdDto::from)
            .ok_or_else(|| CatalogError::bird_not_found(id))
    }

    pub fn birds(&self) -> CatalogResult<Vec<BirdDto>> {
        let birds = db::fetch_birds(&*self.conn()?)?;
        Ok(birds.into_iter().map(BirdDto::from).collect())
    }

    pub fn update_bird(&self, id: i64, bird: &NewBird) -> CatalogResult<BirdDto> {
        check_bird(bird)?;
        let updated = db::update_bird(&*self.conn()?, id, bird)?;
        info!("Updated bird {}", id);
        Ok(updated.into())
    }

    pub fn delete_bird(&self, id: i64) -> CatalogResult<()> {
        db::delete_bird(&*self.conn()?, id)?;
        info!("Deleted bird {}", id);
        Ok(())
    }

    pub fn query_birds(&self, query: &BirdQuery) -> CatalogResult<Vec<BirdDto>> {
        let birds = query::query_birds(&*self.conn()?, query)?;
        Ok(birds.into_iter().map(BirdDto::from).collect())
    }

    pub fn create_sighting(&self, sighting: &NewSighting) -> CatalogResult<SightingDto> {
        require("location", &sighting.location)?;
        let created = db::insert_sighting(&*self.conn()?, sighting)?;
        info!(
            "Created sighting {} of bird {} at {}",
            created.sighting.id, created.bird.id, created.sighting.location
        );
        Ok(created.into())
    }

    pub fn sighting(&self, id: i64) -> CatalogResult<SightingDto> {
        db::find_sighting(&*self.conn()?, id)?
            .map(SightingDto::from)
            .ok_or_else(|| CatalogError::sighting_not_found(id))
    }

    pub fn sightings(&self) -> CatalogResult<Vec<SightingDto>> {
        let records = db::fetch_sightings(&*self.conn()?)?;
        Ok(records.into_iter().map(SightingDto::from).collect())
    }

    pub fn delete_sighting(&self, id: i64) -> CatalogResult<()> {
        db::delete_sighting(&*self.conn()?, id)?;
        info!("Deleted sighting {}", id);
        Ok(())
    }

    pub fn query_sightings(&self, query: &SightingQuery) -> CatalogResult<Vec<SightingDto>> {
        let records = query::query_sightings(&*self.conn()?, query)?;
        Ok(records.into_iter().map(SightingDto::from).collect())
    }
}

/// Presence checks only; the store accepts any other value.
fn check_bird(bird: &NewBird) -> CatalogResult<()> {
    require("name", &bird.name)?;
    require("color", &bird.color)
}

fn require(field: &str, value: &str) -> CatalogResult<()> {
    if value.trim().is_empty() {
        Err(CatalogError::Validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sparrow() -> NewBird {
        NewBird {
            name: "Sparrow".to_string(),
            color: "Grey".to_string(),
            weight: 0.05,
            height: 15.0,
        }
    }

    #[test]
    fn bird_lifecycle() {
        let catalog = Catalog::in_memory().unwrap();

        let created = catalog.create_bird(&sparrow()).unwrap();
        assert!(catalog.birds().unwrap().contains(&created));

        let mut changes = sparrow();
        changes.color = "White".to_string();
        catalog.update_bird(created.id, &changes).unwrap();
        assert_eq!(catalog.bird(created.id).unwrap().color, "White");

        catalog.delete_bird(created.id).unwrap();
        assert!(catalog.bird(created.id).unwrap_err().is_not_found());
    }

    #[test]
    fn sighting_lookup_distinguishes_not_found() {
        let catalog = Catalog::in_memory().unwrap();
        let bird = catalog.create_bird(&sparrow()).unwrap();
        let sighting = catalog
            .create_sighting(&NewSighting {
                bird_id: bird.id,
                location: "Backyard".to_string(),
                date_time: NaiveDate::from_ymd_opt(2024, 2, 1)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap(),
            })
            .unwrap();

        assert_eq!(catalog.sighting(sighting.id).unwrap(), sighting);
        assert_eq!(sighting.bird, bird);
        assert!(catalog.sighting(sighting.id + 1).unwrap_err().is_not_found());
    }

    #[test]
    fn blank_fields_are_rejected_before_writing() {
        let catalog = Catalog::in_memory().unwrap();
        let mut nameless = sparrow();
        nameless.name = "  ".to_string();
        assert!(matches!(
            catalog.create_bird(&nameless),
            Err(CatalogError::Validation(_))
        ));
        assert!(catalog.birds().unwrap().is_empty());

        let bird = catalog.create_bird(&sparrow()).unwrap();
        let result = catalog.create_sighting(&NewSighting {
            bird_id: bird.id,
            location: String::new(),
            date_time: NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        });
        assert!(matches!(result, Err(CatalogError::Validation(_))));
        assert!(catalog.sightings().unwrap().is_empty());
    }

    #[test]
    fn open_memory_path() {
        let catalog = Catalog::open(Path::new(":memory:")).unwrap();
        catalog.ping().unwrap();
        assert!(catalog.birds().unwrap().is_empty());
    }
}
