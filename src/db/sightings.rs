use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Bird, NewSighting, Sighting, SightingRecord};

use super::birds::find_bird;

/// Sightings are always read joined with their bird so the projection layer
/// never has to go back to the store.
const JOINED_SELECT: &str = "SELECT s.id, s.bird_id, s.location, s.date_time,
            b.id, b.name, b.color, b.weight, b.height
     FROM sightings s
     INNER JOIN birds b ON b.id = s.bird_id";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<SightingRecord> {
    Ok(SightingRecord {
        sighting: Sighting {
            id: row.get(0)?,
            bird_id: row.get(1)?,
            location: row.get(2)?,
            date_time: row.get(3)?,
        },
        bird: Bird {
            id: row.get(4)?,
            name: row.get(5)?,
            color: row.get(6)?,
            weight: row.get(7)?,
            height: row.get(8)?,
        },
    })
}

fn select_sightings<P: rusqlite::Params>(
    conn: &Connection,
    tail: &str,
    params: P,
) -> CatalogResult<Vec<SightingRecord>> {
    let sql = format!("{JOINED_SELECT} {tail}");
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map(params, record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

pub fn fetch_sightings(conn: &Connection) -> CatalogResult<Vec<SightingRecord>> {
    select_sightings(conn, "ORDER BY s.id", params![])
}

pub fn find_sighting(conn: &Connection, id: i64) -> CatalogResult<Option<SightingRecord>> {
    let sql = format!("{JOINED_SELECT} WHERE s.id = ?1");
    let record = conn.query_row(&sql, [id], record_from_row).optional()?;
    Ok(record)
}

pub fn sightings_for_bird(conn: &Connection, bird_id: i64) -> CatalogResult<Vec<SightingRecord>> {
    select_sightings(conn, "WHERE s.bird_id = ?1 ORDER BY s.id", [bird_id])
}

/// Exact location match.
pub fn sightings_at_location(
    conn: &Connection,
    location: &str,
) -> CatalogResult<Vec<SightingRecord>> {
    select_sightings(conn, "WHERE s.location = ?1 ORDER BY s.id", [location])
}

/// Bird AND location AND `start <= date_time <= end`. Timestamps are stored as
/// ISO-8601 text, which sorts chronologically, so `BETWEEN` works on it.
pub fn sightings_for_bird_at_location_between(
    conn: &Connection,
    bird_id: i64,
    location: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> CatalogResult<Vec<SightingRecord>> {
    select_sightings(
        conn,
        "WHERE s.bird_id = ?1 AND s.location = ?2 AND s.date_time BETWEEN ?3 AND ?4
         ORDER BY s.id",
        params![bird_id, location, start, end],
    )
}

/// Resolve the referenced bird, then insert. Nothing is written when the bird
/// does not exist.
pub fn insert_sighting(conn: &Connection, sighting: &NewSighting) -> CatalogResult<SightingRecord> {
    let bird =
        find_bird(conn, sighting.bird_id)?.ok_or(CatalogError::UnknownBird(sighting.bird_id))?;

    conn.execute(
        "INSERT INTO sightings (bird_id, location, date_time) VALUES (?1, ?2, ?3)",
        params![bird.id, sighting.location, sighting.date_time],
    )?;

    Ok(SightingRecord {
        sighting: Sighting {
            id: conn.last_insert_rowid(),
            bird_id: bird.id,
            location: sighting.location.clone(),
            date_time: sighting.date_time,
        },
        bird,
    })
}

/// Deleting a sighting leaves its bird alone.
pub fn delete_sighting(conn: &Connection, id: i64) -> CatalogResult<()> {
    let deleted = conn.execute("DELETE FROM sightings WHERE id = ?1", [id])?;

    if deleted == 0 {
        Err(CatalogError::sighting_not_found(id))
    } else {
        Ok(())
    }
}
