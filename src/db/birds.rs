use rusqlite::{params, Connection, Error as SqlError, ErrorCode, OptionalExtension, Row};

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Bird, NewBird};

const BIRD_COLUMNS: &str = "id, name, color, weight, height";

pub(crate) fn bird_from_row(row: &Row<'_>) -> rusqlite::Result<Bird> {
    Ok(Bird {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        weight: row.get(3)?,
        height: row.get(4)?,
    })
}

/// Run a bird `SELECT` with the given `WHERE`/`ORDER BY` tail and collect the
/// rows. Every bird scan goes through here so ordering stays consistent.
fn select_birds<P: rusqlite::Params>(
    conn: &Connection,
    tail: &str,
    params: P,
) -> CatalogResult<Vec<Bird>> {
    let sql = format!("SELECT {BIRD_COLUMNS} FROM birds {tail}");
    let mut stmt = conn.prepare(&sql)?;
    let birds = stmt
        .query_map(params, bird_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(birds)
}

/// Every bird in insertion order.
pub fn fetch_birds(conn: &Connection) -> CatalogResult<Vec<Bird>> {
    select_birds(conn, "ORDER BY id", params![])
}

pub fn find_bird(conn: &Connection, id: i64) -> CatalogResult<Option<Bird>> {
    let sql = format!("SELECT {BIRD_COLUMNS} FROM birds WHERE id = ?1");
    let bird = conn.query_row(&sql, [id], bird_from_row).optional()?;
    Ok(bird)
}

/// Exact, case-sensitive name match.
pub fn birds_by_name(conn: &Connection, name: &str) -> CatalogResult<Vec<Bird>> {
    select_birds(conn, "WHERE name = ?1 ORDER BY id", [name])
}

pub fn birds_by_name_and_color(
    conn: &Connection,
    name: &str,
    color: &str,
) -> CatalogResult<Vec<Bird>> {
    select_birds(
        conn,
        "WHERE name = ?1 AND color = ?2 ORDER BY id",
        params![name, color],
    )
}

pub fn count_birds(conn: &Connection) -> CatalogResult<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM birds", params![], |row| row.get(0))?;
    Ok(count)
}

/// Insert a new bird row and hand back the hydrated struct with its id.
pub fn insert_bird(conn: &Connection, bird: &NewBird) -> CatalogResult<Bird> {
    conn.execute(
        "INSERT INTO birds (name, color, weight, height) VALUES (?1, ?2, ?3, ?4)",
        params![bird.name, bird.color, bird.weight, bird.height],
    )?;

    Ok(Bird {
        id: conn.last_insert_rowid(),
        name: bird.name.clone(),
        color: bird.color.clone(),
        weight: bird.weight,
        height: bird.height,
    })
}

/// Overwrite every editable field. The id stays fixed; a missing row is
/// reported as `NotFound` rather than silently ignored.
pub fn update_bird(conn: &Connection, id: i64, bird: &NewBird) -> CatalogResult<Bird> {
    let updated = conn.execute(
        "UPDATE birds SET name = ?1, color = ?2, weight = ?3, height = ?4 WHERE id = ?5",
        params![bird.name, bird.color, bird.weight, bird.height, id],
    )?;

    if updated == 0 {
        return Err(CatalogError::bird_not_found(id));
    }

    Ok(Bird {
        id,
        name: bird.name.clone(),
        color: bird.color.clone(),
        weight: bird.weight,
        height: bird.height,
    })
}

/// Remove a bird row. The schema restricts deletes while sightings still
/// reference the bird; that case surfaces as `BirdInUse`.
pub fn delete_bird(conn: &Connection, id: i64) -> CatalogResult<()> {
    let deleted = conn
        .execute("DELETE FROM birds WHERE id = ?1", [id])
        .map_err(|err| map_foreign_key_violation(conn, err, id))?;

    if deleted == 0 {
        Err(CatalogError::bird_not_found(id))
    } else {
        Ok(())
    }
}

/// Turn a constraint failure on delete into `BirdInUse` with the number of
/// sightings blocking it. Other SQLite errors pass through untouched.
fn map_foreign_key_violation(conn: &Connection, err: SqlError, id: i64) -> CatalogError {
    if !matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        return err.into();
    }

    match conn.query_row(
        "SELECT COUNT(*) FROM sightings WHERE bird_id = ?1",
        [id],
        |row| row.get(0),
    ) {
        Ok(sightings) => CatalogError::BirdInUse { id, sightings },
        Err(count_err) => count_err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn bird(name: &str, color: &str) -> NewBird {
        NewBird {
            name: name.to_string(),
            color: color.to_string(),
            weight: 1.0,
            height: 10.0,
        }
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let conn = open_in_memory().unwrap();
        let first = insert_bird(&conn, &bird("Eagle", "Brown")).unwrap();
        let second = insert_bird(&conn, &bird("Robin", "Red")).unwrap();
        assert!(second.id > first.id);
        assert_eq!(fetch_birds(&conn).unwrap(), vec![first, second]);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let conn = open_in_memory().unwrap();
        let first = insert_bird(&conn, &bird("Eagle", "Brown")).unwrap();
        delete_bird(&conn, first.id).unwrap();
        let second = insert_bird(&conn, &bird("Eagle", "Brown")).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn name_filter_is_exact_and_case_sensitive() {
        let conn = open_in_memory().unwrap();
        insert_bird(&conn, &bird("Eagle", "Brown")).unwrap();
        insert_bird(&conn, &bird("eagle", "Brown")).unwrap();
        insert_bird(&conn, &bird("Eagle Owl", "Brown")).unwrap();

        let found = birds_by_name(&conn, "Eagle").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Eagle");
    }

    #[test]
    fn update_missing_bird_is_not_found() {
        let conn = open_in_memory().unwrap();
        let err = update_bird(&conn, 42, &bird("Eagle", "Brown")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_missing_bird_is_not_found() {
        let conn = open_in_memory().unwrap();
        let err = delete_bird(&conn, 7).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_referenced_bird_is_rejected() {
        let conn = open_in_memory().unwrap();
        let eagle = insert_bird(&conn, &bird("Eagle", "Brown")).unwrap();
        conn.execute(
            "INSERT INTO sightings (bird_id, location, date_time) VALUES (?1, 'Grand Canyon', '2024-05-01 10:00:00')",
            [eagle.id],
        )
        .unwrap();

        let err = delete_bird(&conn, eagle.id).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::BirdInUse { id, sightings: 1 } if id == eagle.id
        ));
        assert!(find_bird(&conn, eagle.id).unwrap().is_some());
    }
}
