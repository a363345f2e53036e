use chrono::{Duration, Months, NaiveDateTime};
use log::info;
use rusqlite::Connection;

use crate::error::CatalogResult;
use crate::models::{NewBird, NewSighting};

use super::birds::{count_birds, insert_bird};
use super::sightings::insert_sighting;

/// Example birds inserted into a fresh store: name, color, weight, height.
const SEED_BIRDS: &[(&str, &str, f64, f64)] = &[
    ("Eagle", "Brown", 5.5, 75.0),
    ("Sparrow", "Grey", 0.05, 15.0),
    ("Robin", "Red", 0.1, 20.0),
];

/// Populate an empty store with a few birds and sightings relative to `now`.
/// Returns `false` without touching anything when at least one bird exists.
pub fn seed_if_empty(conn: &Connection, now: NaiveDateTime) -> CatalogResult<bool> {
    if count_birds(conn)? > 0 {
        return Ok(false);
    }

    let mut ids = Vec::with_capacity(SEED_BIRDS.len());
    for (name, color, weight, height) in SEED_BIRDS {
        let bird = insert_bird(
            conn,
            &NewBird {
                name: name.to_string(),
                color: color.to_string(),
                weight: *weight,
                height: *height,
            },
        )?;
        ids.push(bird.id);
    }
    let (eagle, sparrow, robin) = (ids[0], ids[1], ids[2]);

    let last_month = now.checked_sub_months(Months::new(1)).unwrap_or(now);
    let sightings = [
        (eagle, "Grand Canyon", now),
        (eagle, "Rocky Mountains", now - Duration::days(5)),
        (sparrow, "Backyard", now - Duration::hours(2)),
        (sparrow, "City Park", last_month),
        (robin, "Central Park", now - Duration::days(1)),
    ];

    for (bird_id, location, date_time) in sightings {
        insert_sighting(
            conn,
            &NewSighting {
                bird_id,
                location: location.to_string(),
                date_time,
            },
        )?;
    }

    info!(
        "Seeded {} birds and {} sightings",
        SEED_BIRDS.len(),
        sightings.len()
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fetch_birds, fetch_sightings, open_in_memory};
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn seeds_only_once() {
        let conn = open_in_memory().unwrap();
        assert!(seed_if_empty(&conn, now()).unwrap());
        assert!(!seed_if_empty(&conn, now()).unwrap());

        assert_eq!(fetch_birds(&conn).unwrap().len(), 3);
        let sightings = fetch_sightings(&conn).unwrap();
        assert_eq!(sightings.len(), 5);
        assert_eq!(sightings[0].bird.name, "Eagle");
        assert_eq!(sightings[0].sighting.location, "Grand Canyon");
        assert_eq!(
            sightings[3].sighting.date_time.date(),
            NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
        );
    }
}
