//! Query engine: turns a set of optional filters into exactly one store scan.
//!
//! Both queries apply a fixed precedence. When several filters are supplied
//! the first matching branch wins and the filters it does not use are ignored,
//! never combined ad hoc. Zero matches is an empty list, not an error.

use chrono::NaiveDateTime;
use log::debug;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::CatalogResult;
use crate::models::{Bird, SightingRecord};

/// Optional bird filters. Matching is exact string equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirdQuery {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// The scan a [`BirdQuery`] resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirdFilter<'a> {
    NameAndColor(&'a str, &'a str),
    Name(&'a str),
    All,
}

impl BirdQuery {
    /// Color on its own selects nothing: without a name every bird matches.
    pub fn filter(&self) -> BirdFilter<'_> {
        match (self.name.as_deref(), self.color.as_deref()) {
            (Some(name), Some(color)) => BirdFilter::NameAndColor(name, color),
            (Some(name), None) => BirdFilter::Name(name),
            (None, _) => BirdFilter::All,
        }
    }
}

/// Optional sighting filters. Timestamps arrive already parsed; textual
/// parsing is the caller's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SightingQuery {
    pub location: Option<String>,
    pub bird_id: Option<i64>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

/// The scan a [`SightingQuery`] resolves to once its bird id has been looked
/// up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SightingFilter<'a> {
    BirdAtLocationBetween {
        bird_id: i64,
        location: &'a str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    Bird(i64),
    Location(&'a str),
    All,
}

impl SightingQuery {
    /// Pick the branch given the outcome of resolving `bird_id`. `resolved`
    /// is `None` both when no id was supplied and when the id matched no bird.
    pub fn filter(&self, resolved: Option<&Bird>) -> SightingFilter<'_> {
        match (resolved, self.location.as_deref(), self.start, self.end) {
            (Some(bird), Some(location), Some(start), Some(end)) => {
                SightingFilter::BirdAtLocationBetween {
                    bird_id: bird.id,
                    location,
                    start,
                    end,
                }
            }
            (Some(bird), ..) => SightingFilter::Bird(bird.id),
            (None, Some(location), ..) => SightingFilter::Location(location),
            (None, None, ..) => SightingFilter::All,
        }
    }
}

pub fn query_birds(conn: &Connection, query: &BirdQuery) -> CatalogResult<Vec<Bird>> {
    let filter = query.filter();
    debug!("Bird query {:?} -> {:?}", query, filter);
    match filter {
        BirdFilter::NameAndColor(name, color) => db::birds_by_name_and_color(conn, name, color),
        BirdFilter::Name(name) => db::birds_by_name(conn, name),
        BirdFilter::All => db::fetch_birds(conn),
    }
}

/// An unknown bird id is not an error here; the query falls through as if no
/// id had been given.
pub fn query_sightings(
    conn: &Connection,
    query: &SightingQuery,
) -> CatalogResult<Vec<SightingRecord>> {
    let resolved = match query.bird_id {
        Some(id) => db::find_bird(conn, id)?,
        None => None,
    };

    let filter = query.filter(resolved.as_ref());
    debug!("Sighting query {:?} -> {:?}", query, filter);
    match filter {
        SightingFilter::BirdAtLocationBetween {
            bird_id,
            location,
            start,
            end,
        } => db::sightings_for_bird_at_location_between(conn, bird_id, location, start, end),
        SightingFilter::Bird(bird_id) => db::sightings_for_bird(conn, bird_id),
        SightingFilter::Location(location) => db::sightings_at_location(conn, location),
        SightingFilter::All => db::fetch_sightings(conn),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_bird, insert_sighting, open_in_memory};
    use crate::models::{NewBird, NewSighting};
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn add_bird(conn: &Connection, name: &str, color: &str) -> Bird {
        insert_bird(
            conn,
            &NewBird {
                name: name.to_string(),
                color: color.to_string(),
                weight: 1.0,
                height: 10.0,
            },
        )
        .unwrap()
    }

    fn add_sighting(conn: &Connection, bird: &Bird, location: &str, when: NaiveDateTime) -> i64 {
        insert_sighting(
            conn,
            &NewSighting {
                bird_id: bird.id,
                location: location.to_string(),
                date_time: when,
            },
        )
        .unwrap()
        .sighting
        .id
    }

    fn ids(records: &[SightingRecord]) -> Vec<i64> {
        records.iter().map(|r| r.sighting.id).collect()
    }

    #[test]
    fn bird_filter_precedence() {
        let both = BirdQuery {
            name: Some("Eagle".into()),
            color: Some("Brown".into()),
        };
        assert_eq!(both.filter(), BirdFilter::NameAndColor("Eagle", "Brown"));

        let name_only = BirdQuery {
            name: Some("Eagle".into()),
            color: None,
        };
        assert_eq!(name_only.filter(), BirdFilter::Name("Eagle"));

        let color_only = BirdQuery {
            name: None,
            color: Some("Brown".into()),
        };
        assert_eq!(color_only.filter(), BirdFilter::All);
        assert_eq!(BirdQuery::default().filter(), BirdFilter::All);
    }

    #[test]
    fn bird_query_matches_name_and_color_exactly() {
        let conn = open_in_memory().unwrap();
        let brown = add_bird(&conn, "Eagle", "Brown");
        let white = add_bird(&conn, "Eagle", "White");
        add_bird(&conn, "Robin", "Brown");

        let both = query_birds(
            &conn,
            &BirdQuery {
                name: Some("Eagle".into()),
                color: Some("Brown".into()),
            },
        )
        .unwrap();
        assert_eq!(both, vec![brown.clone()]);

        let by_name = query_birds(
            &conn,
            &BirdQuery {
                name: Some("Eagle".into()),
                color: None,
            },
        )
        .unwrap();
        assert_eq!(by_name, vec![brown, white]);

        let color_only = query_birds(
            &conn,
            &BirdQuery {
                name: None,
                color: Some("Brown".into()),
            },
        )
        .unwrap();
        assert_eq!(color_only.len(), 3);

        let none = query_birds(
            &conn,
            &BirdQuery {
                name: Some("Condor".into()),
                color: None,
            },
        )
        .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn partial_interval_falls_back_to_bird() {
        let bird = Bird {
            id: 3,
            name: "Eagle".into(),
            color: "Brown".into(),
            weight: 5.5,
            height: 75.0,
        };
        let query = SightingQuery {
            location: Some("Grand Canyon".into()),
            bird_id: Some(3),
            start: Some(at(1, 0)),
            end: None,
        };
        assert_eq!(query.filter(Some(&bird)), SightingFilter::Bird(3));
        assert_eq!(query.filter(None), SightingFilter::Location("Grand Canyon"));
    }

    #[test]
    fn sighting_query_uses_all_filters_when_bird_resolves() {
        let conn = open_in_memory().unwrap();
        let eagle = add_bird(&conn, "Eagle", "Brown");
        let canyon = add_sighting(&conn, &eagle, "Grand Canyon", at(10, 12));
        add_sighting(&conn, &eagle, "Rocky Mountains", at(10, 12));
        add_sighting(&conn, &eagle, "Grand Canyon", at(20, 12));

        let mut query = SightingQuery {
            location: Some("Grand Canyon".into()),
            bird_id: Some(eagle.id),
            start: Some(at(9, 0)),
            end: Some(at(11, 0)),
        };
        assert_eq!(ids(&query_sightings(&conn, &query).unwrap()), vec![canyon]);

        query.end = Some(at(10, 11));
        assert!(query_sightings(&conn, &query).unwrap().is_empty());
    }

    #[test]
    fn sighting_query_by_bird_ignores_location() {
        let conn = open_in_memory().unwrap();
        let eagle = add_bird(&conn, "Eagle", "Brown");
        let robin = add_bird(&conn, "Robin", "Red");
        let first = add_sighting(&conn, &eagle, "Grand Canyon", at(1, 8));
        let second = add_sighting(&conn, &eagle, "Rocky Mountains", at(2, 8));
        add_sighting(&conn, &robin, "Grand Canyon", at(3, 8));

        let query = SightingQuery {
            location: Some("Grand Canyon".into()),
            bird_id: Some(eagle.id),
            ..SightingQuery::default()
        };
        assert_eq!(
            ids(&query_sightings(&conn, &query).unwrap()),
            vec![first, second]
        );
    }

    #[test]
    fn unknown_bird_id_is_treated_as_absent() {
        let conn = open_in_memory().unwrap();
        let eagle = add_bird(&conn, "Eagle", "Brown");
        let robin = add_bird(&conn, "Robin", "Red");
        let a = add_sighting(&conn, &eagle, "Grand Canyon", at(1, 8));
        let b = add_sighting(&conn, &robin, "Central Park", at(2, 8));

        let unknown = SightingQuery {
            bird_id: Some(9_999),
            ..SightingQuery::default()
        };
        assert_eq!(ids(&query_sightings(&conn, &unknown).unwrap()), vec![a, b]);

        let unknown_with_location = SightingQuery {
            bird_id: Some(9_999),
            location: Some("Central Park".into()),
            ..SightingQuery::default()
        };
        assert_eq!(
            ids(&query_sightings(&conn, &unknown_with_location).unwrap()),
            vec![b]
        );
    }
}
