//! Persistence module split across logical submodules.

mod birds;
mod connection;
mod seed;
mod sightings;

pub use birds::{
    birds_by_name, birds_by_name_and_color, count_birds, delete_bird, fetch_birds, find_bird,
    insert_bird, update_bird,
};
pub use connection::{ensure_schema, open_in_memory};
pub use seed::seed_if_empty;
pub use sightings::{
    delete_sighting, fetch_sightings, find_sighting, insert_sighting, sightings_at_location,
    sightings_for_bird, sightings_for_bird_at_location_between,
};
