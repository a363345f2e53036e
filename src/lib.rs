//! Core library for the bird sightings service, its client, and the terminal
//! front-end. Both binaries (`bird-sightings-server` and `bird-sightings`)
//! are thin wrappers around the modules exposed here.
pub mod catalog;
pub mod client;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod http;
pub mod models;
pub mod query;
pub mod ui;

pub use catalog::Catalog;
pub use client::{BirdApiClient, ClientError};
pub use config::{ClientConfig, ServerConfig};
pub use dto::{BirdDto, SightingDto};
pub use error::{CatalogError, Entity};
pub use models::{Bird, NewBird, NewSighting, Sighting, SightingRecord};
pub use query::{BirdQuery, SightingQuery};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
