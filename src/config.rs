//! Runtime configuration read from environment variables.
//!
//! | Variable        | Default                              |
//! |-----------------|--------------------------------------|
//! | `BIRDS_DB_PATH` | `~/.bird-sightings/birds.sqlite`     |
//! | `BIRDS_HOST`    | `127.0.0.1`                          |
//! | `BIRDS_PORT`    | `8080`                               |
//! | `BIRDS_API_URL` | `http://localhost:8080/api/v1`       |
//! | `BIRDS_SEED`    | `true`                               |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".bird-sightings";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "birds.sqlite";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";

/// Settings for the HTTP server binary.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Insert the example birds and sightings into an empty store.
    pub seed: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup so tests do not have to
    /// mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup("BIRDS_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };
        let host = lookup("BIRDS_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("BIRDS_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("BIRDS_PORT must be a port number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };
        let seed = match lookup("BIRDS_SEED") {
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| anyhow!("BIRDS_SEED must be true or false, got {raw:?}"))?,
            None => true,
        };

        Ok(Self {
            db_path,
            host,
            port,
            seed,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

/// Settings for the terminal client. The service address is passed to the
/// client at construction rather than baked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("BIRDS_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self { api_url }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
