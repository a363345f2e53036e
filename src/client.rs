//! Typed wrapper around the REST API.
//!
//! Every call checks the status code the server is expected to return and
//! turns anything else into a [`ClientError`]. The body of a failed response
//! is only used as a diagnostic message, never to decide the outcome.

use std::time::Duration;

use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::dto::{BirdDto, SightingDto};
use crate::http::{ApiError, HealthResponse, SightingQueryParams};
use crate::models::{NewBird, NewSighting};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request failed ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Could not reach the bird service: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Clone)]
pub struct BirdApiClient {
    http: Client,
    base_url: String,
}

impl BirdApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/health` lives beside the versioned prefix, not under it.
    fn health_url(&self) -> String {
        let root = self
            .base_url
            .strip_suffix(crate::http::API_PREFIX)
            .unwrap_or(&self.base_url);
        format!("{root}/health")
    }

    // --- Birds ---

    pub async fn add_bird(&self, bird: &NewBird) -> ClientResult<BirdDto> {
        let response = self.http.post(self.url("/birds")).json(bird).send().await?;
        expect_json(response, StatusCode::CREATED).await
    }

    pub async fn all_birds(&self) -> ClientResult<Vec<BirdDto>> {
        let response = self.http.get(self.url("/birds")).send().await?;
        expect_json(response, StatusCode::OK).await
    }

    pub async fn bird(&self, id: i64) -> ClientResult<BirdDto> {
        let response = self.http.get(self.url(&format!("/birds/{id}"))).send().await?;
        expect_json(response, StatusCode::OK).await
    }

    pub async fn update_bird(&self, id: i64, bird: &NewBird) -> ClientResult<BirdDto> {
        let response = self
            .http
            .put(self.url(&format!("/birds/{id}")))
            .json(bird)
            .send()
            .await?;
        expect_json(response, StatusCode::OK).await
    }

    pub async fn delete_bird(&self, id: i64) -> ClientResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("/birds/{id}")))
            .send()
            .await?;
        expect_status(response, StatusCode::NO_CONTENT).await
    }

    /// Empty filters are left out of the query string entirely.
    pub async fn query_birds(
        &self,
        name: Option<&str>,
        color: Option<&str>,
    ) -> ClientResult<Vec<BirdDto>> {
        let params = present_params([("name", name), ("color", color)]);
        let response = self
            .http
            .get(self.url("/birds/query"))
            .query(&params)
            .send()
            .await?;
        expect_json(response, StatusCode::OK).await
    }

    // --- Sightings ---

    pub async fn add_sighting(&self, sighting: &NewSighting) -> ClientResult<SightingDto> {
        let response = self
            .http
            .post(self.url("/sightings"))
            .json(sighting)
            .send()
            .await?;
        expect_json(response, StatusCode::CREATED).await
    }

    pub async fn all_sightings(&self) -> ClientResult<Vec<SightingDto>> {
        let response = self.http.get(self.url("/sightings")).send().await?;
        expect_json(response, StatusCode::OK).await
    }

    pub async fn sighting(&self, id: i64) -> ClientResult<SightingDto> {
        let response = self
            .http
            .get(self.url(&format!("/sightings/{id}")))
            .send()
            .await?;
        expect_json(response, StatusCode::OK).await
    }

    pub async fn delete_sighting(&self, id: i64) -> ClientResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("/sightings/{id}")))
            .send()
            .await?;
        expect_status(response, StatusCode::NO_CONTENT).await
    }

    pub async fn query_sightings(
        &self,
        query: &SightingQueryParams,
    ) -> ClientResult<Vec<SightingDto>> {
        let bird_id = query.bird_id.map(|id| id.to_string());
        let params = present_params([
            ("location", query.location.as_deref()),
            ("birdId", bird_id.as_deref()),
            ("startDate", query.start_date.as_deref()),
            ("endDate", query.end_date.as_deref()),
        ]);
        let response = self
            .http
            .get(self.url("/sightings/query"))
            .query(&params)
            .send()
            .await?;
        expect_json(response, StatusCode::OK).await
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        let response = self.http.get(self.health_url()).send().await?;
        expect_json(response, StatusCode::OK).await
    }
}

/// Keep only the parameters that carry a value. Whitespace is a value and is
/// sent as-is; only missing or empty strings are left out.
fn present_params<'a, const N: usize>(
    candidates: [(&'a str, Option<&'a str>); N],
) -> Vec<(&'a str, &'a str)> {
    candidates
        .into_iter()
        .filter_map(|(key, value)| match value {
            Some(value) if !value.is_empty() => Some((key, value)),
            _ => None,
        })
        .collect()
}

async fn expect_json<T: DeserializeOwned>(
    response: Response,
    expected: StatusCode,
) -> ClientResult<T> {
    if response.status() == expected {
        Ok(response.json::<T>().await?)
    } else {
        Err(failure(response).await)
    }
}

async fn expect_status(response: Response, expected: StatusCode) -> ClientResult<()> {
    if response.status() == expected {
        Ok(())
    } else {
        Err(failure(response).await)
    }
}

async fn failure(response: Response) -> ClientError {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&text)
        .map(|body| body.message)
        .unwrap_or_else(|_| {
            if text.trim().is_empty() {
                status.to_string()
            } else {
                text
            }
        });
    debug!("{} answered {}: {}", url, status, message);

    if status == StatusCode::NOT_FOUND {
        ClientError::NotFound(message)
    } else {
        ClientError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> BirdApiClient {
        BirdApiClient::new(&ClientConfig {
            api_url: url.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn empty_parameters_are_dropped() {
        let params = present_params([
            ("name", Some("Eagle")),
            ("color", Some("  ")),
            ("location", None),
            ("birdId", Some("")),
        ]);
        assert_eq!(params, vec![("name", "Eagle"), ("color", "  ")]);
    }

    #[test]
    fn health_url_strips_api_prefix() {
        let api = client("http://localhost:8080/api/v1/");
        assert_eq!(api.base_url(), "http://localhost:8080/api/v1");
        assert_eq!(api.health_url(), "http://localhost:8080/health");
        assert_eq!(api.url("/birds/3"), "http://localhost:8080/api/v1/birds/3");
    }
}
