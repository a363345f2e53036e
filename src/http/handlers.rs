//! HTTP handlers for the REST API.
//!
//! Each handler unpacks its request, runs the matching [`Catalog`] call on the
//! blocking pool, and maps the typed outcome onto a status code.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::AppError;
use super::params::SightingQueryParams;
use super::state::AppState;
use crate::catalog::Catalog;
use crate::dto::{BirdDto, SightingDto};
use crate::error::CatalogResult;
use crate::models::{NewBird, NewSighting};
use crate::query::BirdQuery;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

/// Run a catalog call on the blocking pool. SQLite calls block, so they stay
/// off the async workers.
async fn with_catalog<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Catalog) -> CatalogResult<T> + Send + 'static,
    T: Send + 'static,
{
    let catalog = state.catalog.clone();
    tokio::task::spawn_blocking(move || f(&catalog))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {e}")))?
        .map_err(AppError::from)
}

fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = match with_catalog(&state, |catalog| catalog.ping()).await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {:?}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        database,
    }))
}

// =============================================================================
// Birds
// =============================================================================

/// GET /api/v1/birds
pub async fn list_birds(State(state): State<AppState>) -> HandlerResult<Vec<BirdDto>> {
    let birds = with_catalog(&state, |catalog| catalog.birds()).await?;
    Ok(Json(birds))
}

/// GET /api/v1/birds/{id}
pub async fn get_bird(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> HandlerResult<BirdDto> {
    let id = path_id(path)?;
    let bird = with_catalog(&state, move |catalog| catalog.bird(id)).await?;
    Ok(Json(bird))
}

/// POST /api/v1/birds
pub async fn create_bird(
    State(state): State<AppState>,
    body: Result<Json<NewBird>, JsonRejection>,
) -> Result<(StatusCode, Json<BirdDto>), AppError> {
    let bird = json_body(body)?;
    let created = with_catalog(&state, move |catalog| catalog.create_bird(&bird)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/birds/{id}
pub async fn update_bird(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<NewBird>, JsonRejection>,
) -> HandlerResult<BirdDto> {
    let id = path_id(path)?;
    let bird = json_body(body)?;
    let updated = with_catalog(&state, move |catalog| catalog.update_bird(id, &bird)).await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/birds/{id}
pub async fn delete_bird(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = path_id(path)?;
    with_catalog(&state, move |catalog| catalog.delete_bird(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/birds/query?name=&color=
pub async fn query_birds(
    State(state): State<AppState>,
    query: Result<Query<BirdQuery>, QueryRejection>,
) -> HandlerResult<Vec<BirdDto>> {
    let query = query_params(query)?;
    let birds = with_catalog(&state, move |catalog| catalog.query_birds(&query)).await?;
    Ok(Json(birds))
}

// =============================================================================
// Sightings
// =============================================================================

/// GET /api/v1/sightings
pub async fn list_sightings(State(state): State<AppState>) -> HandlerResult<Vec<SightingDto>> {
    let sightings = with_catalog(&state, |catalog| catalog.sightings()).await?;
    Ok(Json(sightings))
}

/// GET /api/v1/sightings/{id}
pub async fn get_sighting(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> HandlerResult<SightingDto> {
    let id = path_id(path)?;
    let sighting = with_catalog(&state, move |catalog| catalog.sighting(id)).await?;
    Ok(Json(sighting))
}

/// POST /api/v1/sightings
pub async fn create_sighting(
    State(state): State<AppState>,
    body: Result<Json<NewSighting>, JsonRejection>,
) -> Result<(StatusCode, Json<SightingDto>), AppError> {
    let sighting = json_body(body)?;
    let created = with_catalog(&state, move |catalog| catalog.create_sighting(&sighting)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/v1/sightings/{id}
pub async fn delete_sighting(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = path_id(path)?;
    with_catalog(&state, move |catalog| catalog.delete_sighting(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sightings/query?location=&birdId=&startDate=&endDate=
pub async fn query_sightings(
    State(state): State<AppState>,
    params: Result<Query<SightingQueryParams>, QueryRejection>,
) -> HandlerResult<Vec<SightingDto>> {
    let query = query_params(params)?.into_query()?;
    let sightings = with_catalog(&state, move |catalog| catalog.query_sightings(&query)).await?;
    Ok(Json(sightings))
}
