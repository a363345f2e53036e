//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// JSON body returned with every non-2xx response. The status code alone
/// classifies the failure; `code` and `message` are for humans and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Malformed path, query string, body or timestamp.
    BadRequest(String),
    Catalog(CatalogError),
    Internal(String),
}

impl AppError {
    fn status_and_body(&self) -> (StatusCode, ApiError) {
        match self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("BAD_REQUEST", msg.clone()),
            ),
            AppError::Catalog(err) => {
                let message = err.to_string();
                match err {
                    CatalogError::NotFound { .. } => {
                        (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
                    }
                    CatalogError::Validation(_) => (
                        StatusCode::BAD_REQUEST,
                        ApiError::new("BAD_REQUEST", message),
                    ),
                    CatalogError::UnknownBird(_) => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        ApiError::new("UNKNOWN_BIRD", message),
                    ),
                    CatalogError::BirdInUse { .. } => {
                        (StatusCode::CONFLICT, ApiError::new("BIRD_IN_USE", message))
                    }
                    CatalogError::Store(_) | CatalogError::Poisoned => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new("STORE_ERROR", message),
                    ),
                }
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg.clone()),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            error!("{} {}: {}", status.as_u16(), body.code, body.message);
        } else {
            warn!("{} {}: {}", status.as_u16(), body.code, body.message);
        }
        (status, Json(body)).into_response()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::Catalog(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Entity;

    #[test]
    fn catalog_errors_map_to_distinct_statuses() {
        let cases = [
            (
                CatalogError::NotFound {
                    entity: Entity::Bird,
                    id: 1,
                },
                StatusCode::NOT_FOUND,
            ),
            (
                CatalogError::Validation("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                CatalogError::UnknownBird(4),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CatalogError::BirdInUse { id: 1, sightings: 2 },
                StatusCode::CONFLICT,
            ),
            (CatalogError::Poisoned, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status_and_body().0, expected);
        }
    }
}
