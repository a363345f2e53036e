//! REST surface over the [`Catalog`](crate::catalog::Catalog).

mod error;
mod handlers;
mod params;
mod router;
mod state;

pub use error::{ApiError, AppError};
pub use handlers::HealthResponse;
pub use params::SightingQueryParams;
pub use router::{create_router, API_PREFIX};
pub use state::AppState;
