use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError};
use std::time::Instant;
use tracing::{info, warn};

use crate::catalog::CatalogSource;
use crate::location::Geofence;
use crate::sampler::Pick;

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/location/random ────────────────────────────────────

pub(super) async fn random_location(State(state): State<Arc<AppState>>) -> Result<Json<Pick>, ApiError> {
    let start = Instant::now();

    let pick = {
        let mut sampler = state.sampler.lock().unwrap_or_else(PoisonError::into_inner);
        sampler.pick()
    };

    match pick {
        Ok(pick) => {
            info!(
                category = %pick.category,
                name = %pick.name,
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "GET /api/location/random"
            );
            Ok(Json(pick))
        }
        Err(e) => {
            warn!(error = %e, "GET /api/location/random failed");
            Err(api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
        }
    }
}

// ─── GET /api/catalog ────────────────────────────────────────────

pub(super) async fn catalog(State(state): State<Arc<AppState>>) -> Json<CatalogSource> {
    Json(state.catalog.to_source())
}

// ─── GET /api/resolve ────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct ResolveQuery {
    pub address: Option<String>,
}

pub(super) async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveQuery>,
) -> Result<Json<Geofence>, ApiError> {
    let start = Instant::now();

    let address = params.address.as_deref().unwrap_or("").trim().to_string();
    if address.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'address' parameter"));
    }

    // The geocoder blocks on network I/O.
    let resolver = Arc::clone(&state.resolver);
    let query = address.clone();
    let resolved = tokio::task::spawn_blocking(move || {
        let mut resolver = resolver.lock().unwrap_or_else(PoisonError::into_inner);
        resolver.resolve(&query)
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match resolved {
        Ok(fence) => {
            info!(
                address = %address,
                radius_km = fence.radius,
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "GET /api/resolve"
            );
            Ok(Json(fence))
        }
        Err(e) => {
            warn!(address = %address, error = %e, "GET /api/resolve failed");
            Err(api_error(StatusCode::NOT_FOUND, e.to_string()))
        }
    }
}
