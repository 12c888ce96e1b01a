//! HTTP service: random event locations, the catalog, and ad-hoc resolution.

mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/location/random", get(handlers::random_location))
        .route("/api/catalog", get(handlers::catalog))
        .route("/api/resolve", get(handlers::resolve))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("campus geofence server listening on http://{}", addr);
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, LocationEntry};
    use crate::geo::Coordinate;
    use crate::location::providers::DynGeocoder;
    use crate::location::resolver::tests::ScriptedGeocoder;
    use crate::location::{Geofence, GeofenceResolver};
    use crate::sampler::Sampler;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_state(catalog: Catalog) -> Arc<AppState> {
        let catalog = Arc::new(catalog);
        let geocoder: DynGeocoder = Box::new(ScriptedGeocoder::default().answer(
            "1826 University Ave",
            vec![ScriptedGeocoder::place("38.0356", "-78.5034", ["38.0352", "38.0360", "-78.5039", "-78.5029"])],
        ));
        Arc::new(AppState::new(
            Arc::clone(&catalog),
            Sampler::seeded(catalog, 17),
            GeofenceResolver::new(geocoder),
        ))
    }

    fn campus() -> Catalog {
        let f = |lat, lon, r| Geofence::new(Coordinate::new(lat, lon), r);
        Catalog::from_entries([
            LocationEntry::new("Library", "Shannon", f(38.0364, -78.5057, 0.07)),
            LocationEntry::new("Gym", "AFC", f(38.0330, -78.5130, 0.12)),
        ])
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_random_location_alternates() {
        let state = test_state(campus());
        let (s1, first) = get_json(build_router(Arc::clone(&state)), "/api/location/random").await;
        let (s2, second) = get_json(build_router(state), "/api/location/random").await;

        assert_eq!(s1, StatusCode::OK);
        assert_eq!(s2, StatusCode::OK);
        assert_ne!(first["category"], second["category"]);
        assert!(first["name"] == "Shannon Library" || first["name"] == "AFC Gym");
        assert!(first["coordinates"]["latitude"].is_f64());
        assert!(first["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_random_location_empty_catalog() {
        let app = build_router(test_state(Catalog::default()));
        let (status, body) = get_json(app, "/api/location/random").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], 503);
    }

    #[tokio::test]
    async fn test_catalog_endpoint() {
        let app = build_router(test_state(campus()));
        let (status, body) = get_json(app, "/api/catalog").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Gym"]["locations"]["AFC"]["radius"], 0.12);
    }

    #[tokio::test]
    async fn test_resolve_endpoint() {
        let app = build_router(test_state(campus()));
        let (status, body) = get_json(app, "/api/resolve?address=1826%20University%20Ave").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coordinates"]["latitude"], 38.0356);
        assert!(body["radius"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let app = build_router(test_state(campus()));
        let (status, body) = get_json(app, "/api/resolve?address=Nonexistent%20Place%20XYZ123").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_resolve_missing_address() {
        let app = build_router(test_state(campus()));
        let (status, _) = get_json(app, "/api/resolve").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
