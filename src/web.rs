use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;

use crate::api;
use crate::config::ServerConfig;
use crate::orchestrator::Orchestrator;

/// Upper bound for one request to the HTTP surface, above both client timeouts
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub fn app(orchestrator: Arc<Orchestrator>, static_dir: &str) -> Router {
    app_with_timeout(orchestrator, static_dir, REQUEST_TIMEOUT)
}

/// Requests running longer than `timeout` are answered with 408
fn app_with_timeout(orchestrator: Arc<Orchestrator>, static_dir: &str, timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(orchestrator))
        .fallback_service(ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    timeout,
                ))
                .layer(cors),
        )
}

pub async fn run(config: &ServerConfig, orchestrator: Arc<Orchestrator>) -> Result<()> {
    let app = app(orchestrator, &config.static_dir);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Map server running at http://{}", addr);
    axum::serve(listener, app)
        .await
        .context("Map server terminated")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReachMapConfig;
    use crate::geocoder::Geocoder;
    use crate::isochrone::IsochroneProvider;
    use crate::models::{Coordinate, GeoDocument, TravelQuery};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    struct SlowGeocoder;

    #[async_trait]
    impl Geocoder for SlowGeocoder {
        async fn geocode(&self, _address: &str) -> crate::Result<Coordinate> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Coordinate::new(51.5074, -0.1278))
        }
    }

    struct EmptyIsochrones;

    #[async_trait]
    impl IsochroneProvider for EmptyIsochrones {
        async fn fetch_isochrone(&self, _query: &TravelQuery) -> crate::Result<GeoDocument> {
            Ok(GeoDocument(json!({"type": "FeatureCollection", "features": []})))
        }
    }

    #[tokio::test]
    async fn test_slow_request_answers_request_timeout() {
        let orchestrator = Arc::new(Orchestrator::from_config(
            &ReachMapConfig::default(),
            Arc::new(SlowGeocoder),
            Arc::new(EmptyIsochrones),
        ));
        let app = app_with_timeout(orchestrator, "frontend", Duration::from_millis(50));

        let request = Request::builder()
            .method("POST")
            .uri("/api/isochrone")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"address": "London", "profile": "foot-walking", "minutes": "15"}).to_string(),
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
