use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ReachMapError;
use crate::map::MapSnapshot;
use crate::models::{Coordinate, Profile};
use crate::orchestrator::{Orchestrator, SubmitForm, SubmitOutcome};

#[derive(Deserialize)]
pub struct ClickRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize)]
pub struct ClickResponse {
    pub address: String,
    pub map: MapSnapshot,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub outcome: SubmitOutcome,
    pub map: MapSnapshot,
}

/// Error body shown by the page in a blocking alert
pub struct ApiError(ReachMapError);

impl From<ReachMapError> for ApiError {
    fn from(err: ReachMapError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ReachMapError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ReachMapError::NotFound { .. } => StatusCode::NOT_FOUND,
            ReachMapError::Api { .. } | ReachMapError::Network { .. } => StatusCode::BAD_GATEWAY,
            ReachMapError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({
            "error": self.0.kind(),
            "message": self.0.user_message(),
        });
        (status, Json(body)).into_response()
    }
}

pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/map", get(get_map))
        .route("/map/click", post(click))
        .route("/isochrone", post(submit))
        .route("/profiles", get(get_profiles))
        .with_state(orchestrator)
}

async fn get_map(State(orchestrator): State<Arc<Orchestrator>>) -> Json<MapSnapshot> {
    Json(orchestrator.snapshot().await)
}

async fn click(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(request): Json<ClickRequest>,
) -> Json<ClickResponse> {
    let address = orchestrator
        .on_map_click(Coordinate::new(request.latitude, request.longitude))
        .await;
    Json(ClickResponse {
        address,
        map: orchestrator.snapshot().await,
    })
}

async fn submit(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(form): Json<SubmitForm>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let outcome = orchestrator.submit(form).await?;
    Ok(Json(SubmitResponse {
        outcome,
        map: orchestrator.snapshot().await,
    }))
}

async fn get_profiles() -> Json<Vec<&'static str>> {
    Json(Profile::ALL.iter().map(Profile::as_str).collect())
}
