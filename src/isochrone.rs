//! Isochrone client for the OpenRouteService API
//!
//! Requests the area reachable from an origin within a travel time and
//! returns the service's GeoJSON unmodified.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::config::IsochroneConfig;
use crate::models::{GeoDocument, TravelQuery};
use crate::{ReachMapError, Result};

const FETCH_FAILED: &str =
    "Failed to fetch isochrone data. Please check your API key or network connection.";

/// Anything that computes a reachable area for a travel query
#[async_trait]
pub trait IsochroneProvider: Send + Sync {
    async fn fetch_isochrone(&self, query: &TravelQuery) -> Result<GeoDocument>;
}

/// Request body. Locations are `[longitude, latitude]` pairs.
#[derive(Debug, Serialize)]
pub struct IsochroneRequest {
    pub locations: Vec<[f64; 2]>,
    pub range: Vec<u32>,
}

impl From<&TravelQuery> for IsochroneRequest {
    fn from(query: &TravelQuery) -> Self {
        Self {
            locations: vec![query.origin.to_lon_lat()],
            range: vec![query.duration_seconds()],
        }
    }
}

pub struct OpenRouteServiceClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouteServiceClient {
    pub fn new(config: &IsochroneConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(format!("reachmap/{}", crate::VERSION))
            .build()
            .map_err(|e| ReachMapError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn isochrone_url(&self, query: &TravelQuery) -> String {
        format!("{}/v2/isochrones/{}", self.base_url, query.profile)
    }
}

#[async_trait]
impl IsochroneProvider for OpenRouteServiceClient {
    #[instrument(skip(self), fields(profile = %query.profile, seconds = query.duration_seconds()))]
    async fn fetch_isochrone(&self, query: &TravelQuery) -> Result<GeoDocument> {
        let start_time = Instant::now();
        let url = self.isochrone_url(query);
        let body = IsochroneRequest::from(query);
        debug!("Isochrone request to {} with {:?}", url, body);

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Error fetching isochrone data: {}", e);
                ReachMapError::network(FETCH_FAILED, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map_or_else(|| status.as_str().to_string(), str::to_string);
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "OpenRouteService API error {}: {}",
                status,
                error_text.trim()
            );
            return Err(ReachMapError::api(status_text));
        }

        let document: GeoDocument = response.json().await.map_err(|e| {
            error!("Failed to parse isochrone response: {}", e);
            ReachMapError::network(FETCH_FAILED, e)
        })?;

        info!(
            "Retrieved {} isochrone in {:.3}s",
            query.profile,
            start_time.elapsed().as_secs_f64()
        );

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, Profile};

    #[test]
    fn test_request_body_inverts_axis_order() {
        let query =
            TravelQuery::from_minutes(Coordinate::new(51.5, -0.1), Profile::FootWalking, 15).unwrap();
        let body = serde_json::to_string(&IsochroneRequest::from(&query)).unwrap();
        assert_eq!(body, r#"{"locations":[[-0.1,51.5]],"range":[900]}"#);
    }

    #[test]
    fn test_isochrone_url_contains_profile() {
        let client = OpenRouteServiceClient::new(
            &IsochroneConfig {
                base_url: "https://ors.example.org/".to_string(),
                ..IsochroneConfig::default()
            },
            "key",
        )
        .unwrap();
        let query =
            TravelQuery::from_minutes(Coordinate::new(0.0, 0.0), Profile::CyclingRegular, 5).unwrap();
        assert_eq!(
            client.isochrone_url(&query),
            "https://ors.example.org/v2/isochrones/cycling-regular"
        );
    }
}
