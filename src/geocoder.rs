//! Geocoder client for Nominatim-compatible address search
//!
//! Resolves free text to a coordinate. Every call is independent: no retry,
//! no rate limiting, no caching.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::GeocoderConfig;
use crate::models::Coordinate;
use crate::{ReachMapError, Result};

const GEOCODE_FAILED: &str = "Failed to geocode address. Please check the input.";

/// Anything that turns an address into a coordinate
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Coordinate>;
}

/// One search hit. Nominatim sends coordinates as strings.
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    pub display_name: Option<String>,
}

impl NominatimPlace {
    fn coordinate(&self) -> Result<Coordinate> {
        match (finite(&self.lat), finite(&self.lon)) {
            (Some(latitude), Some(longitude)) => Ok(Coordinate::new(latitude, longitude)),
            _ => Err(ReachMapError::network(
                GEOCODE_FAILED,
                format!("unparsable coordinates lat={:?} lon={:?}", self.lat, self.lon),
            )),
        }
    }
}

/// `NaN` and `inf` parse as `f64` but are not coordinates
fn finite(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ReachMapError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self, address: &str) -> String {
        format!(
            "{}/search?format=json&q={}",
            self.base_url,
            urlencoding::encode(address)
        )
    }

    async fn search(&self, address: &str) -> Result<Vec<NominatimPlace>> {
        let url = self.search_url(address);
        debug!("Geocoding request URL: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Geocoding request for '{}' failed: {}", address, e);
            ReachMapError::network(GEOCODE_FAILED, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("Geocoding service answered {} for '{}'", status, address);
            return Err(ReachMapError::network(
                GEOCODE_FAILED,
                format!("HTTP status {status}"),
            ));
        }

        response.json::<Vec<NominatimPlace>>().await.map_err(|e| {
            error!("Failed to parse geocoding response for '{}': {}", address, e);
            ReachMapError::network(GEOCODE_FAILED, e)
        })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Coordinate> {
        let start_time = Instant::now();
        let places = self.search(address).await?;

        let Some(first) = places.first() else {
            warn!("No results found for address '{}'", address);
            return Err(ReachMapError::not_found("Address not found."));
        };

        let coordinate = first.coordinate().inspect_err(|e| {
            error!("Invalid geocoding result for '{}': {:?}", address, e);
        })?;

        info!(
            "Geocoded '{}' to ({}) in {:.3}s ({} results, best: {})",
            address,
            coordinate,
            start_time.elapsed().as_secs_f64(),
            places.len(),
            first.display_name.as_deref().unwrap_or("unnamed")
        );

        Ok(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn client() -> NominatimClient {
        NominatimClient::new(&GeocoderConfig {
            base_url: "https://nominatim.example.org/".to_string(),
            ..GeocoderConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_search_url_encodes_address() {
        let url = client().search_url("10 Downing St & Whitehall");
        assert_eq!(
            url,
            "https://nominatim.example.org/search?format=json&q=10%20Downing%20St%20%26%20Whitehall"
        );
    }

    #[test]
    fn test_place_coordinate_parsing() {
        let place = NominatimPlace {
            lat: "51.5074".into(),
            lon: "-0.1278".into(),
            display_name: None,
        };
        assert_eq!(place.coordinate().unwrap(), Coordinate::new(51.5074, -0.1278));
    }

    #[test]
    fn test_place_with_garbage_coordinates_is_network_error() {
        let place = NominatimPlace {
            lat: "north".into(),
            lon: "-0.1278".into(),
            display_name: None,
        };
        let err = place.coordinate().unwrap_err();
        assert!(matches!(err, ReachMapError::Network { .. }));
        assert_eq!(err.user_message(), GEOCODE_FAILED);
    }

    #[rstest]
    #[case("NaN", "-0.1278")]
    #[case("51.5074", "inf")]
    #[case("-infinity", "0")]
    fn test_place_with_non_finite_coordinates_is_network_error(
        #[case] lat: &str,
        #[case] lon: &str,
    ) {
        let place = NominatimPlace {
            lat: lat.into(),
            lon: lon.into(),
            display_name: None,
        };
        let err = place.coordinate().unwrap_err();
        assert!(matches!(err, ReachMapError::Network { .. }));
    }
}
