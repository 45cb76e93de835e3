//! `reachmap` - draw the area reachable within a travel time on a map
//!
//! This library provides the map session, the geocoding and isochrone
//! clients and the orchestrator that ties user actions to them, plus the
//! HTTP surface the page talks to.

pub mod api;
pub mod config;
pub mod error;
pub mod geocoder;
pub mod isochrone;
pub mod map;
pub mod models;
pub mod orchestrator;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use config::ReachMapConfig;
pub use error::ReachMapError;
pub use geocoder::{Geocoder, NominatimClient};
pub use isochrone::{IsochroneProvider, OpenRouteServiceClient};
pub use map::{MapSession, MapSnapshot};
pub use models::{Coordinate, GeoDocument, OverlayId, OverlayStyle, OverlayTag, Profile, TravelQuery};
pub use orchestrator::{Orchestrator, SubmissionState, SubmitForm, SubmitOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ReachMapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
