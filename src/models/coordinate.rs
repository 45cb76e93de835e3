//! Coordinate model for geographic points

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReachMapError;

/// A point in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether the point lies within [-90, 90] x [-180, 180]. Not enforced anywhere.
    #[must_use]
    pub fn is_within_bounds(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Wire order used by the isochrone service: `[longitude, latitude]`
    #[must_use]
    pub fn to_lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Parse `"lat, lon"` text. Exactly one comma is expected; both halves must be
    /// finite numbers.
    ///
    /// Input with more than two comma separated parts, such as `"51.5, -0.1, 3"`,
    /// is rejected rather than truncated to its first two values.
    pub fn parse_lat_lon(input: &str) -> crate::Result<Self> {
        let (lat, lon) = input
            .split_once(',')
            .ok_or_else(|| ReachMapError::invalid_input("Invalid coordinates entered."))?;

        let latitude = parse_number(lat)?;
        let longitude = parse_number(lon)?;
        Ok(Self::new(latitude, longitude))
    }
}

fn parse_number(half: &str) -> crate::Result<f64> {
    half.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ReachMapError::invalid_input("Invalid coordinates entered."))
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("51.5, -0.1", 51.5, -0.1)]
    #[case("51.5,-0.1", 51.5, -0.1)]
    #[case("  -33.8688 ,151.2093 ", -33.8688, 151.2093)]
    #[case("0,0", 0.0, 0.0)]
    fn test_parse_lat_lon(#[case] input: &str, #[case] lat: f64, #[case] lon: f64) {
        let coordinate = Coordinate::parse_lat_lon(input).unwrap();
        assert_eq!(coordinate, Coordinate::new(lat, lon));
    }

    #[rstest]
    #[case("London, UK")]
    #[case("51.5,")]
    #[case(",0.1")]
    #[case("51.5, -0.1, 3")]
    #[case("NaN, 1")]
    #[case("51.5")]
    fn test_parse_lat_lon_rejects(#[case] input: &str) {
        let err = Coordinate::parse_lat_lon(input).unwrap_err();
        assert!(matches!(err, ReachMapError::InvalidInput { .. }));
        assert_eq!(err.user_message(), "Invalid coordinates entered.");
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let coordinate = Coordinate::new(51.505, -0.09);
        assert_eq!(coordinate.to_string(), "51.505, -0.09");
        assert_eq!(Coordinate::parse_lat_lon(&coordinate.to_string()).unwrap(), coordinate);
    }

    #[test]
    fn test_lon_lat_order() {
        assert_eq!(Coordinate::new(51.5, -0.1).to_lon_lat(), [-0.1, 51.5]);
    }

    #[test]
    fn test_bounds() {
        assert!(Coordinate::new(90.0, -180.0).is_within_bounds());
        assert!(!Coordinate::new(91.0, 0.0).is_within_bounds());
        assert!(!Coordinate::new(0.0, 180.5).is_within_bounds());
    }
}
