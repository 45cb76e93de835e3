//! Travel profiles and per-submit travel queries

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Coordinate;
use crate::error::ReachMapError;

/// Travel mode understood by the isochrone service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    DrivingCar,
    DrivingHgv,
    CyclingRegular,
    CyclingRoad,
    CyclingMountain,
    CyclingElectric,
    FootWalking,
    FootHiking,
    Wheelchair,
}

impl Profile {
    pub const ALL: [Profile; 9] = [
        Profile::DrivingCar,
        Profile::DrivingHgv,
        Profile::CyclingRegular,
        Profile::CyclingRoad,
        Profile::CyclingMountain,
        Profile::CyclingElectric,
        Profile::FootWalking,
        Profile::FootHiking,
        Profile::Wheelchair,
    ];

    /// Name used in the isochrone request path
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::DrivingCar => "driving-car",
            Profile::DrivingHgv => "driving-hgv",
            Profile::CyclingRegular => "cycling-regular",
            Profile::CyclingRoad => "cycling-road",
            Profile::CyclingMountain => "cycling-mountain",
            Profile::CyclingElectric => "cycling-electric",
            Profile::FootWalking => "foot-walking",
            Profile::FootHiking => "foot-hiking",
            Profile::Wheelchair => "wheelchair",
        }
    }
}

impl FromStr for Profile {
    type Err = ReachMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Profile::ALL
            .into_iter()
            .find(|profile| profile.as_str() == s)
            .ok_or_else(|| ReachMapError::invalid_input(format!("Unknown transportation mode: {s}")))
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One isochrone request: where from, how, and for how long
#[derive(Debug, Clone, PartialEq)]
pub struct TravelQuery {
    pub origin: Coordinate,
    pub profile: Profile,
    /// Always greater than zero
    duration_seconds: u32,
}

impl TravelQuery {
    pub fn new(origin: Coordinate, profile: Profile, duration_seconds: u32) -> crate::Result<Self> {
        if duration_seconds == 0 {
            return Err(ReachMapError::invalid_input(
                "Travel time must be greater than zero.",
            ));
        }
        Ok(Self {
            origin,
            profile,
            duration_seconds,
        })
    }

    /// Build a query from a duration in minutes
    pub fn from_minutes(origin: Coordinate, profile: Profile, minutes: u32) -> crate::Result<Self> {
        let seconds = minutes
            .checked_mul(60)
            .ok_or_else(|| ReachMapError::invalid_input("Travel time is too large."))?;
        Self::new(origin, profile, seconds)
    }

    #[must_use]
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("driving-car", Profile::DrivingCar)]
    #[case("cycling-regular", Profile::CyclingRegular)]
    #[case(" foot-walking ", Profile::FootWalking)]
    #[case("wheelchair", Profile::Wheelchair)]
    fn test_profile_from_str(#[case] input: &str, #[case] expected: Profile) {
        assert_eq!(input.parse::<Profile>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_profile() {
        let err = "teleport".parse::<Profile>().unwrap_err();
        assert!(matches!(err, ReachMapError::InvalidInput { .. }));
    }

    #[test]
    fn test_profile_serde_matches_wire_name() {
        for profile in Profile::ALL {
            let json = serde_json::to_string(&profile).unwrap();
            assert_eq!(json, format!("\"{}\"", profile.as_str()));
        }
    }

    #[test]
    fn test_from_minutes() {
        let query =
            TravelQuery::from_minutes(Coordinate::new(51.5, -0.1), Profile::FootWalking, 15).unwrap();
        assert_eq!(query.duration_seconds(), 900);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let err = TravelQuery::from_minutes(Coordinate::new(0.0, 0.0), Profile::DrivingCar, 0)
            .unwrap_err();
        assert!(matches!(err, ReachMapError::InvalidInput { .. }));
    }
}
