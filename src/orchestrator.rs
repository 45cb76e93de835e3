//! Submission orchestrator
//!
//! Wires user actions to the clients and the map session. A submission
//! resolves a start point (typed coordinates or geocoding), recenters the
//! map, fetches the isochrone and swaps the drawn isochrone overlay.
//!
//! Every submission takes a generation number. Results are applied only if
//! no newer submission started in the meantime, so a slow response can no
//! longer overwrite the outcome of a later one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::ReachMapConfig;
use crate::geocoder::Geocoder;
use crate::isochrone::IsochroneProvider;
use crate::map::{MapSession, MapSnapshot};
use crate::models::{Coordinate, OverlayId, OverlayStyle, OverlayTag, Profile, TravelQuery};
use crate::{ReachMapError, Result};

/// Raw form input as entered by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitForm {
    /// Address or `"lat, lon"`
    pub address: String,
    /// Profile wire name, e.g. `foot-walking`
    pub profile: String,
    /// Travel time in whole minutes
    pub minutes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    ResolvingStart,
    ResolvingIsochrone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SubmitOutcome {
    /// The isochrone was drawn
    Drawn {
        generation: u64,
        start: Coordinate,
        overlay: OverlayId,
    },
    /// A newer submission started before this one completed; nothing was applied
    Superseded { generation: u64 },
}

/// Where the start point came from
#[derive(Debug, Clone, PartialEq)]
enum StartInput {
    Coordinates(Coordinate),
    Address(String),
}

/// Validated form
#[derive(Debug, Clone, PartialEq)]
struct Submission {
    start: StartInput,
    profile: Profile,
    minutes: u32,
}

impl SubmitForm {
    fn validate(&self) -> Result<Submission> {
        let address = self.address.trim();
        if address.is_empty() {
            return Err(ReachMapError::invalid_input(
                "Please enter an address or select a point on the map.",
            ));
        }

        let start = if address.contains(',') {
            StartInput::Coordinates(Coordinate::parse_lat_lon(address)?)
        } else {
            StartInput::Address(address.to_string())
        };

        let profile = self.profile.parse::<Profile>()?;

        let minutes = self
            .minutes
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|minutes| *minutes > 0)
            .ok_or_else(|| {
                ReachMapError::invalid_input("Please enter a travel time in whole minutes.")
            })?;

        Ok(Submission {
            start,
            profile,
            minutes,
        })
    }
}

pub struct Orchestrator {
    geocoder: Arc<dyn Geocoder>,
    isochrones: Arc<dyn IsochroneProvider>,
    map: Arc<Mutex<MapSession>>,
    style: OverlayStyle,
    resolved_zoom: u8,
    generation: AtomicU64,
    /// State of the most recent submission, stamped with its generation
    state: Mutex<(u64, SubmissionState)>,
}

impl Orchestrator {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        isochrones: Arc<dyn IsochroneProvider>,
        map: MapSession,
        style: OverlayStyle,
        resolved_zoom: u8,
    ) -> Self {
        Self {
            geocoder,
            isochrones,
            map: Arc::new(Mutex::new(map)),
            style,
            resolved_zoom,
            generation: AtomicU64::new(0),
            state: Mutex::new((0, SubmissionState::Idle)),
        }
    }

    #[must_use]
    pub fn from_config(
        config: &ReachMapConfig,
        geocoder: Arc<dyn Geocoder>,
        isochrones: Arc<dyn IsochroneProvider>,
    ) -> Self {
        Self::new(
            geocoder,
            isochrones,
            MapSession::from_config(&config.map),
            config.overlay.clone(),
            config.map.resolved_zoom,
        )
    }

    /// Handle a click on the map. Returns the new address text.
    pub async fn on_map_click(&self, coordinate: Coordinate) -> String {
        debug!(%coordinate, "Map clicked");
        self.map.lock().await.on_map_click(coordinate)
    }

    pub async fn snapshot(&self) -> MapSnapshot {
        self.map.lock().await.snapshot()
    }

    pub async fn state(&self) -> SubmissionState {
        self.state.lock().await.1
    }

    /// Shared handle to the map session
    #[must_use]
    pub fn map(&self) -> Arc<Mutex<MapSession>> {
        Arc::clone(&self.map)
    }

    /// Run one submission. Errors are returned for the caller to show; a
    /// superseded submission never reports an error.
    #[instrument(skip(self, form), fields(address = %form.address, profile = %form.profile))]
    pub async fn submit(&self, form: SubmitForm) -> Result<SubmitOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_state(generation, SubmissionState::Idle).await;
        self.map.lock().await.set_address_text(form.address.trim());

        match self.run(generation, &form).await {
            Ok(outcome) => {
                if let SubmitOutcome::Superseded { .. } = outcome {
                    info!(generation, "Submission superseded by a newer one");
                }
                Ok(outcome)
            }
            Err(e) if self.is_current(generation) => {
                self.set_state(generation, SubmissionState::Idle).await;
                warn!(generation, error = ?e, "Submission failed: {}", e.user_message());
                Err(e)
            }
            Err(e) => {
                info!(generation, error = ?e, "Discarding failure of superseded submission");
                Ok(SubmitOutcome::Superseded { generation })
            }
        }
    }

    async fn run(&self, generation: u64, form: &SubmitForm) -> Result<SubmitOutcome> {
        let submission = form.validate()?;

        self.set_state(generation, SubmissionState::ResolvingStart).await;
        let start = match submission.start {
            StartInput::Coordinates(coordinate) => coordinate,
            StartInput::Address(address) => self.geocoder.geocode(&address).await?,
        };

        {
            let mut map = self.map.lock().await;
            if !self.is_current(generation) {
                return Ok(SubmitOutcome::Superseded { generation });
            }
            map.set_view(start, self.resolved_zoom);
        }

        let query = TravelQuery::from_minutes(start, submission.profile, submission.minutes)?;
        self.set_state(generation, SubmissionState::ResolvingIsochrone).await;
        let document = self.isochrones.fetch_isochrone(&query).await?;

        let overlay = {
            let mut map = self.map.lock().await;
            if !self.is_current(generation) {
                return Ok(SubmitOutcome::Superseded { generation });
            }
            let cleared = map.clear_overlays_by_tag(&OverlayTag::Isochrone);
            debug!(cleared, "Cleared previous isochrone overlays");
            map.draw_overlay(document, self.style.clone(), OverlayTag::Isochrone)
        };

        self.set_state(generation, SubmissionState::Idle).await;
        info!(generation, %start, overlay = overlay.0, "Isochrone drawn");

        Ok(SubmitOutcome::Drawn {
            generation,
            start,
            overlay,
        })
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Record `state` unless a newer submission has started. The check runs
    /// under the lock so an older generation can never overwrite a newer one.
    async fn set_state(&self, generation: u64, state: SubmissionState) {
        let mut current = self.state.lock().await;
        if generation >= current.0 && self.is_current(generation) {
            *current = (generation, state);
        }
    }
}
