//! Map session
//!
//! The session is the single owner of everything the map widget shows:
//! view, tile layer, start marker, overlays and the address text field.
//! Callers mutate it only through the methods below and render it through
//! [`MapSnapshot`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MapConfig;
use crate::models::{Coordinate, GeoDocument, Overlay, OverlayId, OverlayStyle, OverlayTag};

/// Tile imagery source for the base map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    /// URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders
    pub url_template: String,
    pub max_zoom: u8,
    pub attribution: String,
}

impl From<&MapConfig> for TileLayer {
    fn from(config: &MapConfig) -> Self {
        Self {
            url_template: config.tile_url.clone(),
            max_zoom: config.max_zoom,
            attribution: config.attribution.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(pub u64);

/// The single start-point marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartMarker {
    pub id: MarkerId,
    pub position: Coordinate,
}

/// Serializable view of a session, consumed by the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub center: Coordinate,
    pub zoom: u8,
    pub tile_layer: TileLayer,
    pub start_marker: Option<StartMarker>,
    pub overlays: Vec<Overlay>,
    pub address_text: String,
}

#[derive(Debug)]
pub struct MapSession {
    center: Coordinate,
    zoom: u8,
    tile_layer: TileLayer,
    start_marker: Option<StartMarker>,
    /// Kept in draw order
    overlays: Vec<Overlay>,
    address_text: String,
    next_overlay_id: u64,
    next_marker_id: u64,
}

impl MapSession {
    /// Create the map centered at `center`; zoom is clamped to the tile layer's maximum
    #[must_use]
    pub fn initialize(center: Coordinate, zoom: u8, tile_layer: TileLayer) -> Self {
        let zoom = zoom.min(tile_layer.max_zoom);
        debug!(%center, zoom, tiles = %tile_layer.url_template, "Initializing map session");
        Self {
            center,
            zoom,
            tile_layer,
            start_marker: None,
            overlays: Vec::new(),
            address_text: String::new(),
            next_overlay_id: 1,
            next_marker_id: 1,
        }
    }

    #[must_use]
    pub fn from_config(config: &MapConfig) -> Self {
        Self::initialize(config.center(), config.zoom, TileLayer::from(config))
    }

    /// Place the start marker at the clicked point and publish it as the
    /// address text, overwriting whatever was typed. Returns the new text.
    pub fn on_map_click(&mut self, coordinate: Coordinate) -> String {
        self.set_start_marker(coordinate);
        self.address_text = coordinate.to_string();
        self.address_text.clone()
    }

    /// Replace the start marker; the previous one, if any, is destroyed
    pub fn set_start_marker(&mut self, position: Coordinate) -> MarkerId {
        let id = MarkerId(self.next_marker_id);
        self.next_marker_id += 1;
        if let Some(previous) = self.start_marker.replace(StartMarker { id, position }) {
            debug!(marker = previous.id.0, "Removed previous start marker");
        }
        id
    }

    pub fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.center = center;
        self.zoom = zoom.min(self.tile_layer.max_zoom);
    }

    /// Remove every overlay whose style color matches. Returns how many were removed.
    pub fn clear_overlays_by_style(&mut self, color: &str) -> usize {
        self.remove_where(|overlay| overlay.style.has_color(color))
    }

    /// Remove every overlay carrying `tag`. Returns how many were removed.
    pub fn clear_overlays_by_tag(&mut self, tag: &OverlayTag) -> usize {
        self.remove_where(|overlay| &overlay.tag == tag)
    }

    /// Remove exactly one overlay by handle
    pub fn remove_overlay(&mut self, id: OverlayId) -> bool {
        self.remove_where(|overlay| overlay.id == id) > 0
    }

    pub fn draw_overlay(
        &mut self,
        geometry: GeoDocument,
        style: OverlayStyle,
        tag: OverlayTag,
    ) -> OverlayId {
        let id = OverlayId(self.next_overlay_id);
        self.next_overlay_id += 1;
        debug!(overlay = id.0, ?tag, color = %style.color, "Drawing overlay");
        self.overlays.push(Overlay {
            id,
            tag,
            style,
            geometry,
        });
        id
    }

    fn remove_where(&mut self, predicate: impl Fn(&Overlay) -> bool) -> usize {
        let before = self.overlays.len();
        self.overlays.retain(|overlay| !predicate(overlay));
        let removed = before - self.overlays.len();
        if removed > 0 {
            debug!(removed, "Removed overlays");
        }
        removed
    }

    #[must_use]
    pub fn center(&self) -> Coordinate {
        self.center
    }

    #[must_use]
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    #[must_use]
    pub fn tile_layer(&self) -> &TileLayer {
        &self.tile_layer
    }

    #[must_use]
    pub fn start_marker(&self) -> Option<&StartMarker> {
        self.start_marker.as_ref()
    }

    #[must_use]
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn overlays_with_tag<'a>(&'a self, tag: &'a OverlayTag) -> impl Iterator<Item = &'a Overlay> {
        self.overlays.iter().filter(move |overlay| &overlay.tag == tag)
    }

    #[must_use]
    pub fn address_text(&self) -> &str {
        &self.address_text
    }

    /// What the user typed into the address field
    pub fn set_address_text(&mut self, text: impl Into<String>) {
        self.address_text = text.into();
    }

    #[must_use]
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            center: self.center,
            zoom: self.zoom,
            tile_layer: self.tile_layer.clone(),
            start_marker: self.start_marker.clone(),
            overlays: self.overlays.clone(),
            address_text: self.address_text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> MapSession {
        MapSession::from_config(&MapConfig::default())
    }

    fn polygon() -> GeoDocument {
        GeoDocument(json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]]}))
    }

    #[test]
    fn test_initialize_defaults() {
        let map = session();
        assert_eq!(map.center(), Coordinate::new(51.505, -0.09));
        assert_eq!(map.zoom(), 13);
        assert_eq!(map.tile_layer().max_zoom, 19);
        assert!(map.start_marker().is_none());
        assert!(map.overlays().is_empty());
    }

    #[test]
    fn test_zoom_is_clamped_to_max_zoom() {
        let mut map = MapSession::initialize(
            Coordinate::new(0.0, 0.0),
            25,
            TileLayer::from(&MapConfig::default()),
        );
        assert_eq!(map.zoom(), 19);
        map.set_view(Coordinate::new(1.0, 1.0), 30);
        assert_eq!(map.zoom(), 19);
    }

    #[test]
    fn test_click_replaces_marker_and_overwrites_address() {
        let mut map = session();
        map.set_address_text("10 Downing Street");

        let first = map.on_map_click(Coordinate::new(51.5, -0.1));
        assert_eq!(first, "51.5, -0.1");
        let first_marker = map.start_marker().unwrap().id;

        let second = map.on_map_click(Coordinate::new(48.85, 2.35));
        assert_eq!(second, "48.85, 2.35");
        assert_eq!(map.address_text(), "48.85, 2.35");

        let marker = map.start_marker().unwrap();
        assert_ne!(marker.id, first_marker);
        assert_eq!(marker.position, Coordinate::new(48.85, 2.35));
    }

    #[test]
    fn test_set_view() {
        let mut map = session();
        map.set_view(Coordinate::new(40.0, -74.0), 14);
        assert_eq!(map.center(), Coordinate::new(40.0, -74.0));
        assert_eq!(map.zoom(), 14);
    }

    #[test]
    fn test_draw_returns_unique_handles() {
        let mut map = session();
        let a = map.draw_overlay(polygon(), OverlayStyle::default(), OverlayTag::Isochrone);
        let b = map.draw_overlay(polygon(), OverlayStyle::default(), OverlayTag::Isochrone);
        assert_ne!(a, b);
        assert_eq!(map.overlays().len(), 2);
    }

    #[test]
    fn test_clear_by_tag_leaves_same_colored_custom_overlay() {
        let mut map = session();
        map.draw_overlay(polygon(), OverlayStyle::default(), OverlayTag::Isochrone);
        map.draw_overlay(polygon(), OverlayStyle::default(), OverlayTag::Isochrone);
        let custom = map.draw_overlay(
            polygon(),
            OverlayStyle::default(),
            OverlayTag::Custom("route".into()),
        );

        assert_eq!(map.clear_overlays_by_tag(&OverlayTag::Isochrone), 2);
        assert_eq!(map.clear_overlays_by_tag(&OverlayTag::Isochrone), 0);
        assert_eq!(map.overlays().len(), 1);
        assert_eq!(map.overlays()[0].id, custom);
    }

    #[test]
    fn test_clear_by_style_matches_any_tag() {
        let mut map = session();
        map.draw_overlay(polygon(), OverlayStyle::default(), OverlayTag::Isochrone);
        map.draw_overlay(polygon(), OverlayStyle::default(), OverlayTag::Custom("x".into()));
        let blue = OverlayStyle {
            color: "#0000ff".into(),
            ..OverlayStyle::default()
        };
        map.draw_overlay(polygon(), blue, OverlayTag::Isochrone);

        assert_eq!(map.clear_overlays_by_style("#FF7800"), 2);
        assert_eq!(map.overlays().len(), 1);
        assert!(map.overlays()[0].style.has_color("#0000ff"));
    }

    #[test]
    fn test_remove_overlay_by_handle() {
        let mut map = session();
        let a = map.draw_overlay(polygon(), OverlayStyle::default(), OverlayTag::Isochrone);
        let b = map.draw_overlay(polygon(), OverlayStyle::default(), OverlayTag::Isochrone);
        assert!(map.remove_overlay(a));
        assert!(!map.remove_overlay(a));
        assert_eq!(map.overlays_with_tag(&OverlayTag::Isochrone).count(), 1);
        assert_eq!(map.overlays()[0].id, b);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut map = session();
        map.on_map_click(Coordinate::new(51.5, -0.1));
        map.draw_overlay(polygon(), OverlayStyle::default(), OverlayTag::Isochrone);
        let value = serde_json::to_value(map.snapshot()).unwrap();
        assert_eq!(value["address_text"], "51.5, -0.1");
        assert_eq!(value["overlays"][0]["style"]["color"], "#ff7800");
        assert_eq!(value["overlays"][0]["geometry"]["type"], "Polygon");
        assert_eq!(value["tile_layer"]["max_zoom"], 19);
    }
}
