//! Overlay handles, tags and styles

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque GeoJSON-compatible document, rendered as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoDocument(pub Value);

/// Handle of a drawn overlay, unique within a map session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayId(pub u64);

/// What an overlay represents, independent of how it looks
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum OverlayTag {
    Isochrone,
    Custom(String),
}

/// Stroke style of an overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    /// CSS color, e.g. `#ff7800`
    pub color: String,
    /// Stroke weight in pixels
    pub weight: f32,
    /// Stroke opacity (0.0-1.0)
    pub opacity: f32,
}

impl OverlayStyle {
    /// Style colors are compared without regard to case
    #[must_use]
    pub fn has_color(&self, color: &str) -> bool {
        self.color.eq_ignore_ascii_case(color)
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: "#ff7800".to_string(),
            weight: 2.0,
            opacity: 0.65,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub id: OverlayId,
    pub tag: OverlayTag,
    pub style: OverlayStyle,
    pub geometry: GeoDocument,
}
