//! Data models for the map controller
//!
//! - Coordinate: geographic points and `"lat, lon"` text parsing
//! - Travel: travel profiles and per-submit queries
//! - Overlay: overlay handles, tags, styles and the opaque geo document

pub mod coordinate;
pub mod overlay;
pub mod travel;

pub use coordinate::Coordinate;
pub use overlay::{GeoDocument, Overlay, OverlayId, OverlayStyle, OverlayTag};
pub use travel::{Profile, TravelQuery};
