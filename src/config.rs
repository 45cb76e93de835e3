//! Configuration management for the `reachmap` application
//!
//! Handles loading configuration from a TOML file and environment variables
//! and validates every setting before the clients are built. The isochrone
//! API key is only ever resolved here, at startup.

use crate::ReachMapError;
use crate::models::{Coordinate, OverlayStyle};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReachMapConfig {
    #[serde(default)]
    pub isochrone: IsochroneConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub overlay: OverlayStyle,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Isochrone service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsochroneConfig {
    /// API key sent in the `Authorization` header
    pub api_key: Option<String>,
    #[serde(default = "default_isochrone_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Geocoding service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_base_url")]
    pub base_url: String,
    /// Nominatim rejects requests without an identifying agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Map view defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_center_latitude")]
    pub center_latitude: f64,
    #[serde(default = "default_center_longitude")]
    pub center_longitude: f64,
    /// Zoom on startup
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    /// Zoom applied after a start point has been resolved
    #[serde(default = "default_resolved_zoom")]
    pub resolved_zoom: u8,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// HTTP surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the static page
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_isochrone_base_url() -> String {
    "https://api.openrouteservice.org".to_string()
}

fn default_geocoder_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("reachmap/{}", crate::VERSION)
}

fn default_timeout() -> u32 {
    30
}

fn default_center_latitude() -> f64 {
    51.505
}

fn default_center_longitude() -> f64 {
    -0.09
}

fn default_zoom() -> u8 {
    13
}

fn default_resolved_zoom() -> u8 {
    14
}

fn default_max_zoom() -> u8 {
    19
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_attribution() -> String {
    "&copy; OpenStreetMap contributors".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    "frontend".to_string()
}

impl Default for IsochroneConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_isochrone_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_base_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_latitude: default_center_latitude(),
            center_longitude: default_center_longitude(),
            zoom: default_zoom(),
            resolved_zoom: default_resolved_zoom(),
            max_zoom: default_max_zoom(),
            tile_url: default_tile_url(),
            attribution: default_attribution(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl MapConfig {
    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.center_latitude, self.center_longitude)
    }
}

impl ReachMapConfig {
    /// Load configuration from a file, then apply `REACHMAP_` environment
    /// overrides, e.g. `REACHMAP_ISOCHRONE__API_KEY`.
    ///
    /// An explicitly given file must exist. Without one, the default location
    /// is used if present.
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let (config_file, required) = match config_path {
            Some(path) => (path, true),
            None => (
                Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml")),
                false,
            ),
        };

        if required || config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(required)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("REACHMAP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ReachMapConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("reachmap").join("config.toml"))
    }

    /// Replace empty or zero values with defaults
    pub fn apply_defaults(&mut self) {
        if self.isochrone.base_url.is_empty() {
            self.isochrone.base_url = default_isochrone_base_url();
        }
        if self.isochrone.timeout_seconds == 0 {
            self.isochrone.timeout_seconds = default_timeout();
        }
        if self.geocoder.base_url.is_empty() {
            self.geocoder.base_url = default_geocoder_base_url();
        }
        if self.geocoder.user_agent.is_empty() {
            self.geocoder.user_agent = default_user_agent();
        }
        if self.geocoder.timeout_seconds == 0 {
            self.geocoder.timeout_seconds = default_timeout();
        }
        if self.map.max_zoom == 0 {
            self.map.max_zoom = default_max_zoom();
        }
        if self.map.tile_url.is_empty() {
            self.map.tile_url = default_tile_url();
        }
        if self.overlay.color.is_empty() {
            self.overlay.color = OverlayStyle::default().color;
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// The isochrone API key, which the running application cannot do without
    pub fn require_api_key(&self) -> Result<&str> {
        match self.isochrone.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ReachMapError::config(
                "Isochrone API key is missing. Set REACHMAP_ISOCHRONE__API_KEY or isochrone.api_key.",
            )
            .into()),
        }
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.isochrone.timeout_seconds > 300 || self.geocoder.timeout_seconds > 300 {
            return Err(ReachMapError::config("Request timeout cannot exceed 300 seconds").into());
        }

        if self.map.max_zoom > 22 {
            return Err(ReachMapError::config("Maximum zoom cannot exceed 22").into());
        }

        if self.map.zoom > self.map.max_zoom || self.map.resolved_zoom > self.map.max_zoom {
            return Err(ReachMapError::config("Map zoom cannot exceed the maximum zoom").into());
        }

        if !self.map.center().is_within_bounds() {
            return Err(ReachMapError::config(format!(
                "Map center {} is outside valid latitude/longitude ranges",
                self.map.center()
            ))
            .into());
        }

        if !(0.0..=1.0).contains(&self.overlay.opacity) {
            return Err(ReachMapError::config("Overlay opacity must be between 0 and 1").into());
        }

        if self.overlay.weight <= 0.0 {
            return Err(ReachMapError::config("Overlay weight must be positive").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ReachMapError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ReachMapError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Isochrone", &self.isochrone.base_url),
            ("Geocoder", &self.geocoder.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ReachMapError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
