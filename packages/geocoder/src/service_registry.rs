//! Geocoding service configuration.
//!
//! The default configuration is defined in `services/google.toml` and
//! embedded at compile time. A different file can be loaded at runtime with
//! [`GeocodingService::from_file`] (e.g., to point at a stub endpoint or to
//! enable in-call retries).

use std::path::Path;

use school_map_school_models::BoundingBox;
use serde::Deserialize;

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"google"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Endpoint queried with `GET`.
    pub base_url: String,
    /// Country-code bias passed as the `region` parameter (e.g., `"ma"`).
    pub region_code: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after a transient transport failure.
    #[serde(default)]
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Accepted spellings of the country name in formatted addresses.
    pub country_indicators: Vec<String>,
    /// Viewport bias and authoritative acceptance region.
    pub bounds: BoundingBox,
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_retry_backoff_ms() -> u64 {
    1000
}

const GOOGLE_TOML: &str = include_str!("../services/google.toml");

impl GeocodingService {
    /// Parses a service definition from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a [`toml::de::Error`] if the TOML is malformed or missing
    /// required fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::de::from_str(toml_str)
    }

    /// Reads and parses a service definition from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&contents)?)
    }
}

/// Returns the embedded Google Maps configuration.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the config is embedded and covered by tests).
#[must_use]
pub fn google() -> GeocodingService {
    GeocodingService::from_toml(GOOGLE_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse geocoding service 'google': {e}"))
}
