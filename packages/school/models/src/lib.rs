#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! School record types shared across the school map pipeline.
//!
//! A [`SchoolRecord`] is the unit of work handed from the transform stage
//! to the geocoder and on to the load stage. Coordinates are expressed as
//! a [`Coordinate`], where [`Coordinate::UNRESOLVED`] (`0.0, 0.0`) marks a
//! record whose address could not be resolved.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which transliteration of a record's name and address to read.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Script {
    /// Primary variant (`name_latin`, `address_latin`).
    Latin,
    /// Secondary variant (`name_arabic`, `address_arabic`).
    Arabic,
}

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Sentinel meaning "not resolved".
    pub const UNRESOLVED: Self = Self {
        latitude: 0.0,
        longitude: 0.0,
    };

    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` if this is the [`Coordinate::UNRESOLVED`] sentinel.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_unresolved(self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// A rectangular latitude/longitude region, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southernmost latitude.
    pub south: f64,
    /// Northernmost latitude.
    pub north: f64,
    /// Westernmost longitude.
    pub west: f64,
    /// Easternmost longitude.
    pub east: f64,
}

/// Morocco, including Western Sahara.
pub const MOROCCO_BOUNDS: BoundingBox = BoundingBox {
    south: 21.0,
    north: 36.0,
    west: -17.5,
    east: -1.0,
};

impl BoundingBox {
    /// Returns `true` if the coordinate falls inside the box.
    #[must_use]
    pub fn contains(&self, coord: Coordinate) -> bool {
        (self.south..=self.north).contains(&coord.latitude)
            && (self.west..=self.east).contains(&coord.longitude)
    }

    /// Formats the box as a Google Maps viewport bias
    /// (`south,west|north,east`).
    #[must_use]
    pub fn viewport(&self) -> String {
        format!(
            "{},{}|{},{}",
            self.south, self.west, self.north, self.east
        )
    }
}

/// A single school as produced by the transform stage.
///
/// Text fields that are absent or `null` in the source JSON deserialize to
/// empty strings. Columns not modelled here are kept in [`Self::extra`] and
/// written back out untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchoolRecord {
    #[serde(default, deserialize_with = "nullable_string")]
    pub name_latin: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name_arabic: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub address_latin: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub address_arabic: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub commune: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub province: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub region: String,
    /// Public/private sector (e.g., `"public"`).
    #[serde(rename = "type", default, deserialize_with = "nullable_string")]
    pub school_type: String,
    /// Schooling level (e.g., `"primaire"`, `"college"`, `"lycee"`).
    #[serde(default, deserialize_with = "nullable_string")]
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Any additional columns carried through from the source sheet.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SchoolRecord {
    /// Name in the requested script.
    #[must_use]
    pub fn name(&self, script: Script) -> &str {
        match script {
            Script::Latin => &self.name_latin,
            Script::Arabic => &self.name_arabic,
        }
    }

    /// Street address in the requested script.
    #[must_use]
    pub fn address(&self, script: Script) -> &str {
        match script {
            Script::Latin => &self.address_latin,
            Script::Arabic => &self.address_arabic,
        }
    }

    /// Returns the record's coordinate if both halves are present.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        }
    }

    pub const fn set_coordinate(&mut self, coord: Coordinate) {
        self.latitude = Some(coord.latitude);
        self.longitude = Some(coord.longitude);
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
