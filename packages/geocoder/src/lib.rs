#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding for school records.
//!
//! Turns a [`SchoolRecord`](school_map_school_models::SchoolRecord) into a
//! free-text address query ([`address::build_query`]) and resolves that
//! query to a coordinate through the Google Maps Geocoding API
//! ([`google::GoogleGeocoder`]).
//!
//! Resolution never fails from the caller's point of view: every error,
//! empty query, or implausible result collapses to
//! [`Coordinate::UNRESOLVED`]. Results are accepted only if the formatted
//! address names Morocco and the coordinate falls inside the configured
//! bounding box (see [`validate`]).

pub mod address;
pub mod google;
pub mod retry;
pub mod service_registry;
pub mod validate;

#[cfg(test)]
pub(crate) mod stub_server;

use async_trait::async_trait;
use school_map_school_models::{BoundingBox, Coordinate};
use thiserror::Error;

/// Resolves a free-text address query to a coordinate.
///
/// Implementations must be infallible from the caller's side: anything
/// that prevents a trustworthy in-bounds answer is reported as
/// [`Coordinate::UNRESOLVED`].
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves `query`, optionally logging a soft warning when the result
    /// does not mention `expected_region`.
    async fn resolve(&self, query: &str, expected_region: Option<&str>) -> Coordinate;

    /// Region every accepted coordinate falls within.
    fn bounds(&self) -> BoundingBox;
}

/// Errors from geocoding operations.
///
/// These never escape [`Geocoder::resolve`]; they are logged and mapped to
/// the sentinel coordinate.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The service answered with a non-success status.
    #[error("Service returned status {status}: {message}")]
    Status {
        /// Status string reported by the service (e.g., `REQUEST_DENIED`).
        status: String,
        /// Optional explanation from the service.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}
