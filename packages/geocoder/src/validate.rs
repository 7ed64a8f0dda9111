//! Plausibility checks applied to geocoding candidates.
//!
//! Two gates decide whether a candidate is accepted:
//!
//! 1. **Textual**: the formatted address must mention the country in at
//!    least one of the configured spellings.
//! 2. **Geographic**: the coordinate must fall inside the bounding box.
//!    This is the authoritative check and runs even when the service
//!    reports success and the text looks right.
//!
//! A missing region name in the formatted address is only reported, never
//! used to reject a candidate.

use school_map_school_models::{BoundingBox, Coordinate};

/// Why a candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The formatted address does not name the country.
    WrongCountry,
    /// The coordinate lies outside the bounding box.
    OutOfBounds,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongCountry => f.write_str("formatted address is not in the expected country"),
            Self::OutOfBounds => f.write_str("coordinates outside bounding box"),
        }
    }
}

/// Returns `true` if `formatted_address` contains any of `indicators`,
/// ignoring case.
#[must_use]
pub fn mentions_country(formatted_address: &str, indicators: &[String]) -> bool {
    let haystack = formatted_address.to_lowercase();
    indicators
        .iter()
        .any(|indicator| haystack.contains(&indicator.to_lowercase()))
}

/// Returns `true` if `formatted_address` contains `region`, ignoring case.
#[must_use]
pub fn mentions_region(formatted_address: &str, region: &str) -> bool {
    formatted_address
        .to_lowercase()
        .contains(&region.trim().to_lowercase())
}

/// Runs both acceptance gates on a candidate.
///
/// # Errors
///
/// Returns the first [`Rejection`] the candidate fails.
pub fn check_candidate(
    formatted_address: &str,
    coord: Coordinate,
    indicators: &[String],
    bounds: &BoundingBox,
) -> Result<(), Rejection> {
    if !mentions_country(formatted_address, indicators) {
        return Err(Rejection::WrongCountry);
    }
    if !bounds.contains(coord) {
        return Err(Rejection::OutOfBounds);
    }
    Ok(())
}
