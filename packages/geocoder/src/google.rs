//! Google Maps Geocoding API client.
//!
//! Each resolution is a single `GET` to the geocode endpoint with the
//! query, the API key, a viewport bias covering Morocco, and the `ma`
//! country-code bias. The first candidate is accepted only if it passes
//! the checks in [`crate::validate`].
//!
//! See <https://developers.google.com/maps/documentation/geocoding/requests-geocoding>

use std::time::Duration;

use async_trait::async_trait;
use school_map_school_models::{BoundingBox, Coordinate};

use crate::service_registry::GeocodingService;
use crate::validate::{check_candidate, mentions_region};
use crate::{GeocodeError, Geocoder, retry};

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// A parsed candidate, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The service's canonical address for the match.
    pub formatted_address: String,
    /// The match location.
    pub coordinate: Coordinate,
}

/// Client for the Google Maps Geocoding API.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    service: GeocodingService,
    api_key: String,
}

impl GoogleGeocoder {
    /// Creates a client for `service`, using its timeout for every request.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(
        service: GeocodingService,
        api_key: impl Into<String>,
    ) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent("school-map/1.0")
            .timeout(Duration::from_secs(service.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            service,
            api_key: api_key.into(),
        })
    }

    /// Creates a client whose key is read from [`API_KEY_ENV`].
    ///
    /// A missing key is not an error here; the service will reject the
    /// requests and every record will come back unresolved.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn from_env(service: GeocodingService) -> Result<Self, GeocodeError> {
        let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        if api_key.is_empty() {
            log::warn!("{API_KEY_ENV} is not set; geocoding requests will be denied");
        }
        Self::new(service, api_key)
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn service(&self) -> &GeocodingService {
        &self.service
    }

    /// Geocodes `query` and validates the first candidate.
    ///
    /// Returns `Ok(None)` when the service has no match or the match fails
    /// validation.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request fails, the body cannot be
    /// parsed, or the service reports an error status.
    pub async fn geocode(
        &self,
        query: &str,
        expected_region: Option<&str>,
    ) -> Result<Option<Coordinate>, GeocodeError> {
        let viewport = self.service.bounds.viewport();
        let body = retry::send_json(
            || {
                self.client.get(&self.service.base_url).query(&[
                    ("address", query),
                    ("key", self.api_key.as_str()),
                    ("bounds", viewport.as_str()),
                    ("region", self.service.region_code.as_str()),
                ])
            },
            self.service.max_retries,
            Duration::from_millis(self.service.retry_backoff_ms),
        )
        .await?;

        let Some(candidate) = parse_response(&body)? else {
            log::debug!("No match for '{query}'");
            return Ok(None);
        };

        if let Some(region) = expected_region.filter(|r| !r.trim().is_empty())
            && !mentions_region(&candidate.formatted_address, region)
        {
            log::warn!(
                "Result for '{query}' does not mention region '{region}': {}",
                candidate.formatted_address
            );
        }

        if let Err(rejection) = check_candidate(
            &candidate.formatted_address,
            candidate.coordinate,
            &self.service.country_indicators,
            &self.service.bounds,
        ) {
            log::warn!(
                "Rejected result for '{query}': {rejection} {} '{}'",
                candidate.coordinate,
                candidate.formatted_address
            );
            return Ok(None);
        }

        Ok(Some(candidate.coordinate))
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn resolve(&self, query: &str, expected_region: Option<&str>) -> Coordinate {
        if query.trim().is_empty() {
            return Coordinate::UNRESOLVED;
        }

        match self.geocode(query, expected_region).await {
            Ok(Some(coord)) => coord,
            Ok(None) => Coordinate::UNRESOLVED,
            Err(e) => {
                log::warn!("Error geocoding '{query}': {e}");
                Coordinate::UNRESOLVED
            }
        }
    }

    fn bounds(&self) -> BoundingBox {
        self.service.bounds
    }
}

/// Parses a Geocoding API response into its first candidate.
///
/// # Errors
///
/// Returns [`GeocodeError::RateLimited`] for `OVER_QUERY_LIMIT`,
/// [`GeocodeError::Status`] for any other non-`OK` status except
/// `ZERO_RESULTS`, and [`GeocodeError::Parse`] for a malformed body.
pub fn parse_response(body: &serde_json::Value) -> Result<Option<Candidate>, GeocodeError> {
    let status = body["status"].as_str().ok_or_else(|| GeocodeError::Parse {
        message: "Geocoding response missing 'status'".to_string(),
    })?;

    match status {
        "OK" => {}
        "ZERO_RESULTS" => return Ok(None),
        "OVER_QUERY_LIMIT" => return Err(GeocodeError::RateLimited),
        other => {
            return Err(GeocodeError::Status {
                status: other.to_string(),
                message: body["error_message"].as_str().unwrap_or_default().to_string(),
            });
        }
    }

    let Some(first) = body["results"].as_array().and_then(|r| r.first()) else {
        return Ok(None);
    };

    let lat = first
        .pointer("/geometry/location/lat")
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing geometry.location.lat in geocoding result".to_string(),
        })?;

    let lng = first
        .pointer("/geometry/location/lng")
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing geometry.location.lng in geocoding result".to_string(),
        })?;

    let formatted_address = first["formatted_address"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    Ok(Some(Candidate {
        formatted_address,
        coordinate: Coordinate::new(lat, lng),
    }))
}
