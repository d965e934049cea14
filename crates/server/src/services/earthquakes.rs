//! Server-side proxy of the INGV FDSN earthquake feed.
//!
//! The operations-center map polls `/api/earthquakes`, which fetches the
//! recent-events window from INGV and reshapes the GeoJSON into the compact
//! form the map expects. Proxying keeps the upstream URL and rate out of
//! the browser.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const INGV_ENDPOINT: &str = "https://webservices.ingv.it/fdsnws/event/1/query";
const DEFAULT_WINDOW_DAYS: i64 = 7;
const MIN_MAGNITUDE: f64 = 2.0;
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Earthquake feed errors.
#[derive(Debug, Error)]
pub enum EarthquakeError {
    #[error("INGV request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("INGV returned status {0}")]
    Status(reqwest::StatusCode),
}

/// One earthquake, reshaped for the map overlay.
#[derive(Debug, Clone, Serialize)]
pub struct Earthquake {
    pub time: String,
    pub magnitude: f64,
    pub place: String,
    pub latitude: f64,
    pub longitude: f64,
    pub depth_km: f64,
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: FeatureProperties,
    geometry: FeatureGeometry,
}

#[derive(Deserialize)]
struct FeatureProperties {
    mag: Option<f64>,
    place: Option<String>,
    time: Option<String>,
}

#[derive(Deserialize)]
struct FeatureGeometry {
    /// `[longitude, latitude, depth_km]`
    coordinates: Vec<f64>,
}

/// Client for the INGV FDSN event web service.
#[derive(Clone)]
pub struct EarthquakeClient {
    client: reqwest::Client,
    endpoint: String,
}

impl EarthquakeClient {
    /// Create a client against the public INGV endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_endpoint(INGV_ENDPOINT.to_string())
    }

    /// Create a client against a custom endpoint, for tests.
    #[must_use]
    pub fn with_endpoint(endpoint: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self { client, endpoint }
    }

    /// Fetch recent events above the magnitude floor, newest first.
    ///
    /// # Errors
    ///
    /// Returns `EarthquakeError` when INGV is unreachable or answers with a
    /// non-success status.
    pub async fn recent(&self) -> Result<Vec<Earthquake>, EarthquakeError> {
        let start = (Utc::now() - Duration::days(DEFAULT_WINDOW_DAYS))
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("format", "geojson"),
                ("starttime", start.as_str()),
                ("minmag", &MIN_MAGNITUDE.to_string()),
                ("orderby", "time"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EarthquakeError::Status(response.status()));
        }

        let collection: FeatureCollection = response.json().await?;
        Ok(collection
            .features
            .into_iter()
            .filter_map(reshape_feature)
            .collect())
    }
}

impl Default for EarthquakeClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop malformed features instead of failing the whole feed.
fn reshape_feature(feature: Feature) -> Option<Earthquake> {
    let [longitude, latitude, depth_km] = *feature.geometry.coordinates.as_slice() else {
        return None;
    };
    Some(Earthquake {
        time: feature.properties.time.unwrap_or_default(),
        magnitude: feature.properties.mag?,
        place: feature.properties.place.unwrap_or_default(),
        latitude,
        longitude,
        depth_km,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reshape_drops_features_without_magnitude() {
        let feature = Feature {
            properties: FeatureProperties {
                mag: None,
                place: Some("Centro Italia".to_string()),
                time: None,
            },
            geometry: FeatureGeometry {
                coordinates: vec![13.2, 42.7, 8.5],
            },
        };
        assert!(reshape_feature(feature).is_none());
    }

    #[test]
    fn reshape_maps_coordinate_order() {
        let feature = Feature {
            properties: FeatureProperties {
                mag: Some(3.1),
                place: Some("Costa Siciliana".to_string()),
                time: Some("2025-01-01T00:00:00".to_string()),
            },
            geometry: FeatureGeometry {
                coordinates: vec![15.0, 37.5, 12.0],
            },
        };

        let quake = reshape_feature(feature).expect("valid feature");
        assert!((quake.longitude - 15.0).abs() < f64::EPSILON);
        assert!((quake.latitude - 37.5).abs() < f64::EPSILON);
        assert!((quake.depth_km - 12.0).abs() < f64::EPSILON);
    }
}
