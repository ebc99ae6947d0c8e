//! Google Distance Matrix HTTP adapter.

use std::env;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, ProviderError};
use crate::matrix::DistanceMatrix;
use crate::traits::{DepartureTime, DistanceMatrixProvider, TravelMode};

pub const DISTANCE_MATRIX_API_URL: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

#[derive(Debug, Clone)]
pub struct GoogleMapsConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GoogleMapsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DISTANCE_MATRIX_API_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl GoogleMapsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Reads `GOOGLE_MAPS_API_KEY`, and optionally `GOOGLE_MAPS_BASE_URL` and
    /// `GOOGLE_MAPS_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(None, |name| env::var(name).ok())
    }

    /// Like [`GoogleMapsConfig::from_env`], with the key supplied by the caller.
    pub fn from_env_with_key(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Self::from_lookup(Some(api_key.into()), |name| env::var(name).ok())
    }

    fn from_lookup<F>(api_key: Option<String>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = api_key
            .or_else(|| lookup("GOOGLE_MAPS_API_KEY"))
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        let mut config = Self::new(api_key);

        if let Some(base_url) = lookup("GOOGLE_MAPS_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(timeout) = lookup("GOOGLE_MAPS_TIMEOUT_SECS") {
            config.timeout_secs = timeout
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(timeout.clone()))?;
        }

        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    config: GoogleMapsConfig,
    client: reqwest::blocking::Client,
}

impl GoogleMapsClient {
    pub fn new(config: GoogleMapsConfig) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Query parameters for one cross-product request, key included.
    fn query(&self, destinations: &[String], mode: TravelMode, departure: DepartureTime) -> Vec<(&'static str, String)> {
        let joined = destinations.join("|");
        vec![
            ("origins", joined.clone()),
            ("destinations", joined),
            ("mode", mode.to_string()),
            ("departure_time", departure.to_string()),
            ("key", self.config.api_key.clone()),
        ]
    }
}

impl DistanceMatrixProvider for GoogleMapsClient {
    fn matrix_for(
        &self,
        destinations: &[String],
        mode: TravelMode,
        departure: DepartureTime,
    ) -> Result<DistanceMatrix, ProviderError> {
        if destinations.is_empty() {
            return Ok(DistanceMatrix::default());
        }

        debug!(
            destinations = destinations.len(),
            %mode,
            %departure,
            "requesting distance matrix"
        );

        let body = self
            .client
            .get(&self.config.base_url)
            .query(&self.query(destinations, mode, departure))
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            // The URL carries the API key in its query string.
            .map_err(|err| ProviderError::Request(err.without_url()))?;

        parse_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(flatten)]
    matrix: DistanceMatrix,
}

fn parse_response(body: &str) -> Result<DistanceMatrix, ProviderError> {
    let response: DistanceMatrixResponse = serde_json::from_str(body)?;
    if response.status != "OK" {
        return Err(ProviderError::Api {
            status: response.status,
            message: response.error_message.unwrap_or_default(),
        });
    }
    debug!(rows = response.matrix.len(), "distance matrix received");
    Ok(response.matrix)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::matrix::ElementStatus;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_missing_key() {
        let result = GoogleMapsConfig::from_lookup(None, lookup_in(&[("GOOGLE_MAPS_API_KEY", "  ")]));
        assert_eq!(result.unwrap_err(), ConfigError::MissingApiKey);
    }

    #[test]
    fn test_config_reads_key_and_overrides() {
        let config = GoogleMapsConfig::from_lookup(
            None,
            lookup_in(&[
                ("GOOGLE_MAPS_API_KEY", "env-key"),
                ("GOOGLE_MAPS_BASE_URL", "http://proxy.local/matrix"),
                ("GOOGLE_MAPS_TIMEOUT_SECS", " 30 "),
            ]),
        )
        .unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.base_url, "http://proxy.local/matrix");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_config_explicit_key_keeps_env_overrides() {
        let config = GoogleMapsConfig::from_lookup(
            Some("flag-key".to_string()),
            lookup_in(&[("GOOGLE_MAPS_BASE_URL", "http://proxy.local/matrix")]),
        )
        .unwrap();
        assert_eq!(config.api_key, "flag-key");
        assert_eq!(config.base_url, "http://proxy.local/matrix");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_config_bad_timeout() {
        let result = GoogleMapsConfig::from_lookup(
            Some("flag-key".to_string()),
            lookup_in(&[("GOOGLE_MAPS_TIMEOUT_SECS", "soon")]),
        );
        assert_eq!(result.unwrap_err(), ConfigError::InvalidTimeout("soon".to_string()));
    }

    #[test]
    fn test_query_joins_destinations_with_pipes() {
        let client = GoogleMapsClient::new(GoogleMapsConfig::new("secret")).unwrap();
        let destinations = vec!["Paris".to_string(), "Lyon".to_string(), "Nice".to_string()];
        let query = client.query(&destinations, TravelMode::Transit, DepartureTime::At(1_700_000_000));

        assert_eq!(
            query,
            vec![
                ("origins", "Paris|Lyon|Nice".to_string()),
                ("destinations", "Paris|Lyon|Nice".to_string()),
                ("mode", "transit".to_string()),
                ("departure_time", "1700000000".to_string()),
                ("key", "secret".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_ok_response() {
        let body = r#"{
            "status": "OK",
            "origin_addresses": ["Paris, France", "Lyon, France"],
            "destination_addresses": ["Paris, France", "Lyon, France"],
            "rows": [
                {"elements": [
                    {"status": "OK", "distance": {"text": "1 m", "value": 1}, "duration": {"text": "1 min", "value": 1}},
                    {"status": "OK", "distance": {"text": "465 km", "value": 465000}, "duration": {"text": "4 hours 30 mins", "value": 16200}}
                ]},
                {"elements": [
                    {"status": "ZERO_RESULTS"},
                    {"status": "OK", "distance": {"text": "1 m", "value": 1}, "duration": {"text": "1 min", "value": 1}}
                ]}
            ]
        }"#;
        let matrix = parse_response(body).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.origin_addresses[1], "Lyon, France");
        assert_eq!(matrix.duration_text(0, 1), Some("4 hours 30 mins"));
        assert_eq!(matrix.element(1, 0).unwrap().status, ElementStatus::ZeroResults);
    }

    #[test]
    fn test_parse_error_status() {
        let body = r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid.", "rows": []}"#;
        match parse_response(body) {
            Err(ProviderError::Api { status, message }) => {
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message, "The provided API key is invalid.");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_garbage_is_decode_error() {
        assert!(matches!(parse_response("<html>"), Err(ProviderError::Decode(_))));
    }

    #[test]
    fn test_empty_destinations_skip_request() {
        let config = GoogleMapsConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..GoogleMapsConfig::new("unused")
        };
        let client = GoogleMapsClient::new(config).unwrap();
        let matrix = client
            .matrix_for(&[], TravelMode::Driving, DepartureTime::Now)
            .unwrap();
        assert!(matrix.is_empty());
    }
}
