//! Coordinate resolution: place name in, latitude/longitude out.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::{
    Config,
    error::truncate_body,
    model::{Coordinates, PlaceQuery},
};

/// Outcome of a single geocoding attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(Coordinates),
    /// No API key; no request was made.
    NotConfigured,
    /// The geocoder answered, but with a non-`OK` status or no results.
    NotFound { status: String, results: usize },
    /// Connection error, timeout, non-2xx status or undecodable body.
    Transport(String),
}

impl Resolution {
    /// Collapse to the unresolved sentinel (`None`) for every failure cause.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Resolution::Resolved(c) => Some(*c),
            _ => None,
        }
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Never fails; every failure is a [`Resolution`] variant.
    async fn resolve(&self, place: &PlaceQuery) -> Resolution;
}

/// Google Geocoding API client.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    api_key: Option<String>,
    url: String,
    language: String,
    http: Client,
}

impl GoogleGeocoder {
    pub fn new(config: &Config, http: Client) -> Self {
        Self {
            api_key: config.api_key().map(str::to_owned),
            url: config.geocoding_url.clone(),
            language: config.language.clone(),
            http,
        }
    }

    async fn fetch(&self, api_key: &str, place: &PlaceQuery) -> Result<GeocodeResponse, String> {
        let res = self
            .http
            .get(&self.url)
            .query(&[
                ("address", place.as_str()),
                ("key", api_key),
                ("language", self.language.as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = res.status();
        debug!(%status, "geocoding response received");

        let body = res.text().await.map_err(|e| e.to_string())?;

        if !status.is_success() {
            return Err(format!(
                "geocoding request failed with status {}: {}",
                status,
                truncate_body(&body)
            ));
        }

        serde_json::from_str(&body).map_err(|e| format!("failed to parse geocoding response: {e}"))
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn resolve(&self, place: &PlaceQuery) -> Resolution {
        debug!(place = %place, api_key_set = self.api_key.is_some(), "resolving coordinates");

        let Some(api_key) = self.api_key.as_deref() else {
            debug!("no API key configured, skipping geocoding");
            return Resolution::NotConfigured;
        };

        let parsed = match self.fetch(api_key, place).await {
            Ok(parsed) => parsed,
            Err(message) => {
                warn!(place = %place, error = %message, "geocoding request failed");
                return Resolution::Transport(message);
            }
        };

        if parsed.status != "OK" {
            debug!(
                status = %parsed.status,
                results = parsed.results.len(),
                "geocoding returned no match"
            );
            return Resolution::NotFound {
                status: parsed.status,
                results: parsed.results.len(),
            };
        }

        // Only the first result is typed; later entries may have any shape.
        let Some(first) = parsed.results.into_iter().next() else {
            return Resolution::NotFound {
                status: parsed.status,
                results: 0,
            };
        };

        match serde_json::from_value::<GeocodeResult>(first) {
            Ok(result) => {
                let location = result.geometry.location;
                debug!(lat = location.latitude, lng = location.longitude, "coordinates resolved");
                Resolution::Resolved(location)
            }
            Err(e) => {
                let message = format!("failed to parse first geocoding result: {e}");
                warn!(place = %place, error = %message, "geocoding result malformed");
                Resolution::Transport(message)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: Coordinates,
}
