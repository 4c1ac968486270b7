use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LookupError;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A city, region or country name, forwarded verbatim to the geocoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceQuery(String);

impl PlaceQuery {
    pub fn new(name: impl Into<String>) -> Result<Self, LookupError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LookupError::EmptyPlace);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Success,
    Error,
}

/// The only value handed back to the agent runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub status: ReportStatus,
    pub report: String,
}

impl WeatherReport {
    /// `temperature` is rendered as given, so callers pass the upstream number text.
    pub fn success(city: &str, condition: &str, temperature: impl fmt::Display) -> Self {
        Self {
            status: ReportStatus::Success,
            report: format!("{city}の現在の天気は{condition}で、気温は{temperature}度です。"),
        }
    }

    pub fn error(city: &str, failure: impl fmt::Display) -> Self {
        Self {
            status: ReportStatus::Error,
            report: format!("{city}の天気情報の取得に失敗しました: {failure}"),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ReportStatus::Success
    }
}
