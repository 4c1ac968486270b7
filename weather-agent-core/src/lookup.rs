//! Current-conditions lookup chained after coordinate resolution.

use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    Config,
    error::{LookupError, truncate_body},
    geocode::{Geocoder, GoogleGeocoder},
    model::{Coordinates, PlaceQuery, WeatherReport},
};

/// Parsed current conditions; only the fields the report needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditions {
    /// Kept as the upstream number so `18` is not rendered as `18.0`.
    pub temperature: serde_json::Number,
    pub description: String,
}

#[derive(Debug)]
pub struct WeatherLookup {
    geocoder: Box<dyn Geocoder>,
    api_key: Option<String>,
    url: String,
    http: Client,
}

impl WeatherLookup {
    /// Wire up the Google geocoder and the weather endpoint from one config.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = config.http_client()?;
        let geocoder = GoogleGeocoder::new(config, http.clone());
        Ok(Self::with_geocoder(config, Box::new(geocoder), http))
    }

    pub fn with_geocoder(config: &Config, geocoder: Box<dyn Geocoder>, http: Client) -> Self {
        Self {
            geocoder,
            api_key: config.api_key().map(str::to_owned),
            url: config.weather_url.clone(),
            http,
        }
    }

    /// Produce a report for `city`; every failure becomes an error report.
    pub async fn get_weather(&self, city: &str) -> WeatherReport {
        match self.lookup(city).await {
            Ok(conditions) => {
                WeatherReport::success(city, &conditions.description, &conditions.temperature)
            }
            Err(err) => {
                warn!(city, error = %err, "weather lookup failed");
                WeatherReport::error(city, err)
            }
        }
    }

    /// Resolve `city` and fetch its current conditions.
    pub async fn lookup(&self, city: &str) -> Result<Conditions, LookupError> {
        let place = PlaceQuery::new(city)?;
        let resolution = self.geocoder.resolve(&place).await;
        debug!(?resolution, "coordinate resolution finished");

        // Unresolved coordinates still go to the weather service.
        self.fetch_conditions(resolution.coordinates()).await
    }

    /// Query current conditions; absent coordinates or key are left out of the query.
    pub async fn fetch_conditions(
        &self,
        coordinates: Option<Coordinates>,
    ) -> Result<Conditions, LookupError> {
        let mut query: Vec<(&str, String)> = Vec::with_capacity(3);
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }
        if let Some(c) = coordinates {
            query.push(("location.latitude", c.latitude.to_string()));
            query.push(("location.longitude", c.longitude.to_string()));
        }

        let res = self.http.get(&self.url).query(&query).send().await?;

        let status = res.status();
        let body = res.text().await?;
        debug!(%status, "weather response received");

        if !status.is_success() {
            return Err(LookupError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: ConditionsResponse = serde_json::from_str(&body)?;
        parsed.into_conditions()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConditionsResponse {
    /// Only logged, so any shape is accepted.
    current_time: Option<serde_json::Value>,
    temperature: Option<Temperature>,
    weather_condition: Option<WeatherCondition>,
}

#[derive(Debug, Deserialize)]
struct Temperature {
    degrees: Option<serde_json::Number>,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    description: Option<LocalizedText>,
}

#[derive(Debug, Deserialize)]
struct LocalizedText {
    text: Option<String>,
}

impl ConditionsResponse {
    fn into_conditions(self) -> Result<Conditions, LookupError> {
        let temperature = self
            .temperature
            .and_then(|t| t.degrees)
            .ok_or(LookupError::MissingField("temperature.degrees"))?;

        let description = self
            .weather_condition
            .and_then(|w| w.description)
            .and_then(|d| d.text)
            .ok_or(LookupError::MissingField("weatherCondition.description.text"))?;

        match self.current_time.as_ref().and_then(|v| v.as_str()) {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(at) => debug!(observed_at = %at, "conditions timestamp"),
                Err(e) => debug!(raw, error = %e, "unparseable conditions timestamp"),
            },
            None => debug!("conditions carry no timestamp"),
        }

        Ok(Conditions {
            temperature,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::Resolution;
    use async_trait::async_trait;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    /// Geocoder returning a fixed resolution without any I/O.
    #[derive(Debug)]
    struct FixedGeocoder(Resolution);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn resolve(&self, _place: &PlaceQuery) -> Resolution {
            self.0.clone()
        }
    }

    fn lookup_for(server: &MockServer, resolution: Resolution) -> WeatherLookup {
        let config = Config {
            api_key: Some("KEY".into()),
            weather_url: format!("{}/v1/currentConditions:lookup", server.uri()),
            ..Config::default()
        };
        WeatherLookup::with_geocoder(&config, Box::new(FixedGeocoder(resolution)), Client::new())
    }

    fn san_francisco() -> Resolution {
        Resolution::Resolved(Coordinates::new(37.4220, -122.0841))
    }

    fn sunny_body() -> serde_json::Value {
        serde_json::json!({
            "currentTime": "2025-06-01T03:00:00Z",
            "temperature": { "degrees": 18, "unit": "CELSIUS" },
            "weatherCondition": { "description": { "text": "晴れ", "languageCode": "ja" } }
        })
    }

    #[tokio::test]
    async fn formats_success_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/currentConditions:lookup"))
            .and(query_param("key", "KEY"))
            .and(query_param("location.latitude", "37.422"))
            .and(query_param("location.longitude", "-122.0841"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sunny_body()))
            .expect(1)
            .mount(&server)
            .await;

        let report = lookup_for(&server, san_francisco()).get_weather("サンフランシスコ").await;

        assert_eq!(report, WeatherReport::success("サンフランシスコ", "晴れ", 18));
        assert_eq!(report.report, "サンフランシスコの現在の天気は晴れで、気温は18度です。");
    }

    #[tokio::test]
    async fn fractional_temperature_kept_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "temperature": { "degrees": 12.5 },
                "weatherCondition": { "description": { "text": "曇り" } }
            })))
            .mount(&server)
            .await;

        let conditions = lookup_for(&server, san_francisco()).lookup("札幌").await.unwrap();

        assert_eq!(conditions.temperature.to_string(), "12.5");
        assert_eq!(conditions.description, "曇り");
    }

    #[tokio::test]
    async fn malformed_timestamp_does_not_fail_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "currentTime": "2025-06-01 03:00",
                "temperature": { "degrees": 18 },
                "weatherCondition": { "description": { "text": "晴れ" } }
            })))
            .mount(&server)
            .await;

        let report = lookup_for(&server, san_francisco()).get_weather("サンフランシスコ").await;

        assert_eq!(report, WeatherReport::success("サンフランシスコ", "晴れ", 18));
    }

    #[test]
    fn non_string_timestamp_is_ignored() {
        let parsed: ConditionsResponse = serde_json::from_str(
            r#"{"currentTime": 1717210800, "temperature": {"degrees": 7},
                "weatherCondition": {"description": {"text": "雪"}}}"#,
        )
        .unwrap();

        let conditions = parsed.into_conditions().unwrap();
        assert_eq!(conditions.temperature.to_string(), "7");
        assert_eq!(conditions.description, "雪");
    }

    #[tokio::test]
    async fn server_error_becomes_error_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
            .mount(&server)
            .await;

        let report = lookup_for(&server, san_francisco()).get_weather("東京").await;

        assert!(!report.is_success());
        assert!(report.report.starts_with("東京の天気情報の取得に失敗しました: "));
        assert!(report.report.contains("500"));
        assert!(report.report.contains("backend down"));
    }

    #[tokio::test]
    async fn unresolved_coordinates_are_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/currentConditions:lookup"))
            .respond_with(|req: &Request| {
                let has_location = req
                    .url
                    .query_pairs()
                    .any(|(k, _)| k.starts_with("location."));
                if has_location {
                    ResponseTemplate::new(200)
                } else {
                    ResponseTemplate::new(400).set_body_string("location required")
                }
            })
            .expect(1)
            .mount(&server)
            .await;

        let unresolved = Resolution::NotFound {
            status: "ZERO_RESULTS".into(),
            results: 0,
        };
        let report = lookup_for(&server, unresolved)
            .get_weather("どこでもない場所")
            .await;

        assert!(!report.is_success());
        assert!(report.report.contains("400"));
        assert!(report.report.contains("location required"));
    }

    #[tokio::test]
    async fn missing_fields_become_error_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "temperature": { "degrees": 20 }
            })))
            .mount(&server)
            .await;

        let lookup = lookup_for(&server, san_francisco());
        let err = lookup.lookup("名古屋").await.unwrap_err();
        assert!(matches!(err, LookupError::MissingField("weatherCondition.description.text")));

        let report = lookup.get_weather("名古屋").await;
        assert_eq!(
            report.report,
            "名古屋の天気情報の取得に失敗しました: weather response is missing `weatherCondition.description.text`"
        );
    }

    #[tokio::test]
    async fn non_json_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = lookup_for(&server, san_francisco()).lookup("福岡").await.unwrap_err();
        assert!(matches!(err, LookupError::Decode(_)));
    }

    #[tokio::test]
    async fn blank_city_is_rejected_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let report = lookup_for(&server, san_francisco()).get_weather("  ").await;
        assert!(!report.is_success());
        assert!(report.report.ends_with("地名が指定されていません"));
    }

    #[tokio::test]
    async fn repeated_calls_are_identical() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sunny_body()))
            .expect(2)
            .mount(&server)
            .await;

        let lookup = lookup_for(&server, san_francisco());
        let first = lookup.get_weather("サンフランシスコ").await;
        let second = lookup.get_weather("サンフランシスコ").await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_key_is_omitted_from_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(|req: &Request| {
                if req.url.query_pairs().any(|(k, _)| k == "key") {
                    ResponseTemplate::new(500)
                } else {
                    ResponseTemplate::new(403).set_body_string("API key missing")
                }
            })
            .mount(&server)
            .await;

        let config = Config {
            weather_url: format!("{}/v1/currentConditions:lookup", server.uri()),
            ..Config::default()
        };
        let lookup = WeatherLookup::from_config(&config).unwrap();

        let report = lookup.get_weather("横浜").await;
        assert!(report.report.contains("403"));
    }
}
