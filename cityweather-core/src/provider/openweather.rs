use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{FALLBACK_PROVIDER_MESSAGE, WeatherError},
    model::{CityQuery, Observation},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the provider at another host, e.g. a proxy or a local mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn fetch_current(&self, city: &str) -> Result<Observation, WeatherError> {
        let url = format!("{}/weather", self.base_url);

        tracing::debug!(%city, "requesting current weather from OpenWeather");

        // The query string carries the API key, so strip the URL from transport errors.
        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|err| WeatherError::Transport(err.without_url()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|err| WeatherError::Transport(err.without_url()))?;

        if !status.is_success() {
            tracing::warn!(%status, body = %truncate_body(&body), "OpenWeather request failed");

            let message = serde_json::from_str::<OwErrorResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| FALLBACK_PROVIDER_MESSAGE.to_string());

            return Err(WeatherError::Provider { status, message });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        tracing::debug!(location = %parsed.name, "received current weather");

        parsed.into_observation()
    }
}

#[derive(Debug, Deserialize)]
struct OwErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
}

impl OwCurrentResponse {
    fn into_observation(self) -> Result<Observation, WeatherError> {
        let condition = self.weather.into_iter().next().ok_or_else(|| {
            <serde_json::Error as serde::de::Error>::custom(
                "OpenWeather response contained no weather conditions",
            )
        })?;

        let observed_at = DateTime::<Utc>::from_timestamp(self.dt, 0).unwrap_or_else(Utc::now);

        Ok(Observation {
            location_name: self.name,
            country: self.sys.country.filter(|country| !country.is_empty()),
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            description: condition.description,
            icon: condition.icon,
            humidity_pct: self.main.humidity,
            wind_speed_mps: self.wind.speed,
            observed_at,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &CityQuery) -> Result<Observation, WeatherError> {
        self.fetch_current(city.as_str()).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    fn london_payload() -> serde_json::Value {
        json!({
            "coord": { "lon": -0.1257, "lat": 51.5085 },
            "weather": [
                { "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }
            ],
            "main": {
                "temp": 20.4,
                "feels_like": 19.6,
                "temp_min": 18.9,
                "temp_max": 21.7,
                "pressure": 1012,
                "humidity": 81
            },
            "wind": { "speed": 5.0, "deg": 240 },
            "dt": 1_700_000_000,
            "sys": { "country": "GB", "sunrise": 1_699_945_000, "sunset": 1_699_978_000 },
            "name": "London",
            "cod": 200
        })
    }

    fn provider_for(server: &MockServer) -> OpenWeatherProvider {
        OpenWeatherProvider::new("TEST_KEY".to_string()).with_base_url(&server.uri())
    }

    fn city(name: &str) -> CityQuery {
        CityQuery::parse(name).expect("valid city")
    }

    #[tokio::test]
    async fn current_sends_city_key_and_metric_units() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/weather"))
            .and(matchers::query_param("q", "London"))
            .and(matchers::query_param("appid", "TEST_KEY"))
            .and(matchers::query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_payload()))
            .expect(1)
            .mount(&server)
            .await;

        let observation = provider_for(&server)
            .current(&city("London"))
            .await
            .expect("lookup should succeed");

        assert_eq!(observation.location_name, "London");
        assert_eq!(observation.country.as_deref(), Some("GB"));
        assert_eq!(observation.temperature_c, 20.4);
        assert_eq!(observation.feels_like_c, 19.6);
        assert_eq!(observation.description, "light rain");
        assert_eq!(observation.icon, "10d");
        assert_eq!(observation.humidity_pct, 81);
        assert_eq!(observation.wind_speed_mps, 5.0);
        assert_eq!(observation.observed_at.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn city_names_with_spaces_are_encoded() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .and(matchers::query_param("q", "Rio de Janeiro"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_payload()))
            .expect(1)
            .mount(&server)
            .await;

        let result = provider_for(&server).current(&city("Rio de Janeiro")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn not_found_status_carries_provider_message() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .current(&city("Atlantis"))
            .await
            .unwrap_err();

        match &err {
            WeatherError::Provider { status, message } => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(message, "city not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.user_message(), "City not found. Please check the spelling.");
    }

    #[tokio::test]
    async fn non_json_error_body_uses_fallback_message() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .current(&city("London"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Error fetching data");
    }

    #[tokio::test]
    async fn empty_weather_list_is_a_decode_error() {
        let server = MockServer::start().await;

        let mut payload = london_payload();
        payload["weather"] = json!([]);

        Mock::given(matchers::method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .current(&city("London"))
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::Decode(_)));
        assert!(err.to_string().contains("no weather conditions"));
    }

    #[tokio::test]
    async fn missing_country_is_tolerated() {
        let server = MockServer::start().await;

        let mut payload = london_payload();
        payload["sys"] = json!({});

        Mock::given(matchers::method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload))
            .mount(&server)
            .await;

        let observation = provider_for(&server)
            .current(&city("London"))
            .await
            .expect("lookup should succeed");

        assert_eq!(observation.country, None);
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_api_key() {
        // Nothing listens on port 9 on the loopback interface.
        let provider = OpenWeatherProvider::new("SECRET_KEY".to_string())
            .with_base_url("http://127.0.0.1:9");

        let err = provider.current(&city("London")).await.unwrap_err();

        assert!(matches!(err, WeatherError::Transport(_)));
        assert!(!err.user_message().contains("SECRET_KEY"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(300);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }
}
