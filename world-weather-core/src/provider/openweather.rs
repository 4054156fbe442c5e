use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    cities::CityId,
    error::{ServiceError, ServiceResult},
    model::{CurrentConditions, Location},
};

use super::WeatherService;

const DEFAULT_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const DEFAULT_ICON_URL: &str = "https://openweathermap.org/img/wn";

#[derive(Debug, Clone)]
pub struct OpenWeatherService {
    api_key: String,
    api_url: String,
    icon_url: String,
    http: Client,
}

impl OpenWeatherService {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
            icon_url: DEFAULT_ICON_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Override the current-weather endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Override the base the icon file name is appended to.
    pub fn with_icon_url(mut self, url: impl Into<String>) -> Self {
        self.icon_url = url.into();
        self
    }

    pub fn icon_url_for(&self, icon_name: &str) -> String {
        format!("{}/{icon_name}@2x.png", self.icon_url.trim_end_matches('/'))
    }

    async fn fetch_current(
        &self,
        what: &'static str,
        query: &[(&str, String)],
    ) -> ServiceResult<CurrentConditions> {
        if self.api_key.trim().is_empty() {
            return Err(ServiceError::MissingApiKey);
        }
        tracing::debug!(url = %self.api_url, ?query, "requesting current weather");

        let res = self
            .http
            .get(&self.api_url)
            .query(&[("appid", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|source| ServiceError::Transport { what, source })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| ServiceError::Transport { what, source })?;

        if status != reqwest::StatusCode::OK {
            return Err(ServiceError::Status { what, status, body: truncate_body(&body) });
        }

        parse_current(what, &body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    dt: Option<i64>,
    main: OwMain,
    weather: Vec<OwWeather>,
}

fn parse_current(what: &'static str, body: &str) -> ServiceResult<CurrentConditions> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(|source| ServiceError::Decode { what, source })?;

    let primary =
        parsed.weather.into_iter().next().ok_or(ServiceError::MissingField("weather[0]"))?;

    Ok(CurrentConditions {
        temperature_k: parsed.main.temp,
        feels_like_k: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        description: primary.description,
        icon_name: primary.icon,
        place_name: parsed.name.filter(|name| !name.is_empty()),
        observed_at: parsed.dt.and_then(unix_to_utc),
    })
}

#[async_trait]
impl WeatherService for OpenWeatherService {
    async fn current_by_city_id(&self, id: CityId) -> ServiceResult<CurrentConditions> {
        self.fetch_current("city", &[("id", id.to_string())]).await
    }

    async fn current_by_location(&self, location: Location) -> ServiceResult<CurrentConditions> {
        self.fetch_current(
            "coordinates",
            &[("lat", location.latitude.to_string()), ("lon", location.longitude.to_string())],
        )
        .await
    }

    async fn icon(&self, icon_name: &str) -> ServiceResult<Vec<u8>> {
        const WHAT: &str = "icon";
        let url = self.icon_url_for(icon_name);
        tracing::debug!(%url, "requesting weather icon");

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ServiceError::Transport { what: WHAT, source })?;

        let status = res.status();
        if status != reqwest::StatusCode::OK {
            return Err(ServiceError::Status { what: WHAT, status, body: String::new() });
        }

        let bytes =
            res.bytes().await.map_err(|source| ServiceError::Transport { what: WHAT, source })?;
        Ok(bytes.to_vec())
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
