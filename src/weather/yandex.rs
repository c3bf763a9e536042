use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::{WeatherFetcher, WeatherSnapshot};

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    fact: Fact,
}

#[derive(Debug, Deserialize)]
struct Fact {
    obs_time: i64,
    temp: i32,
    feels_like: i32,
    condition: String,
    wind_speed: f64,
    humidity: u8,
    pressure_mm: u32,
}

impl TryFrom<Fact> for WeatherSnapshot {
    type Error = anyhow::Error;

    fn try_from(fact: Fact) -> Result<Self> {
        let observed_at = DateTime::<Utc>::from_timestamp(fact.obs_time, 0)
            .with_context(|| format!("Invalid observation time: {}", fact.obs_time))?;
        Ok(Self {
            observed_at,
            temperature: fact.temp,
            feels_like: fact.feels_like,
            condition: fact.condition,
            wind_speed: fact.wind_speed,
            humidity: fact.humidity,
            pressure_mm: fact.pressure_mm,
        })
    }
}

/// Client for the Yandex Weather forecast API.
pub struct YandexWeatherClient {
    client: reqwest::Client,
    base_url: String,
}

impl YandexWeatherClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn parse(body: &str) -> Result<WeatherSnapshot> {
        let response: ForecastResponse =
            serde_json::from_str(body).context("Failed to parse weather response")?;
        response.fact.try_into()
    }
}

#[async_trait]
impl WeatherFetcher for YandexWeatherClient {
    async fn fetch(&self, api_key: &str, lat: f64, lon: f64) -> Result<WeatherSnapshot> {
        let url = format!("{}/forecast", self.base_url.trim_end_matches('/'));

        debug!("Requesting weather for ({}, {}) from {}", lat, lon, url);

        let response = self
            .client
            .get(&url)
            .header("X-Yandex-API-Key", api_key)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("limit", "1".to_string()),
                ("hours", "false".to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to weather provider")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Weather API error ({}): {}", status, error_body);
        }

        let body = response
            .text()
            .await
            .context("Failed to read weather response")?;
        Self::parse(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fact() {
        let body = r#"{
            "now": 1768453200,
            "now_dt": "2026-01-15T05:00:00.000Z",
            "info": {"lat": 53.346853, "lon": 83.777012},
            "fact": {
                "obs_time": 1768453200,
                "temp": -12,
                "feels_like": -18,
                "icon": "ovc_-sn",
                "condition": "light-snow",
                "wind_speed": 4.5,
                "wind_dir": "sw",
                "pressure_mm": 752,
                "pressure_pa": 1002,
                "humidity": 84,
                "daytime": "n",
                "season": "winter"
            },
            "forecasts": []
        }"#;

        let snapshot = YandexWeatherClient::parse(body).unwrap();
        assert_eq!(snapshot.temperature, -12);
        assert_eq!(snapshot.feels_like, -18);
        assert_eq!(snapshot.condition, "light-snow");
        assert_eq!(snapshot.wind_speed, 4.5);
        assert_eq!(snapshot.humidity, 84);
        assert_eq!(snapshot.pressure_mm, 752);
        assert_eq!(snapshot.observed_at.timestamp(), 1768453200);
    }

    #[test]
    fn test_parse_missing_fact_fails() {
        assert!(YandexWeatherClient::parse(r#"{"now": 1}"#).is_err());
        assert!(YandexWeatherClient::parse("not json").is_err());
    }
}
