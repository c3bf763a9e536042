use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub weather: WeatherConfig,
    #[serde(default = "default_schedule_config")]
    pub schedule: ScheduleConfig,
    pub images: ImagesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Mention stripped from incoming text before classification.
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    pub api_key: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

impl WeatherConfig {
    /// Freshness window for cached weather (from [weather] max_age_secs, default 1 hour).
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    #[serde(default = "default_schedule_path")]
    pub path: PathBuf,
    /// Offset of the group's local time from UTC, used to decide what "today" is.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImagesConfig {
    #[serde(default)]
    pub urls: Vec<String>,
}

/// Mention the original group bot answers to.
fn default_bot_name() -> String {
    "@student_verochka_bot".to_string()
}

fn default_poll_timeout_secs() -> u32 {
    60
}

/// Barnaul, where the group studies.
fn default_latitude() -> f64 {
    53.346853
}

fn default_longitude() -> f64 {
    83.777012
}

fn default_max_age_secs() -> u64 {
    3600
}

fn default_weather_base_url() -> String {
    "https://api.weather.yandex.ru/v2".to_string()
}

fn default_schedule_path() -> PathBuf {
    PathBuf::from("schedule.toml")
}

fn default_utc_offset_hours() -> i32 {
    7
}

fn default_schedule_config() -> ScheduleConfig {
    ScheduleConfig {
        path: default_schedule_path(),
        utc_offset_hours: default_utc_offset_hours(),
    }
}

impl Config {
    /// Read and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse TOML content and check the values serde cannot.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        if config.telegram.bot_token.trim().is_empty() {
            anyhow::bail!("telegram.bot_token must not be empty");
        }
        if !(-12..=14).contains(&config.schedule.utc_offset_hours) {
            anyhow::bail!(
                "schedule.utc_offset_hours out of range: {}",
                config.schedule.utc_offset_hours
            );
        }

        Ok(config)
    }
}
