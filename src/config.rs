use anyhow::{Context, Result};
use chrono_tz::Tz;
use std::env;
use std::time::Duration;

const DEFAULT_STATIONS_URL: &str =
    "https://api.rasp.yandex.net/v3.0/stations_list/?apikey={token}&lang=ru_RU&format=json";
const DEFAULT_SEARCH_URL: &str = "https://api.rasp.yandex.net/v3.0/search/?apikey={token}&format=json&from={from}&to={to}&lang=ru_RU&page=1&transport_types=train";
const DEFAULT_DIRECTORY_REFRESH_SECS: u64 = 24 * 60 * 60;
const DEFAULT_RESPONSE_SWEEP_SECS: u64 = 60 * 60;
const DEFAULT_API_RETRIES: u32 = 1;
const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REFERENCE_TZ: &str = "Europe/Moscow";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub yandex_api_token: String,
    pub stations_url: String,
    pub search_url: String,
    pub directory_refresh_interval: Duration,
    pub response_sweep_interval: Duration,
    pub api_retries: u32,
    /// Таймаут одного HTTP-запроса к API расписаний
    pub api_timeout: Duration,
    pub timezone: Tz,
}

impl Config {
    /// Читает настройки из окружения (после dotenvy::dotenv)
    pub fn from_env() -> Result<Self> {
        let yandex_api_token = env::var("YANDEX_API_TOKEN")
            .context("YANDEX_API_TOKEN must be set")?;

        let timezone = env::var("REFERENCE_TZ")
            .unwrap_or_else(|_| DEFAULT_REFERENCE_TZ.to_string())
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid REFERENCE_TZ: {}", e))?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            yandex_api_token,
            stations_url: env::var("YANDEX_STATIONS_URL")
                .unwrap_or_else(|_| DEFAULT_STATIONS_URL.to_string()),
            search_url: env::var("YANDEX_SEARCH_URL")
                .unwrap_or_else(|_| DEFAULT_SEARCH_URL.to_string()),
            directory_refresh_interval: Duration::from_secs(
                parse_var("DIRECTORY_REFRESH_SECS", DEFAULT_DIRECTORY_REFRESH_SECS)?,
            ),
            response_sweep_interval: Duration::from_secs(
                parse_var("RESPONSE_SWEEP_SECS", DEFAULT_RESPONSE_SWEEP_SECS)?,
            ),
            api_retries: parse_var("API_RETRIES", DEFAULT_API_RETRIES)?,
            api_timeout: Duration::from_secs(parse_var("API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT_SECS)?),
            timezone,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} value: {}", name, value)),
        Err(_) => Ok(default),
    }
}
