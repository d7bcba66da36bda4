pub mod types;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

use crate::config::Config;
use crate::error::ApiError;
use crate::models::ScheduleEntry;
use crate::rasp::types::{ErrorBody, SearchResponse};

/// Параметры поиска рейсов между двумя населенными пунктами
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleQuery {
    pub code_from: String,
    pub code_to: String,
    pub date: Option<NaiveDate>,
}

/// Внешний провайдер данных о станциях и расписаниях.
/// Возвращает сырые JSON-тела, разбор выполняется на нашей стороне.
#[async_trait]
pub trait RailwayApi: Send + Sync {
    async fn stations_list(&self) -> Result<String, ApiError>;
    async fn search(&self, query: &ScheduleQuery) -> Result<String, ApiError>;
}

pub struct YandexRaspClient {
    client: ClientWithMiddleware,
    token: String,
    stations_url: String,
    search_url: String,
}

impl YandexRaspClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let retry_policy = ExponentialBackoff::builder()
            .build_with_max_retries(config.api_retries);

        // Без таймаута зависший провайдер держал бы блокировку обслуживания
        let http = Client::builder().timeout(config.api_timeout).build()?;

        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            token: config.yandex_api_token.clone(),
            stations_url: config.stations_url.clone(),
            search_url: config.search_url.clone(),
        })
    }

    fn stations_url(&self) -> String {
        self.stations_url.replace("{token}", &self.token)
    }

    fn search_url(&self, query: &ScheduleQuery) -> String {
        let mut url = self
            .search_url
            .replace("{token}", &self.token)
            .replace("{from}", &query.code_from)
            .replace("{to}", &query.code_to);

        if let Some(date) = query.date {
            url.push_str(&format!("&date={}", date.format("%Y-%m-%d")));
        }
        url
    }

    async fn get(&self, url: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_client_error() {
            return Err(ApiError::Client {
                status: status.as_u16(),
                message: error_text(&body),
            });
        }
        if status.is_server_error() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl RailwayApi for YandexRaspClient {
    async fn stations_list(&self) -> Result<String, ApiError> {
        log::debug!("Requesting stations list from Yandex Rasp");
        self.get(&self.stations_url()).await
    }

    async fn search(&self, query: &ScheduleQuery) -> Result<String, ApiError> {
        log::debug!(
            "Requesting timetable {} -> {} (date: {:?})",
            query.code_from,
            query.code_to,
            query.date
        );
        self.get(&self.search_url(query)).await
    }
}

/// Текст ошибки из тела ответа 4xx, либо само тело
fn error_text(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.text)
        .unwrap_or_else(|_| body.to_string())
}

/// Получение расписания между двумя станциями
pub async fn fetch_schedule(
    api: &dyn RailwayApi,
    query: &ScheduleQuery,
) -> Result<Vec<ScheduleEntry>, ApiError> {
    let body = api.search(query).await?;
    parse_schedule(&body)
}

pub fn parse_schedule(body: &str) -> Result<Vec<ScheduleEntry>, ApiError> {
    let response: SearchResponse = serde_json::from_str(body)?;

    let entries = response
        .segments
        .into_iter()
        .map(|segment| ScheduleEntry {
            train_number: segment.thread.number.unwrap_or_default(),
            train_title: segment.thread.title.unwrap_or_default(),
            train_uid: segment.thread.uid.unwrap_or_default(),
            from_station_title: segment.from.title.unwrap_or_default(),
            from_station_code: segment.from.code.unwrap_or_default(),
            to_station_title: segment.to.title.unwrap_or_default(),
            to_station_code: segment.to.code.unwrap_or_default(),
            departure: segment.departure.unwrap_or_default(),
            arrival: segment.arrival.unwrap_or_default(),
            days: segment.days.filter(|d| !d.trim().is_empty()),
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_BODY: &str = r#"{
        "segments": [
            {
                "thread": {"number": "752А", "title": "Москва — Санкт-Петербург", "uid": "752A_0_2"},
                "from": {"title": "Москва (Ленинградский вокзал)", "code": "s2006004"},
                "to": {"title": "Санкт-Петербург (Московский вокзал)", "code": "s9602494"},
                "departure": "2024-05-01T05:45:00+03:00",
                "arrival": "2024-05-01T09:45:00+03:00"
            },
            {
                "thread": {"number": "002А", "title": "Красная стрела", "uid": "002A_1_2"},
                "from": {"title": "Москва", "code": "s2006004"},
                "to": {"title": "Санкт-Петербург", "code": "s9602494"},
                "departure": "23:55:00",
                "arrival": "07:55:00",
                "days": "ежедневно"
            }
        ]
    }"#;

    #[test]
    fn parses_segments_in_order() {
        let entries = parse_schedule(SEARCH_BODY).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].train_number, "752А");
        assert_eq!(entries[0].from_station_code, "s2006004");
        assert_eq!(entries[0].days, None);
        assert_eq!(entries[1].train_title, "Красная стрела");
        assert_eq!(entries[1].days.as_deref(), Some("ежедневно"));
    }

    #[test]
    fn missing_segments_is_empty_result() {
        assert!(parse_schedule(r#"{"pagination": {"total": 0}}"#).unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_parse_error() {
        assert!(matches!(parse_schedule("<html>"), Err(ApiError::Parse(_))));
    }

    #[test]
    fn error_text_extracts_message() {
        let body = r#"{"error": {"text": "Не нашли объект по yandex коду c0", "http_code": 404}}"#;
        assert_eq!(error_text(body), "Не нашли объект по yandex коду c0");
        assert_eq!(error_text("plain"), "plain");
    }
}
