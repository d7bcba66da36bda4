use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::ApiError;
use crate::rasp::types::StationsListResponse;
use crate::rasp::RailwayApi;

type CityCodes = HashMap<String, String>;

/// Справочник населенных пунктов: название -> код Яндекса.
/// Обновляется целиком, читатели видят либо старый, либо новый снимок.
#[derive(Debug, Default)]
pub struct CityDirectory {
    snapshot: RwLock<Arc<CityCodes>>,
}

impl CityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_codes(codes: CityCodes) -> Self {
        let directory = Self::new();
        directory.replace(codes);
        directory
    }

    fn current(&self) -> Arc<CityCodes> {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.current().len()
    }

    pub fn resolve(&self, name: &str) -> Option<String> {
        let name = normalize_city_name(name);
        let code = self.current().get(&name).cloned();
        match &code {
            Some(code) => log::debug!("City code for {} was found: {}", name, code),
            None => log::debug!("City not found for {}", name),
        }
        code
    }

    pub fn replace(&self, codes: CityCodes) {
        let codes: CityCodes = codes
            .into_iter()
            .map(|(name, code)| (normalize_city_name(&name), code))
            .collect();
        let fresh = Arc::new(codes);
        match self.snapshot.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
    }

    /// Загружает справочник заново. При ошибке прежний снимок сохраняется.
    pub async fn refresh(&self, api: &dyn RailwayApi) -> bool {
        let result = match api.stations_list().await {
            Ok(body) => parse_city_codes(&body),
            Err(e) => Err(e),
        };

        match result {
            Ok(codes) => {
                let count = codes.len();
                self.replace(codes);
                log::info!("✅ Supported city codes initialized: {} cities", count);
                true
            }
            Err(e) => {
                log::error!(
                    "❌ City directory refresh failed, keeping {} cached cities: {}",
                    self.len(),
                    e
                );
                false
            }
        }
    }
}

/// Приводит название к виду "Слово1 Слово2": лишние пробелы убираются,
/// первая буква каждого слова заглавная, остальные строчные.
pub fn normalize_city_name(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_city_codes(body: &str) -> Result<CityCodes, ApiError> {
    let response: StationsListResponse = serde_json::from_str(body)?;
    let mut codes = CityCodes::new();

    for country in response.countries {
        for region in country.regions {
            for settlement in region.settlements {
                let title = match settlement.title {
                    Some(title) if !title.trim().is_empty() => title,
                    _ => continue,
                };
                match settlement.codes.yandex_code {
                    Some(code) if !code.is_empty() => {
                        codes.insert(title, code);
                    }
                    _ => log::debug!("Settlement {} has no yandex code, skipped", title),
                }
            }
        }
    }

    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedApi;

    const STATIONS_BODY: &str = r#"{
        "countries": [
            {
                "title": "Россия",
                "regions": [
                    {
                        "title": "Москва и Московская область",
                        "settlements": [
                            {"title": "Москва", "codes": {"yandex_code": "c213"}},
                            {"title": "", "codes": {"yandex_code": "c0"}},
                            {"title": "Химки", "codes": {}}
                        ]
                    },
                    {
                        "settlements": [
                            {"title": "Санкт-Петербург", "codes": {"yandex_code": "c2"}}
                        ]
                    }
                ]
            },
            {"title": "Пустая страна"}
        ]
    }"#;

    #[test]
    fn normalizes_spacing_and_case() {
        assert_eq!(normalize_city_name("  москва "), "Москва");
        assert_eq!(normalize_city_name("САНКТ    петербург"), "Санкт Петербург");
        assert_eq!(normalize_city_name("нижний\tновгород"), "Нижний Новгород");
        assert_eq!(normalize_city_name("   "), "");
    }

    #[test]
    fn flattens_settlements_and_skips_blank_titles() {
        let codes = parse_city_codes(STATIONS_BODY).unwrap();
        assert_eq!(codes.len(), 2);
        assert_eq!(codes.get("Москва").map(String::as_str), Some("c213"));
        assert_eq!(codes.get("Санкт-Петербург").map(String::as_str), Some("c2"));
    }

    #[test]
    fn resolve_is_exact_after_normalization() {
        let directory = CityDirectory::from_codes(HashMap::from([
            ("Москва".to_string(), "c213".to_string()),
            ("Санкт-Петербург".to_string(), "c2".to_string()),
        ]));

        assert_eq!(directory.resolve("москва").as_deref(), Some("c213"));
        assert_eq!(directory.resolve("санкт-петербург").as_deref(), Some("c2"));
        assert_eq!(directory.resolve("Моск"), None);
    }

    #[tokio::test]
    async fn refresh_replaces_snapshot_wholesale() {
        let directory = CityDirectory::from_codes(HashMap::from([(
            "Тверь".to_string(),
            "c14".to_string(),
        )]));
        let api = ScriptedApi::new();
        api.set_stations(Ok(STATIONS_BODY.to_string()));

        assert!(directory.refresh(&api).await);
        assert_eq!(directory.resolve("Москва").as_deref(), Some("c213"));
        assert_eq!(directory.resolve("Тверь"), None);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let directory = CityDirectory::from_codes(HashMap::from([(
            "Москва".to_string(),
            "c213".to_string(),
        )]));
        let api = ScriptedApi::new();

        api.set_stations(Err(ApiError::Transport("connection refused".to_string())));
        assert!(!directory.refresh(&api).await);
        assert_eq!(directory.resolve("москва").as_deref(), Some("c213"));

        api.set_stations(Ok("{not json".to_string()));
        assert!(!directory.refresh(&api).await);
        assert_eq!(directory.resolve("москва").as_deref(), Some("c213"));
    }
}
