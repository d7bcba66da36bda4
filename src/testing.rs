//! Подставные реализации внешних зависимостей для тестов

use async_trait::async_trait;
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use teloxide::types::{ChatId, MessageId};

use crate::bot_state::BotState;
use crate::database::MemoryStorage;
use crate::error::{ApiError, TransportError};
use crate::models::ScheduleEntry;
use crate::rasp::{RailwayApi, ScheduleQuery};
use crate::transport::{ChatTransport, EditView, OutboundView};

pub struct ScriptedApi {
    stations: Mutex<Result<String, ApiError>>,
    search: Mutex<Result<String, ApiError>>,
    queries: Mutex<Vec<ScheduleQuery>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            stations: Mutex::new(Ok(r#"{"countries": []}"#.to_string())),
            search: Mutex::new(Ok(r#"{"segments": []}"#.to_string())),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn set_stations(&self, result: Result<String, ApiError>) {
        *self.stations.lock().unwrap() = result;
    }

    pub fn set_search(&self, result: Result<String, ApiError>) {
        *self.search.lock().unwrap() = result;
    }

    pub fn queries(&self) -> Vec<ScheduleQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RailwayApi for ScriptedApi {
    async fn stations_list(&self) -> Result<String, ApiError> {
        self.stations.lock().unwrap().clone()
    }

    async fn search(&self, query: &ScheduleQuery) -> Result<String, ApiError> {
        self.queries.lock().unwrap().push(query.clone());
        self.search.lock().unwrap().clone()
    }
}

/// Запоминает все отправленные и отредактированные сообщения
pub struct RecordingTransport {
    next_message_id: AtomicI32,
    sent: Mutex<Vec<(ChatId, OutboundView)>>,
    edits: Mutex<Vec<EditView>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            next_message_id: AtomicI32::new(100),
            sent: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<(ChatId, OutboundView)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, view)| view.text).collect()
    }

    pub fn edits(&self) -> Vec<EditView> {
        self.edits.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
        self.edits.lock().unwrap().clear();
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_view(&self, chat_id: ChatId, view: &OutboundView) -> Result<MessageId, TransportError> {
        let id = self.next_message_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.sent.lock().unwrap().push((chat_id, view.clone()));
        Ok(MessageId(id))
    }

    async fn edit_view(&self, edit: &EditView) -> Result<(), TransportError> {
        self.edits.lock().unwrap().push(edit.clone());
        Ok(())
    }
}

pub fn sample_entries(count: usize) -> Vec<ScheduleEntry> {
    (0..count)
        .map(|i| ScheduleEntry {
            train_number: format!("{:03}А", i + 1),
            train_title: format!("Поезд номер {}", i + 1),
            train_uid: format!("uid_{}", i),
            from_station_title: "Москва (Ленинградский вокзал)".to_string(),
            from_station_code: "s2006004".to_string(),
            to_station_title: "Санкт-Петербург (Московский вокзал)".to_string(),
            to_station_code: "s9602494".to_string(),
            departure: format!("{:02}:00:00", i % 24),
            arrival: format!("{:02}:30:00", (i + 4) % 24),
            days: None,
        })
        .collect()
}

pub fn search_body(count: usize) -> String {
    let segments: Vec<_> = sample_entries(count)
        .into_iter()
        .map(|entry| {
            serde_json::json!({
                "thread": {
                    "number": entry.train_number,
                    "title": entry.train_title,
                    "uid": entry.train_uid,
                },
                "from": {"title": entry.from_station_title, "code": entry.from_station_code},
                "to": {"title": entry.to_station_title, "code": entry.to_station_code},
                "departure": entry.departure,
                "arrival": entry.arrival,
            })
        })
        .collect();

    serde_json::json!({ "segments": segments }).to_string()
}

/// Состояние бота на подставных зависимостях со справочником из двух городов
pub fn test_state() -> (BotState, Arc<MemoryStorage>, Arc<RecordingTransport>, Arc<ScriptedApi>) {
    let storage = Arc::new(MemoryStorage::new());
    let transport = Arc::new(RecordingTransport::new());
    let api = Arc::new(ScriptedApi::new());

    let state = BotState::new(storage.clone(), api.clone(), transport.clone(), Tz::Europe__Moscow)
        .with_bot_username("railway_bot");
    state.directory.replace(HashMap::from([
        ("Москва".to_string(), "c213".to_string()),
        ("Санкт Петербург".to_string(), "c2".to_string()),
    ]));

    (state, storage, transport, api)
}
