use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, MessageId};

/// Один рейс из ответа API расписаний
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub train_number: String,
    pub train_title: String,
    pub train_uid: String,
    pub from_station_title: String,
    pub from_station_code: String,
    pub to_station_title: String,
    pub to_station_code: String,
    pub departure: String,
    pub arrival: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<String>,
}

/// Отправленное пользователю расписание с текущей страницей
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: Option<i64>,
    pub chat_id: ChatId,
    pub message_id: Option<MessageId>,
    pub created_at: DateTime<Utc>,
    pub created_on: NaiveDate,
    pub page: usize,
    pub entries: Vec<ScheduleEntry>,
}

impl ResponseRecord {
    pub fn current_entry(&self) -> Option<&ScheduleEntry> {
        self.entries.get(self.page)
    }

    pub fn has_back(&self) -> bool {
        self.page > 0
    }

    pub fn has_forward(&self) -> bool {
        self.page + 1 < self.entries.len()
    }
}
