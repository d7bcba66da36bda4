use chrono::{DateTime, NaiveDate, Utc};
use teloxide::types::UserId;

use super::session::FormAnswers;

/// Запрос расписания, сохраняемый после завершения анкеты
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub id: Option<i64>,
    pub telegram_user_id: UserId,
    pub from_city: String,
    pub code_from: String,
    pub to_city: String,
    pub code_to: String,
    pub date: Option<NaiveDate>,
    pub successfully: bool,
    pub response_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl RequestRecord {
    pub fn from_answers(user_id: UserId, answers: &FormAnswers) -> Self {
        Self {
            id: None,
            telegram_user_id: user_id,
            from_city: answers.origin_name.clone().unwrap_or_default(),
            code_from: answers.origin_code.clone().unwrap_or_default(),
            to_city: answers.destination_name.clone().unwrap_or_default(),
            code_to: answers.destination_code.clone().unwrap_or_default(),
            date: answers.date,
            successfully: false,
            response_id: None,
            created_at: Utc::now(),
        }
    }
}
