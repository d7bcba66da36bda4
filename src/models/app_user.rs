use chrono::{DateTime, Utc};
use teloxide::types::UserId;

/// Данные отправителя, пришедшие вместе с сообщением
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: UserId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppUser {
    pub id: i64,
    pub telegram_user_id: UserId,
    pub first_login_date: DateTime<Utc>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}
