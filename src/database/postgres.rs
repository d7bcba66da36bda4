use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;
use teloxide::types::{ChatId, MessageId, UserId};

use crate::database::Storage;
use crate::error::StorageError;
use crate::models::{AppUser, ChatUser, RequestRecord, ResponseRecord, ScheduleEntry};

#[derive(Clone, Debug)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    pub async fn init(&self) -> Result<(), StorageError> {
        // Пользователи бота
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS app_users (
                id BIGSERIAL PRIMARY KEY,
                telegram_user_id BIGINT NOT NULL UNIQUE,
                first_login_date TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT,
                username TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Отправленные расписания, рейсы хранятся в JSONB
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                id BIGSERIAL PRIMARY KEY,
                chat_id BIGINT NOT NULL,
                message_id INTEGER NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                created_on DATE NOT NULL,
                page INTEGER NOT NULL DEFAULT 0,
                timetables JSONB NOT NULL DEFAULT '[]'
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Запросы переживают очистку ответов
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS requests (
                id BIGSERIAL PRIMARY KEY,
                telegram_user_id BIGINT NOT NULL,
                from_city TEXT NOT NULL,
                code_from TEXT NOT NULL,
                to_city TEXT NOT NULL,
                code_to TEXT NOT NULL,
                travel_date DATE,
                successfully BOOLEAN NOT NULL DEFAULT false,
                response_id BIGINT REFERENCES responses (id) ON DELETE SET NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_responses_chat_message ON responses (chat_id, message_id)"
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_responses_created_on ON responses (created_on)"
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_requests_user ON requests (telegram_user_id)"
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn response_from_row(row: &PgRow) -> Result<ResponseRecord, StorageError> {
        let timetables: serde_json::Value = row.try_get("timetables")?;
        let entries: Vec<ScheduleEntry> = serde_json::from_value(timetables)?;
        let page: i32 = row.try_get("page")?;

        Ok(ResponseRecord {
            id: Some(row.try_get("id")?),
            chat_id: ChatId(row.try_get::<i64, _>("chat_id")?),
            message_id: Some(MessageId(row.try_get::<i32, _>("message_id")?)),
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            created_on: row.try_get::<NaiveDate, _>("created_on")?,
            page: page.max(0) as usize,
            entries,
        })
    }
}

#[async_trait]
impl Storage for Database {
    async fn find_or_save_user(&self, user: &ChatUser) -> Result<AppUser, StorageError> {
        sqlx::query(
            r#"
            INSERT INTO app_users (telegram_user_id, first_name, last_name, username)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (telegram_user_id) DO NOTHING
            "#,
        )
        .bind(user.id.0 as i64)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.username)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            "SELECT id, telegram_user_id, first_login_date, first_name, last_name, username
             FROM app_users WHERE telegram_user_id = $1",
        )
        .bind(user.id.0 as i64)
        .fetch_one(&self.pool)
        .await?;

        Ok(AppUser {
            id: row.try_get("id")?,
            telegram_user_id: UserId(row.try_get::<i64, _>("telegram_user_id")? as u64),
            first_login_date: row.try_get("first_login_date")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            username: row.try_get("username")?,
        })
    }

    async fn save_request(&self, request: &RequestRecord) -> Result<i64, StorageError> {
        let row = sqlx::query(
            r#"
            INSERT INTO requests
            (telegram_user_id, from_city, code_from, to_city, code_to, travel_date, successfully, response_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(request.telegram_user_id.0 as i64)
        .bind(&request.from_city)
        .bind(&request.code_from)
        .bind(&request.to_city)
        .bind(&request.code_to)
        .bind(request.date)
        .bind(request.successfully)
        .bind(request.response_id)
        .bind(request.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("id")?)
    }

    async fn save_response(&self, response: &ResponseRecord) -> Result<i64, StorageError> {
        let message_id = response
            .message_id
            .ok_or_else(|| StorageError::Invalid("response has no delivered message".to_string()))?;
        let timetables = serde_json::to_value(&response.entries)?;

        let row = sqlx::query(
            r#"
            INSERT INTO responses (chat_id, message_id, created_at, created_on, page, timetables)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(response.chat_id.0)
        .bind(message_id.0)
        .bind(response.created_at)
        .bind(response.created_on)
        .bind(response.page as i32)
        .bind(timetables)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("id")?)
    }

    async fn find_response(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<Option<ResponseRecord>, StorageError> {
        let row = sqlx::query(
            "SELECT id, chat_id, message_id, created_at, created_on, page, timetables
             FROM responses WHERE chat_id = $1 AND message_id = $2
             ORDER BY id DESC LIMIT 1",
        )
        .bind(chat_id.0)
        .bind(message_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::response_from_row).transpose()
    }

    async fn update_response_page(&self, id: i64, page: usize) -> Result<(), StorageError> {
        sqlx::query("UPDATE responses SET page = $1 WHERE id = $2")
            .bind(page as i32)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_responses_before(&self, date: NaiveDate) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM responses WHERE created_on < $1")
            .bind(date)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
