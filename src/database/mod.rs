pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use teloxide::types::{ChatId, MessageId};

use crate::error::StorageError;
use crate::models::{AppUser, ChatUser, RequestRecord, ResponseRecord};

pub use memory::MemoryStorage;
pub use postgres::Database;

/// Хранилище пользователей, запросов и отправленных расписаний
#[async_trait]
pub trait Storage: Send + Sync {
    async fn find_or_save_user(&self, user: &ChatUser) -> Result<AppUser, StorageError>;

    /// Сохраняет запрос и возвращает его идентификатор
    async fn save_request(&self, request: &RequestRecord) -> Result<i64, StorageError>;

    /// Сохраняет новый ответ и возвращает его идентификатор
    async fn save_response(&self, response: &ResponseRecord) -> Result<i64, StorageError>;

    async fn find_response(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<Option<ResponseRecord>, StorageError>;

    async fn update_response_page(&self, id: i64, page: usize) -> Result<(), StorageError>;

    /// Удаляет ответы, созданные строго раньше указанной даты
    async fn delete_responses_before(&self, date: NaiveDate) -> Result<u64, StorageError>;
}
