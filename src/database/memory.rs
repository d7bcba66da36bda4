use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use teloxide::types::{ChatId, MessageId, UserId};

use crate::database::Storage;
use crate::error::StorageError;
use crate::models::{AppUser, ChatUser, RequestRecord, ResponseRecord};

/// Хранилище в памяти: используется без DATABASE_URL и в тестах.
/// Данные теряются при перезапуске.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    next_id: AtomicI64,
    users: DashMap<UserId, AppUser>,
    requests: DashMap<i64, RequestRecord>,
    responses: DashMap<i64, ResponseRecord>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn requests(&self) -> Vec<RequestRecord> {
        let mut requests: Vec<_> = self.requests.iter().map(|r| r.value().clone()).collect();
        requests.sort_by_key(|r| r.id);
        requests
    }

    pub fn responses(&self) -> Vec<ResponseRecord> {
        let mut responses: Vec<_> = self.responses.iter().map(|r| r.value().clone()).collect();
        responses.sort_by_key(|r| r.id);
        responses
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn find_or_save_user(&self, user: &ChatUser) -> Result<AppUser, StorageError> {
        let app_user = self
            .users
            .entry(user.id)
            .or_insert_with(|| AppUser {
                id: self.next_id(),
                telegram_user_id: user.id,
                first_login_date: Utc::now(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                username: user.username.clone(),
            })
            .value()
            .clone();

        Ok(app_user)
    }

    async fn save_request(&self, request: &RequestRecord) -> Result<i64, StorageError> {
        let id = self.next_id();
        let mut stored = request.clone();
        stored.id = Some(id);
        self.requests.insert(id, stored);
        Ok(id)
    }

    async fn save_response(&self, response: &ResponseRecord) -> Result<i64, StorageError> {
        if response.message_id.is_none() {
            return Err(StorageError::Invalid("response has no delivered message".to_string()));
        }
        let id = self.next_id();
        let mut stored = response.clone();
        stored.id = Some(id);
        self.responses.insert(id, stored);
        Ok(id)
    }

    async fn find_response(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<Option<ResponseRecord>, StorageError> {
        let found = self
            .responses
            .iter()
            .filter(|r| r.chat_id == chat_id && r.message_id == Some(message_id))
            .max_by_key(|r| r.id)
            .map(|r| r.value().clone());

        Ok(found)
    }

    async fn update_response_page(&self, id: i64, page: usize) -> Result<(), StorageError> {
        if let Some(mut response) = self.responses.get_mut(&id) {
            response.page = page;
        }
        Ok(())
    }

    async fn delete_responses_before(&self, date: NaiveDate) -> Result<u64, StorageError> {
        let expired: Vec<i64> = self
            .responses
            .iter()
            .filter(|r| r.created_on < date)
            .map(|r| *r.key())
            .collect();

        for id in &expired {
            self.responses.remove(id);
        }

        // Как ON DELETE SET NULL в PostgreSQL
        for mut request in self.requests.iter_mut() {
            if request.response_id.is_some_and(|id| expired.contains(&id)) {
                request.response_id = None;
            }
        }

        Ok(expired.len() as u64)
    }
}
