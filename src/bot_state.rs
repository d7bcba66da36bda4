use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

use crate::database::Storage;
use crate::directory::CityDirectory;
use crate::lock::ServiceLock;
use crate::rasp::RailwayApi;
use crate::sessions::SessionStore;
use crate::transport::ChatTransport;

/// Общее состояние бота, передается обработчикам через dptree
#[derive(Clone)]
pub struct BotState {
    pub storage: Arc<dyn Storage>,
    pub api: Arc<dyn RailwayApi>,
    pub transport: Arc<dyn ChatTransport>,
    pub sessions: Arc<SessionStore>,
    pub directory: Arc<CityDirectory>,
    pub lock: Arc<ServiceLock>,
    pub timezone: Tz,
    /// Имя бота без "@", нужно для команд вида /start@bot
    pub bot_username: String,
}

impl BotState {
    pub fn new(
        storage: Arc<dyn Storage>,
        api: Arc<dyn RailwayApi>,
        transport: Arc<dyn ChatTransport>,
        timezone: Tz,
    ) -> Self {
        Self {
            storage,
            api,
            transport,
            sessions: Arc::new(SessionStore::new()),
            directory: Arc::new(CityDirectory::new()),
            lock: Arc::new(ServiceLock::new()),
            timezone,
            bot_username: String::new(),
        }
    }

    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = username.into();
        self
    }

    /// Текущая дата в опорном часовом поясе
    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }

    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.timezone).date_naive()
    }
}
