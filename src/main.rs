use teloxide::{prelude::*, utils::command::BotCommands};
use std::sync::Arc;

mod bot_state;
mod config;
mod database;
mod directory;
mod error;
mod handlers;
mod lock;
mod models;
mod rasp;
mod sessions;
mod transport;
#[cfg(test)]
mod testing;

use crate::bot_state::BotState;
use crate::config::Config;
use crate::database::{Database, MemoryStorage, Storage};
use crate::handlers::{
    callback_handler, message_handler, refresh_with_retry, spawn_maintenance, LOCK_RETRY_DELAY,
};
use crate::rasp::YandexRaspClient;
use crate::transport::TelegramTransport;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "начать работу с ботом")]
    Start,
    #[command(description = "получить информацию об использовании бота")]
    Help,
    #[command(description = "отменить выполняемую команду")]
    Cancel,
    #[command(description = "получить расписание рейсов между станциями")]
    Timetable,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Загружаем .env и инициализируем логирование
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Starting railway assistant bot...");

    let config = Config::from_env()?;

    let storage: Arc<dyn Storage> = match &config.database_url {
        Some(database_url) => {
            let db = Database::new(database_url).await?;
            db.init().await?;
            log::info!("✅ Database initialized");
            Arc::new(db)
        }
        None => {
            log::warn!("DATABASE_URL is not set, using in-memory storage");
            Arc::new(MemoryStorage::new())
        }
    };

    let bot = Bot::from_env();
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let api = Arc::new(YandexRaspClient::new(&config)?);

    // Имя бота нужно, чтобы разбирать команды вида /timetable@bot
    let me = bot.get_me().await?;
    let bot_username = me.user.username.clone().unwrap_or_default();
    log::info!("🤖 Running as @{}", bot_username);

    let state = BotState::new(storage, api, transport, config.timezone).with_bot_username(bot_username);

    // Справочник городов загружается до приема сообщений
    if !refresh_with_retry(&state, LOCK_RETRY_DELAY).await {
        log::warn!("Starting with an empty city directory");
    }

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::error!("❌ Error setting bot commands: {}", e);
    }

    spawn_maintenance(&state, &config);

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(callback_handler))
        .branch(Update::filter_message().endpoint(message_handler));

    log::info!("🚀 Starting dispatcher...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
