use teloxide::types::ChatId;

use crate::bot_state::BotState;
use crate::error::TransportError;
use crate::handlers::form::FormEngine;
use crate::handlers::utils::{welcome_text, ChatMessage};
use crate::models::ChatUser;

use crate::Command;

pub async fn command_handler(
    state: &BotState,
    user: &ChatUser,
    chat_id: ChatId,
    cmd: Command,
) -> Result<(), TransportError> {
    match cmd {
        Command::Start => handle_start(state, user, chat_id).await?,
        Command::Help => handle_help(state, chat_id).await?,
        Command::Timetable => FormEngine::new(state).start(user.id, chat_id).await,
        Command::Cancel => FormEngine::new(state).cancel(user.id, chat_id).await,
    }
    Ok(())
}

async fn handle_start(state: &BotState, user: &ChatUser, chat_id: ChatId) -> Result<(), TransportError> {
    match state.storage.find_or_save_user(user).await {
        Ok(app_user) => log::info!("👤 User {} (id {}) started the bot", user.id, app_user.id),
        Err(e) => log::error!("❌ Error saving user {}: {}", user.id, e),
    }

    state
        .transport
        .send_text(chat_id, &welcome_text(&user.first_name))
        .await?;
    Ok(())
}

async fn handle_help(state: &BotState, chat_id: ChatId) -> Result<(), TransportError> {
    state.transport.send_text(chat_id, ChatMessage::Help.text()).await?;
    Ok(())
}
