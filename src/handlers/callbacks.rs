use teloxide::prelude::*;
use std::error::Error;

use crate::bot_state::BotState;
use crate::handlers::dispatcher::{Dispatcher, InboundEvent};
use crate::handlers::pagination::CallbackAction;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    // Убираем "часики" на кнопке независимо от результата
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        log::warn!("Error answering callback query {}: {}", q.id, e);
    }

    let event = match (q.data.as_deref(), q.message.as_ref()) {
        (Some(data), Some(message)) => InboundEvent::Callback(CallbackAction {
            chat_id: message.chat().id,
            message_id: message.id(),
            data: data.to_string(),
        }),
        _ => InboundEvent::Unsupported(format!("callback query {} without data or message", q.id)),
    };

    Dispatcher::new(&state).handle(event).await;
    Ok(())
}
