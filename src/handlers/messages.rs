use teloxide::prelude::*;
use std::error::Error;

use crate::bot_state::BotState;
use crate::handlers::dispatcher::{Dispatcher, InboundEvent};
use crate::models::ChatUser;

/// Переводит сообщение Telegram во внутреннее событие
pub fn inbound_from_message(msg: &Message) -> InboundEvent {
    let (Some(from), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        return InboundEvent::Unsupported(format!(
            "non-text message {} in chat {}",
            msg.id.0, msg.chat.id
        ));
    };

    InboundEvent::Text {
        user: ChatUser {
            id: from.id,
            first_name: from.first_name.clone(),
            last_name: from.last_name.clone(),
            username: from.username.clone(),
        },
        chat_id: msg.chat.id,
        text: text.to_string(),
    }
}

pub async fn message_handler(
    msg: Message,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    Dispatcher::new(&state).handle(inbound_from_message(&msg)).await;
    Ok(())
}
