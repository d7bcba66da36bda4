use teloxide::types::ChatId;
use teloxide::utils::command::BotCommands;

use crate::bot_state::BotState;
use crate::handlers::commands::command_handler;
use crate::handlers::form::FormEngine;
use crate::handlers::pagination::{CallbackAction, PaginationEngine};
use crate::handlers::utils::ChatMessage;
use crate::models::ChatUser;
use crate::Command;

/// Входящее событие, уже отвязанное от типов Telegram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Text {
        user: ChatUser,
        chat_id: ChatId,
        text: String,
    },
    Callback(CallbackAction),
    Unsupported(String),
}

pub struct Dispatcher {
    state: BotState,
}

impl Dispatcher {
    pub fn new(state: &BotState) -> Self {
        Self { state: state.clone() }
    }

    pub async fn handle(&self, event: InboundEvent) {
        if self.state.lock.is_locked() {
            self.deflect(&event).await;
            return;
        }

        match event {
            InboundEvent::Text { user, chat_id, text } => self.handle_text(user, chat_id, &text).await,
            InboundEvent::Callback(callback) => self.handle_callback(callback).await,
            InboundEvent::Unsupported(description) => {
                log::warn!("Unsupported update was received: {}", description);
            }
        }
    }

    /// Во время обслуживания отвечаем только уведомлением
    async fn deflect(&self, event: &InboundEvent) {
        let chat_id = match event {
            InboundEvent::Text { chat_id, .. } => *chat_id,
            InboundEvent::Callback(callback) => callback.chat_id,
            InboundEvent::Unsupported(description) => {
                log::warn!("Unsupported update during maintenance: {}", description);
                return;
            }
        };

        log::info!("⏳ Bot is locked, chat {} deflected", chat_id);
        if let Err(e) = self
            .state
            .transport
            .send_text(chat_id, ChatMessage::BotLocked.text())
            .await
        {
            log::error!("Error sending message to chat {}: {}", chat_id, e);
        }
    }

    async fn handle_text(&self, user: ChatUser, chat_id: ChatId, text: &str) {
        if let Ok(cmd) = Command::parse(text.trim(), &self.state.bot_username) {
            log::info!("Command {} from user {}", text.trim(), user.id);
            if let Err(e) = command_handler(&self.state, &user, chat_id, cmd).await {
                log::error!("Error handling command for chat {}: {}", chat_id, e);
            }
            return;
        }

        if self.state.sessions.is_awaiting_input(user.id) {
            FormEngine::new(&self.state)
                .submit_answer(user.id, chat_id, text)
                .await;
            return;
        }

        log::warn!("Unsupported message from user {}: {}", user.id, text);
    }

    async fn handle_callback(&self, callback: CallbackAction) {
        let Some(edit) = PaginationEngine::new(&self.state).turn_page(&callback).await else {
            return;
        };

        if let Err(e) = self.state.transport.edit_view(&edit).await {
            log::error!("Error editing message in chat {}: {}", edit.chat_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;
    use crate::testing::{search_body, test_state};
    use crate::transport::NavAction;
    use teloxide::types::{MessageId, UserId};

    fn user() -> ChatUser {
        ChatUser {
            id: UserId(77),
            first_name: "Анна".to_string(),
            last_name: None,
            username: Some("anna".to_string()),
        }
    }

    fn text(value: &str) -> InboundEvent {
        InboundEvent::Text {
            user: user(),
            chat_id: ChatId(77),
            text: value.to_string(),
        }
    }

    #[tokio::test]
    async fn start_saves_user_and_greets_by_name() {
        let (state, _, transport, _) = test_state();
        let dispatcher = Dispatcher::new(&state);

        dispatcher.handle(text("/start")).await;
        dispatcher.handle(text("/start")).await;

        let texts = transport.texts();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].starts_with("Здравствуйте, Анна!"));
        let saved = state.storage.find_or_save_user(&user()).await.unwrap();
        assert_eq!(saved.username.as_deref(), Some("anna"));
    }

    #[tokio::test]
    async fn plain_text_without_form_is_dropped() {
        let (state, _, transport, _) = test_state();

        Dispatcher::new(&state).handle(text("Москва")).await;

        assert!(transport.texts().is_empty());
        assert!(state.sessions.get(UserId(77)).is_none());
    }

    #[tokio::test]
    async fn full_timetable_dialog() {
        let (state, storage, transport, api) = test_state();
        api.set_search(Ok(search_body(2)));
        let dispatcher = Dispatcher::new(&state);

        dispatcher.handle(text("/timetable")).await;
        assert_eq!(transport.texts().last().map(String::as_str), Some(Question::Origin.prompt()));

        dispatcher.handle(text("москва")).await;
        dispatcher.handle(text("Zzzzz")).await;
        let texts = transport.texts();
        assert_eq!(texts[texts.len() - 2], ChatMessage::NotValidCity.text());
        assert_eq!(texts[texts.len() - 1], Question::Destination.prompt());

        dispatcher.handle(text("Санкт Петербург")).await;
        dispatcher.handle(text("Да")).await;
        assert!(transport.texts().last().unwrap().contains("Дата: все дни"));

        dispatcher.handle(text("Да")).await;

        assert!(state.sessions.get(UserId(77)).is_none());
        let request = storage.requests().pop().unwrap();
        assert_eq!(request.from_city, "Москва");
        assert_eq!(request.code_to, "c2");
        assert!(request.successfully);

        let response = storage.responses().pop().unwrap();
        assert_eq!(request.response_id, response.id);

        let callback = CallbackAction {
            chat_id: ChatId(77),
            message_id: response.message_id.unwrap(),
            data: NavAction::Forward.callback_data().to_string(),
        };
        dispatcher.handle(InboundEvent::Callback(callback)).await;

        let edits = transport.edits();
        assert_eq!(edits.len(), 1);
        assert!(edits[0].view.text.contains("Страница 2 из 2"));
        assert_eq!(edits[0].view.controls, vec![NavAction::Back]);
    }

    #[tokio::test]
    async fn command_with_bot_name_suffix_is_recognized() {
        let (state, _, transport, _) = test_state();
        let dispatcher = Dispatcher::new(&state);

        dispatcher.handle(text("/timetable@railway_bot")).await;

        let session = state.sessions.get(UserId(77)).unwrap();
        assert_eq!(session.step(), 0);
        assert_eq!(transport.texts().last().map(String::as_str), Some(Question::Origin.prompt()));

        dispatcher.handle(text("/cancel@railway_bot")).await;
        assert!(state.sessions.get(UserId(77)).is_none());
    }

    #[tokio::test]
    async fn command_interrupts_form() {
        let (state, _, transport, _) = test_state();
        let dispatcher = Dispatcher::new(&state);

        dispatcher.handle(text("/timetable")).await;
        dispatcher.handle(text("/cancel")).await;

        assert!(state.sessions.get(UserId(77)).is_none());
        assert_eq!(transport.texts().last().map(String::as_str), Some(ChatMessage::Cancel.text()));

        transport.clear();
        dispatcher.handle(text("Москва")).await;
        assert!(transport.texts().is_empty());
    }

    #[tokio::test]
    async fn locked_bot_deflects_text_and_callbacks() {
        let (state, storage, transport, _) = test_state();
        let dispatcher = Dispatcher::new(&state);
        dispatcher.handle(text("/timetable")).await;
        transport.clear();

        let guard = state.lock.acquire_maintenance().unwrap();
        dispatcher.handle(text("Москва")).await;
        dispatcher
            .handle(InboundEvent::Callback(CallbackAction {
                chat_id: ChatId(77),
                message_id: MessageId(1),
                data: "FORWARD_BUTTON".to_string(),
            }))
            .await;
        dispatcher.handle(InboundEvent::Unsupported("sticker".to_string())).await;

        assert_eq!(
            transport.texts(),
            vec![ChatMessage::BotLocked.text().to_string(); 2]
        );
        assert!(transport.edits().is_empty());
        assert_eq!(state.sessions.get(UserId(77)).unwrap().step(), 0);
        assert!(storage.requests().is_empty());

        drop(guard);
        dispatcher.handle(text("Москва")).await;
        assert_eq!(state.sessions.get(UserId(77)).unwrap().step(), 1);
    }
}
