use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, MessageId};

use crate::bot_state::BotState;
use crate::handlers::utils::{render_page, ChatMessage};
use crate::models::{ResponseRecord, ScheduleEntry};
use crate::transport::{EditView, NavAction, OutboundView};

/// Нажатие inline-кнопки под сообщением
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackAction {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub data: String,
}

/// Номер страницы после нажатия кнопки; на границах страница не меняется
pub fn next_page(page: usize, len: usize, action: NavAction) -> usize {
    match action {
        NavAction::Forward if page + 1 < len => page + 1,
        NavAction::Back if page > 0 => page - 1,
        _ => page,
    }
}

pub fn render_view(response: &ResponseRecord) -> OutboundView {
    let mut controls = Vec::new();
    if response.has_back() {
        controls.push(NavAction::Back);
    }
    if response.has_forward() {
        controls.push(NavAction::Forward);
    }

    OutboundView {
        text: render_page(response),
        controls,
    }
}

pub struct PaginationEngine {
    state: BotState,
}

impl PaginationEngine {
    pub fn new(state: &BotState) -> Self {
        Self { state: state.clone() }
    }

    /// Первая страница нового ответа. Идентификатор сообщения
    /// проставляется после отправки.
    pub fn create_first_page(
        &self,
        chat_id: ChatId,
        entries: Vec<ScheduleEntry>,
        now: DateTime<Utc>,
    ) -> (ResponseRecord, OutboundView) {
        let response = ResponseRecord {
            id: None,
            chat_id,
            message_id: None,
            created_at: now,
            created_on: self.state.local_date(now),
            page: 0,
            entries,
        };
        let view = render_view(&response);
        (response, view)
    }

    pub async fn turn_page(&self, callback: &CallbackAction) -> Option<EditView> {
        let found = match self
            .state
            .storage
            .find_response(callback.chat_id, callback.message_id)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                log::error!("Error loading response for chat {}: {}", callback.chat_id, e);
                return None;
            }
        };

        let Some(mut response) = found else {
            log::debug!(
                "Response not found for chat {} message {}",
                callback.chat_id,
                callback.message_id.0
            );
            return Some(EditView {
                chat_id: callback.chat_id,
                message_id: callback.message_id,
                view: OutboundView::text(ChatMessage::SessionExpired.text()),
            });
        };

        let Some(action) = NavAction::from_callback_data(&callback.data) else {
            log::warn!("Unsupported callback query data was received: {}", callback.data);
            return None;
        };

        response.page = next_page(response.page, response.entries.len(), action);

        if let Some(id) = response.id {
            if let Err(e) = self.state.storage.update_response_page(id, response.page).await {
                log::error!("Error saving page of response {}: {}", id, e);
            }
        }

        Some(EditView {
            chat_id: callback.chat_id,
            message_id: callback.message_id,
            view: render_view(&response),
        })
    }
}
