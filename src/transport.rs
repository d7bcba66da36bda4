use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId};

use crate::error::TransportError;

/// Кнопки перелистывания страниц расписания
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Back,
    Forward,
}

impl NavAction {
    pub fn callback_data(&self) -> &'static str {
        match self {
            NavAction::Back => "BACK_BUTTON",
            NavAction::Forward => "FORWARD_BUTTON",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NavAction::Back => "Назад",
            NavAction::Forward => "Вперед",
        }
    }

    pub fn from_callback_data(data: &str) -> Option<Self> {
        match data {
            "BACK_BUTTON" => Some(NavAction::Back),
            "FORWARD_BUTTON" => Some(NavAction::Forward),
            _ => None,
        }
    }
}

/// Текст сообщения и строка кнопок под ним (назад, затем вперед)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundView {
    pub text: String,
    pub controls: Vec<NavAction>,
}

impl OutboundView {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            controls: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditView {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub view: OutboundView,
}

/// Канал доставки сообщений пользователю
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_view(&self, chat_id: ChatId, view: &OutboundView) -> Result<MessageId, TransportError>;

    async fn edit_view(&self, edit: &EditView) -> Result<(), TransportError>;

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageId, TransportError> {
        self.send_view(chat_id, &OutboundView::text(text)).await
    }
}

pub fn make_nav_keyboard(controls: &[NavAction]) -> InlineKeyboardMarkup {
    if controls.is_empty() {
        return InlineKeyboardMarkup::default();
    }

    let row = controls
        .iter()
        .map(|action| InlineKeyboardButton::callback(action.label(), action.callback_data()))
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(vec![row])
}

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_view(&self, chat_id: ChatId, view: &OutboundView) -> Result<MessageId, TransportError> {
        let request = self.bot.send_message(chat_id, view.text.clone());
        let message = if view.controls.is_empty() {
            request.await?
        } else {
            request.reply_markup(make_nav_keyboard(&view.controls)).await?
        };
        Ok(message.id)
    }

    async fn edit_view(&self, edit: &EditView) -> Result<(), TransportError> {
        // Пустая клавиатура убирает кнопки у редактируемого сообщения
        self.bot
            .edit_message_text(edit.chat_id, edit.message_id, edit.view.text.clone())
            .reply_markup(make_nav_keyboard(&edit.view.controls))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_keeps_back_before_forward() {
        let keyboard = make_nav_keyboard(&[NavAction::Back, NavAction::Forward]);
        assert_eq!(keyboard.inline_keyboard.len(), 1);
        let labels: Vec<_> = keyboard.inline_keyboard[0].iter().map(|b| b.text.as_str()).collect();
        assert_eq!(labels, vec!["Назад", "Вперед"]);
    }

    #[test]
    fn callback_data_round_trips() {
        for action in [NavAction::Back, NavAction::Forward] {
            assert_eq!(NavAction::from_callback_data(action.callback_data()), Some(action));
        }
        assert_eq!(NavAction::from_callback_data("calendar_ignore"), None);
    }
}
