use chrono::{Months, NaiveDate, Utc};
use teloxide::types::{ChatId, UserId};

use crate::bot_state::BotState;
use crate::directory::{normalize_city_name, CityDirectory};
use crate::error::ApiError;
use crate::handlers::pagination::PaginationEngine;
use crate::handlers::utils::{confirmation_text, ChatMessage, NO_ANSWER, YES_ANSWER};
use crate::models::{FormSession, FormState, Question, RequestRecord, ScheduleEntry};
use crate::rasp::{fetch_schedule, ScheduleQuery};

const DATE_FORMAT: &str = "%Y-%m-%d";
const PAST_WINDOW_DAYS: u64 = 30;
const FUTURE_WINDOW_MONTHS: u32 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    UnknownCity,
    InvalidDateFormat,
    DateOutOfRange,
}

impl RetryReason {
    fn message(&self) -> ChatMessage {
        match self {
            RetryReason::UnknownCity => ChatMessage::NotValidCity,
            RetryReason::InvalidDateFormat => ChatMessage::InvalidDate,
            RetryReason::DateOutOfRange => ChatMessage::ImpossibleDate,
        }
    }
}

/// Результат обработки одного ответа пользователя
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Ответ принят; `None` означает, что анкета ждет подтверждения
    Accepted(Option<Question>),
    /// Ответ отклонен, вопрос остается прежним
    Retry(Question, RetryReason),
    Confirmed,
    Declined,
    Ignored,
}

/// Проверка даты поездки: формат YYYY-MM-DD и окно
/// [сегодня - 30 дней, сегодня + 11 месяцев)
pub fn validate_travel_date(text: &str, today: NaiveDate) -> Result<NaiveDate, RetryReason> {
    let date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| RetryReason::InvalidDateFormat)?;

    let earliest = today - chrono::Days::new(PAST_WINDOW_DAYS);
    let latest = today
        .checked_add_months(Months::new(FUTURE_WINDOW_MONTHS))
        .unwrap_or(NaiveDate::MAX);

    if date >= earliest && date < latest {
        Ok(date)
    } else {
        Err(RetryReason::DateOutOfRange)
    }
}

/// Применяет ответ к анкете. При ошибке проверки шаг не меняется.
pub fn apply_answer(
    session: &mut FormSession,
    text: &str,
    directory: &CityDirectory,
    today: NaiveDate,
) -> AnswerOutcome {
    let question = match session.state() {
        FormState::Collecting(question) => question,
        FormState::PendingConfirmation => {
            return match text.trim() {
                YES_ANSWER => AnswerOutcome::Confirmed,
                NO_ANSWER => AnswerOutcome::Declined,
                _ => AnswerOutcome::Ignored,
            };
        }
    };

    match question {
        Question::Origin | Question::Destination => {
            let name = normalize_city_name(text);
            let Some(code) = directory.resolve(&name) else {
                return AnswerOutcome::Retry(question, RetryReason::UnknownCity);
            };
            if question == Question::Origin {
                session.answers.origin_name = Some(name);
                session.answers.origin_code = Some(code);
            } else {
                session.answers.destination_name = Some(name);
                session.answers.destination_code = Some(code);
            }
        }
        Question::Date => {
            // "Да" вместо даты: расписание на все дни
            if text.trim() != YES_ANSWER {
                match validate_travel_date(text, today) {
                    Ok(date) => session.answers.date = Some(date),
                    Err(reason) => return AnswerOutcome::Retry(question, reason),
                }
            }
        }
    }

    AnswerOutcome::Accepted(session.advance())
}

pub struct FormEngine {
    state: BotState,
}

impl FormEngine {
    pub fn new(state: &BotState) -> Self {
        Self { state: state.clone() }
    }

    async fn say(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.state.transport.send_text(chat_id, text).await {
            log::error!("Error sending message to chat {}: {}", chat_id, e);
        }
    }

    pub async fn start(&self, user_id: UserId, chat_id: ChatId) {
        self.state.sessions.start(user_id);
        log::info!("📝 User {} started timetable form", user_id);

        self.say(chat_id, ChatMessage::Timetable.text()).await;
        self.say(chat_id, Question::Origin.prompt()).await;
    }

    pub async fn submit_answer(&self, user_id: UserId, chat_id: ChatId, text: &str) -> Option<AnswerOutcome> {
        let today = self.state.today();
        let directory = &self.state.directory;

        // Блокировка записи держится только внутри замыкания
        let outcome = self
            .state
            .sessions
            .update(user_id, |session| apply_answer(session, text, directory, today))?;

        match outcome {
            AnswerOutcome::Accepted(Some(next)) => {
                self.say(chat_id, next.prompt()).await;
            }
            AnswerOutcome::Accepted(None) => {
                if let Some(session) = self.state.sessions.get(user_id) {
                    self.say(chat_id, &confirmation_text(&session.answers)).await;
                }
            }
            AnswerOutcome::Retry(question, reason) => {
                log::debug!("User {} answer rejected: {:?}", user_id, reason);
                self.say(chat_id, reason.message().text()).await;
                self.say(chat_id, question.prompt()).await;
            }
            AnswerOutcome::Confirmed => self.finalize(user_id, chat_id).await,
            AnswerOutcome::Declined => self.cancel(user_id, chat_id).await,
            AnswerOutcome::Ignored => {
                log::warn!("Unsupported confirmation answer from user {}: {}", user_id, text);
            }
        }

        Some(outcome)
    }

    /// Отправляет запрос расписания. Анкета удаляется в любом случае.
    pub async fn finalize(&self, user_id: UserId, chat_id: ChatId) {
        let Some(session) = self.state.sessions.update(user_id, |session| {
            session.awaiting_input = false;
            session.clone()
        }) else {
            log::warn!("No form to finalize for user {}", user_id);
            return;
        };

        self.say(chat_id, ChatMessage::RequestProcessing.text()).await;

        let mut request = RequestRecord::from_answers(session.user_id, &session.answers);
        let query = ScheduleQuery {
            code_from: request.code_from.clone(),
            code_to: request.code_to.clone(),
            date: request.date,
        };

        let entries = match fetch_schedule(self.state.api.as_ref(), &query).await {
            Ok(entries) => {
                if entries.is_empty() {
                    self.say(chat_id, ChatMessage::EmptyTimetables.text()).await;
                }
                entries
            }
            Err(e) => {
                log::error!("Schedules API request of user {} failed: {}", user_id, e);
                let notice = match e {
                    ApiError::Client { .. } => ChatMessage::SchedulesApiClientError,
                    ApiError::Server { .. } => ChatMessage::SchedulesApiServerError,
                    ApiError::Transport(_) | ApiError::Parse(_) => ChatMessage::EmptyTimetables,
                };
                self.say(chat_id, notice.text()).await;
                Vec::new()
            }
        };

        if !entries.is_empty() {
            request.successfully = true;
            self.say(chat_id, ChatMessage::TimetableWasReceived.text()).await;
            request.response_id = self.deliver_first_page(chat_id, entries).await;
        }

        match self.state.storage.save_request(&request).await {
            Ok(id) => log::info!("💾 Request {} of user {} saved", id, user_id),
            Err(e) => log::error!("❌ Error saving request of user {}: {}", user_id, e),
        }

        if self.state.sessions.remove_closed(user_id).is_none() {
            log::debug!("User {} started a new form while the request was processed", user_id);
        }
    }

    /// Отправляет первую страницу и сохраняет ответ; возвращает его id
    async fn deliver_first_page(&self, chat_id: ChatId, entries: Vec<ScheduleEntry>) -> Option<i64> {
        let pagination = PaginationEngine::new(&self.state);
        let (mut response, view) = pagination.create_first_page(chat_id, entries, Utc::now());

        match self.state.transport.send_view(chat_id, &view).await {
            Ok(message_id) => response.message_id = Some(message_id),
            Err(e) => {
                log::error!("Error sending timetable to chat {}: {}", chat_id, e);
                return None;
            }
        }

        match self.state.storage.save_response(&response).await {
            Ok(id) => Some(id),
            Err(e) => {
                log::error!("Error saving response for chat {}: {}", chat_id, e);
                None
            }
        }
    }

    pub async fn cancel(&self, user_id: UserId, chat_id: ChatId) {
        if self.state.sessions.remove(user_id).is_some() {
            log::info!("User {} cancelled the form", user_id);
        }
        self.say(chat_id, ChatMessage::Cancel.text()).await;
    }
}
