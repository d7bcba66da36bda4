use chrono::{DateTime, NaiveTime};

use crate::models::{FormAnswers, ResponseRecord, ScheduleEntry};

pub const YES_ANSWER: &str = "Да";
pub const NO_ANSWER: &str = "Нет";

/// Фиксированные сообщения бота
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMessage {
    Help,
    Timetable,
    Cancel,
    NotValidCity,
    InvalidDate,
    ImpossibleDate,
    RequestProcessing,
    EmptyTimetables,
    TimetableWasReceived,
    SessionExpired,
    BotLocked,
    SchedulesApiClientError,
    SchedulesApiServerError,
}

impl ChatMessage {
    pub fn text(&self) -> &'static str {
        match self {
            ChatMessage::Help => {
                "Данный бот предоставляет пользователю возможность получить \
                расписание рейсов между двумя станциями.\n\
                Доступные команды:\n\
                /start - приветственное сообщение для начала работы с ботом;\n\
                /help - повторно вывести данное сообщение;\n\
                /timetable - получить расписание рейсов между двумя станциями;\n\
                /cancel - отменить нынешнюю команду."
            }
            ChatMessage::Timetable => {
                "Вы запустили процесс получения расписания рейсов между станциями.\n\
                Пожалуйста, следуйте дальнейшим инструкциям..."
            }
            ChatMessage::Cancel => "Команда отменена.",
            ChatMessage::NotValidCity => {
                "Населенный пункт не найден. Проверьте название и попробуйте еще раз."
            }
            ChatMessage::InvalidDate => {
                "Дата введена в неверном формате. Используйте формат YYYY-MM-DD."
            }
            ChatMessage::ImpossibleDate => {
                "Расписание доступно только на даты от 30 дней назад до 11 месяцев вперед."
            }
            ChatMessage::RequestProcessing => "Запрос обрабатывается, подождите...",
            ChatMessage::EmptyTimetables => "К сожалению, рейсы по вашему запросу не найдены.",
            ChatMessage::TimetableWasReceived => "Расписание получено!",
            ChatMessage::SessionExpired => {
                "Время просмотра этого расписания истекло. Запросите его заново командой /timetable."
            }
            ChatMessage::BotLocked => {
                "Бот временно недоступен: идут технические работы. Попробуйте через несколько минут."
            }
            ChatMessage::SchedulesApiClientError => {
                "Сервис расписаний не смог обработать запрос. Проверьте введенные данные и попробуйте снова."
            }
            ChatMessage::SchedulesApiServerError => {
                "Сервис расписаний временно недоступен. Попробуйте позже."
            }
        }
    }
}

/// Приветствие с именем пользователя
pub fn welcome_text(first_name: &str) -> String {
    let name = first_name.trim();
    let greeting = if name.is_empty() {
        "Здравствуйте!".to_string()
    } else {
        format!("Здравствуйте, {}!", name)
    };

    format!(
        "{} Вас приветствует железнодорожный бот-ассистент.\n\
        Для получения дополнительной информации о назначении и функционале бота \
        введите команду /help.",
        greeting
    )
}

pub fn confirmation_text(answers: &FormAnswers) -> String {
    let date = answers
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "все дни".to_string());

    format!(
        "Проверьте данные запроса:\n\
        Отправление: {}\n\
        Прибытие: {}\n\
        Дата: {}\n\n\
        Все верно? Ответьте «{}» или «{}».",
        answers.origin_name.as_deref().unwrap_or("-"),
        answers.destination_name.as_deref().unwrap_or("-"),
        date,
        YES_ANSWER,
        NO_ANSWER
    )
}

/// Время из ответа API в часовом поясе станции
fn format_station_time(value: &str) -> String {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return at.format("%d.%m.%Y %H:%M").to_string();
    }
    if let Ok(at) = NaiveTime::parse_from_str(value, "%H:%M:%S") {
        return at.format("%H:%M").to_string();
    }
    value.to_string()
}

pub fn render_entry(entry: &ScheduleEntry) -> String {
    let mut text = format!("🚆 Поезд {} «{}»\n", entry.train_number, entry.train_title);
    text.push_str(&format!("Откуда: {}\n", entry.from_station_title));
    text.push_str(&format!("Куда: {}\n", entry.to_station_title));
    if let Some(days) = &entry.days {
        text.push_str(&format!("Дни курсирования: {}\n", days));
    }
    text.push_str(&format!("Отправление: {}\n", format_station_time(&entry.departure)));
    text.push_str(&format!("Прибытие: {}\n\n", format_station_time(&entry.arrival)));
    text.push_str("Время указано местное.");
    text
}

pub fn render_page(response: &ResponseRecord) -> String {
    match response.current_entry() {
        Some(entry) => format!(
            "{}\n\nСтраница {} из {}",
            render_entry(entry),
            response.page + 1,
            response.entries.len()
        ),
        None => ChatMessage::EmptyTimetables.text().to_string(),
    }
}
