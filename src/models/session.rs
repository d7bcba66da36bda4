use chrono::NaiveDate;
use teloxide::types::UserId;

/// Вопросы анкеты в порядке их появления
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    Origin,
    Destination,
    Date,
}

impl Question {
    pub const ORDER: [Question; 3] = [Question::Origin, Question::Destination, Question::Date];

    pub fn at(step: usize) -> Option<Question> {
        Self::ORDER.get(step).copied()
    }

    pub fn count() -> usize {
        Self::ORDER.len()
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Question::Origin => "Введите название населенного пункта отправления.",
            Question::Destination => "Введите название населенного пункта прибытия.",
            Question::Date => {
                "Введите желаемую дату отправления в формате: YYYY-MM-DD.\n\
                Чтобы получить расписание на все дни, отправьте «Да»."
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormAnswers {
    pub origin_name: Option<String>,
    pub origin_code: Option<String>,
    pub destination_name: Option<String>,
    pub destination_code: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Collecting(Question),
    PendingConfirmation,
}

/// Незавершенная анкета пользователя. Живет только в памяти.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSession {
    pub user_id: UserId,
    pub answers: FormAnswers,
    step: usize,
    pub awaiting_input: bool,
}

impl FormSession {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            answers: FormAnswers::default(),
            step: 0,
            awaiting_input: true,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn state(&self) -> FormState {
        match Question::at(self.step) {
            Some(question) => FormState::Collecting(question),
            None => FormState::PendingConfirmation,
        }
    }

    /// Переход к следующему вопросу. Возвращает новый вопрос или `None`,
    /// если все ответы собраны и анкета ждет подтверждения.
    pub fn advance(&mut self) -> Option<Question> {
        if self.step < Question::count() {
            self.step += 1;
        }
        Question::at(self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_on_origin() {
        let session = FormSession::new(UserId(7));
        assert_eq!(session.step(), 0);
        assert!(session.awaiting_input);
        assert_eq!(session.state(), FormState::Collecting(Question::Origin));
    }

    #[test]
    fn advance_stops_at_confirmation() {
        let mut session = FormSession::new(UserId(7));
        assert_eq!(session.advance(), Some(Question::Destination));
        assert_eq!(session.advance(), Some(Question::Date));
        assert_eq!(session.advance(), None);
        assert_eq!(session.state(), FormState::PendingConfirmation);

        assert_eq!(session.advance(), None);
        assert_eq!(session.step(), 3);
    }
}
