use dashmap::DashMap;
use teloxide::types::UserId;

use crate::models::FormSession;

/// Анкеты пользователей, заполняемые в данный момент
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<UserId, FormSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Начинает новую анкету, предыдущая незавершенная анкета сбрасывается
    pub fn start(&self, user_id: UserId) -> FormSession {
        let session = FormSession::new(user_id);
        if self.sessions.insert(user_id, session.clone()).is_some() {
            log::debug!("Previous form of user {} was replaced", user_id);
        }
        session
    }

    pub fn get(&self, user_id: UserId) -> Option<FormSession> {
        self.sessions.get(&user_id).map(|s| s.value().clone())
    }

    pub fn is_awaiting_input(&self, user_id: UserId) -> bool {
        self.sessions
            .get(&user_id)
            .map(|s| s.awaiting_input)
            .unwrap_or(false)
    }

    /// Изменяет анкету под блокировкой записи. Замыкание не должно ждать.
    pub fn update<R>(&self, user_id: UserId, f: impl FnOnce(&mut FormSession) -> R) -> Option<R> {
        self.sessions.get_mut(&user_id).map(|mut s| f(s.value_mut()))
    }

    pub fn remove(&self, user_id: UserId) -> Option<FormSession> {
        self.sessions.remove(&user_id).map(|(_, session)| session)
    }

    /// Удаляет анкету, только если она закрыта. Новая анкета, начатая
    /// пока шел запрос расписания, остается на месте.
    pub fn remove_closed(&self, user_id: UserId) -> Option<FormSession> {
        self.sessions
            .remove_if(&user_id, |_, session| !session.awaiting_input)
            .map(|(_, session)| session)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}
