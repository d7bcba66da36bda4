use chrono::{DateTime, Days, Utc};
use std::time::Duration;
use tokio::time::{self, Instant};

use crate::bot_state::BotState;
use crate::config::Config;
use crate::error::{LockError, StorageError};

/// Пауза перед повтором обновления справочника, если блокировку держит очистка
pub const LOCK_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Обновляет справочник городов под блокировкой бота.
/// `Ok(false)` означает, что загрузка не удалась и остался прежний снимок.
pub async fn refresh_directory(state: &BotState) -> Result<bool, LockError> {
    let guard = state.lock.acquire_maintenance()?;

    let refreshed = state.directory.refresh(state.api.as_ref()).await;
    state.lock.release(guard);
    Ok(refreshed)
}

/// Повторяет обновление, пока блокировка занята другой задачей
pub async fn refresh_with_retry(state: &BotState, delay: Duration) -> bool {
    loop {
        match refresh_directory(state).await {
            Ok(refreshed) => return refreshed,
            Err(e) => {
                log::warn!("Directory refresh postponed for {:?}: {}", delay, e);
                time::sleep(delay).await;
            }
        }
    }
}

/// Удаляет ответы, созданные раньше вчерашнего дня (по опорному часовому поясу).
/// Запросы, анкеты и справочник не затрагиваются.
pub async fn sweep_old_responses(state: &BotState, now: DateTime<Utc>) -> Result<u64, StorageError> {
    let guard = match state.lock.acquire_maintenance() {
        Ok(guard) => guard,
        Err(e) => {
            log::warn!("Response sweep skipped: {}", e);
            return Ok(0);
        }
    };

    let cutoff = state.local_date(now) - Days::new(1);
    log::info!("🧹 Deleting responses created before {}", cutoff);

    let deleted = state.storage.delete_responses_before(cutoff).await?;
    log::info!("🧹 Deleted {} old responses", deleted);

    state.lock.release(guard);
    log::info!("✅ Response sweep completed");
    Ok(deleted)
}

/// Запускает периодические задачи обслуживания
pub fn spawn_maintenance(state: &BotState, config: &Config) {
    let refresh_state = state.clone();
    let refresh_period = config.directory_refresh_interval;
    tokio::spawn(async move {
        let mut interval = delayed_interval(refresh_period);
        loop {
            interval.tick().await;
            refresh_with_retry(&refresh_state, LOCK_RETRY_DELAY).await;
        }
    });

    let sweep_state = state.clone();
    let sweep_period = config.response_sweep_interval;
    tokio::spawn(async move {
        let mut interval = delayed_interval(sweep_period);
        loop {
            interval.tick().await;
            if let Err(e) = sweep_old_responses(&sweep_state, Utc::now()).await {
                log::error!("❌ Response sweep failed: {}", e);
            }
        }
    });
}

// Первый запуск через период: справочник уже загружен при старте
fn delayed_interval(period: Duration) -> time::Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    interval
}
