use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::LockError;

/// Глобальная блокировка бота на время обслуживания.
/// Пока она захвачена, обычные сообщения пользователей не обрабатываются.
#[derive(Debug, Default)]
pub struct ServiceLock {
    locked: AtomicBool,
}

/// Снимает блокировку при уничтожении, в том числе если задача упала.
#[derive(Debug)]
pub struct MaintenanceGuard {
    lock: Arc<ServiceLock>,
}

impl ServiceLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    pub fn acquire_maintenance(self: &Arc<Self>) -> Result<MaintenanceGuard, LockError> {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LockError::AlreadyHeld)?;
        log::info!("🔒 Bot locked for maintenance");
        Ok(MaintenanceGuard { lock: Arc::clone(self) })
    }

    pub fn release(&self, guard: MaintenanceGuard) {
        drop(guard);
    }
}

impl Drop for MaintenanceGuard {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
        log::info!("🔓 Bot unlocked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_is_not_reentrant() {
        let lock = Arc::new(ServiceLock::new());
        let guard = lock.acquire_maintenance().unwrap();
        assert!(lock.is_locked());
        assert_eq!(lock.acquire_maintenance().unwrap_err(), LockError::AlreadyHeld);

        lock.release(guard);
        assert!(!lock.is_locked());
        assert!(lock.acquire_maintenance().is_ok());
    }

    #[test]
    fn guard_releases_after_panic() {
        let lock = Arc::new(ServiceLock::new());
        let lock_clone = lock.clone();

        let result = std::panic::catch_unwind(move || {
            let _guard = lock_clone.acquire_maintenance().unwrap();
            panic!("job failed");
        });

        assert!(result.is_err());
        assert!(!lock.is_locked());
    }
}
