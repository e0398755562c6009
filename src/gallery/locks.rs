/// Per-owner mutual exclusion for gallery mutations
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Hands out one async lock per gallery owner.
///
/// Held across read, remote call and commit so two requests for the same
/// owner cannot interleave and leave zero or two main photos.
#[derive(Default)]
pub struct OwnerLocks {
    locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

/// Guard for one owner's gallery; released on drop
pub struct OwnerGuard {
    _guard: OwnedMutexGuard<()>,
}

impl OwnerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the owner's gallery
    pub async fn lock(&self, owner_id: i64) -> OwnerGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());

            // Drop entries nobody is holding or waiting on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);

            locks
                .entry(owner_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        OwnerGuard {
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of owners with a live lock entry
    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().unwrap().len()
    }
}
