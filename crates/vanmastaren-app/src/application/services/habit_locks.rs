use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use vanmastaren_domain::shared::HabitId;

/// One async mutex per habit id. Every write to a habit happens while its
/// guard is held, so two mutations of the same habit never interleave.
#[derive(Default)]
pub struct HabitLocks {
    locks: Mutex<HashMap<HabitId, Arc<AsyncMutex<()>>>>,
}

impl HabitLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`. The guard is owned so it can move
    /// into a spawned task.
    pub async fn acquire(&self, id: &HabitId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drop the entry of a deleted habit.
    pub fn forget(&self, id: &HabitId) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.remove(id);
    }

    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
