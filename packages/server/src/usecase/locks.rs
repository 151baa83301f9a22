//! Per-debate async locks.
//!
//! Use cases hold the guard across their whole read-modify-write sequence
//! (and the follow-up roster publish) so that two requests on the same debate
//! never interleave. Different debates never contend.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::DebateId;

#[derive(Default)]
pub struct DebateLocks {
    locks: Mutex<HashMap<DebateId, Arc<AsyncMutex<()>>>>,
}

impl DebateLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `debate_id`.
    ///
    /// The entry for `debate_id` is dropped from the map once the last
    /// holder or waiter goes away, including a waiter whose future is
    /// cancelled.
    pub async fn acquire(&self, debate_id: &DebateId) -> DebateLockGuard<'_> {
        let lock = {
            let mut locks = self.lock_map();
            locks.entry(debate_id.clone()).or_default().clone()
        };
        let mut guard = DebateLockGuard {
            locks: self,
            debate_id: debate_id.clone(),
            lock,
            held: None,
        };
        guard.held = Some(guard.lock.clone().lock_owned().await);
        guard
    }

    fn lock_map(&self) -> MutexGuard<'_, HashMap<DebateId, Arc<AsyncMutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.lock_map().len()
    }
}

/// Exclusive access to one debate; released on drop.
pub struct DebateLockGuard<'a> {
    locks: &'a DebateLocks,
    debate_id: DebateId,
    lock: Arc<AsyncMutex<()>>,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for DebateLockGuard<'_> {
    fn drop(&mut self) {
        self.held.take();
        let mut locks = self.locks.lock_map();
        // Only the map and this guard still reference the lock.
        let idle = locks
            .get(&self.debate_id)
            .is_some_and(|entry| Arc::ptr_eq(entry, &self.lock) && Arc::strong_count(entry) == 2);
        if idle {
            locks.remove(&self.debate_id);
        }
    }
}
