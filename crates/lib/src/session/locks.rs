use crate::types::SessionId;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<SessionId, Arc<AsyncMutex<()>>>;

/// Hands out one async mutex per session id.
///
/// Holding the returned guard makes the caller the only writer of that session,
/// across any `.await` it performs. Entries are dropped again once no caller
/// holds or waits for them.
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: Mutex<LockMap>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until `id` is free and locks it.
    pub async fn acquire(&self, id: &SessionId) -> SessionGuard<'_> {
        let lock = Arc::clone(self.map().entry(id.clone()).or_default());
        // Dropped after the wait below, so a cancelled wait still prunes.
        let _waiting = Waiting { owner: self, id };
        let guard = lock.lock_owned().await;
        SessionGuard {
            owner: self,
            id: id.clone(),
            guard: Some(guard),
        }
    }

    /// Number of ids with a live lock entry.
    pub fn active(&self) -> usize {
        self.map().len()
    }

    /// Removes the entry for `id` once only the map still refers to it.
    fn prune(&self, id: &SessionId) {
        let mut map = self.map();
        if map.get(id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            map.remove(id);
        }
    }

    fn map(&self) -> MutexGuard<'_, LockMap> {
        // The map is only touched in short critical sections that cannot leave it
        // half-updated, so a poisoned lock is still safe to use.
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Exclusive access to one session. Released on drop.
#[derive(Debug)]
pub struct SessionGuard<'a> {
    owner: &'a SessionLocks,
    id: SessionId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.owner.prune(&self.id);
    }
}

struct Waiting<'a> {
    owner: &'a SessionLocks,
    id: &'a SessionId,
}

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        self.owner.prune(self.id);
    }
}
