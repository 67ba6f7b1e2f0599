//! Per business-key mutual exclusion.
//!
//! Two records resolving to the same (board, key) pair must not both
//! observe "no existing item" and both create. Each pair gets its own async
//! mutex; the registry entry is dropped when the last holder or waiter
//! releases it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

use crate::model::BoardId;

type LockKey = (BoardId, String);

/// Registry of per-key async locks.
#[derive(Debug, Clone, Default)]
pub struct KeyLocks {
    inner: Arc<Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>>,
}

/// Held lock for one (board, key) pair. Released on drop.
#[derive(Debug)]
pub struct KeyGuard {
    key: LockKey,
    registry: KeyLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `(board_id, key)`.
    pub async fn acquire(&self, board_id: &BoardId, key: &str) -> KeyGuard {
        let lock_key = (board_id.clone(), key.to_string());
        let mutex = {
            let mut map = self.map();
            Arc::clone(
                map.entry(lock_key.clone())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };

        trace!(board_id = %board_id, key, "Waiting for key lock");
        let guard = mutex.lock_owned().await;

        KeyGuard {
            key: lock_key,
            registry: self.clone(),
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<LockKey, Arc<AsyncMutex<()>>>> {
        // The map is never left inconsistent while locked.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        // Release first so the strong count reflects only the map and waiters.
        self.guard.take();
        let mut map = self.registry.map();
        let unused = map
            .get(&self.key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1);
        if unused {
            map.remove(&self.key);
        }
    }
}
