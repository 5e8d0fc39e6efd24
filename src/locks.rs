use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-identifier exclusive sections.
///
/// Holders of the guard for one id are serialized; different ids never wait
/// on each other. A slot lives only while someone holds or waits on it.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    slots: DashMap<Uuid, Arc<Mutex<()>>>,
}

/// Exclusive section for one id. Releasing the last reference prunes the slot.
#[derive(Debug)]
pub struct SlotGuard<'a> {
    locks: &'a KeyedLocks,
    id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    pub async fn acquire(&self, id: Uuid) -> SlotGuard<'_> {
        // Clone the slot out so the shard lock is released before awaiting.
        let slot = self.slots.entry(id).or_default().clone();
        let guard = slot.lock_owned().await;
        SlotGuard {
            locks: self,
            id,
            guard: Some(guard),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own reference left: nobody holds or waits on this id.
        self.locks
            .slots
            .remove_if(&self.id, |_, slot| Arc::strong_count(slot) == 1);
    }
}
