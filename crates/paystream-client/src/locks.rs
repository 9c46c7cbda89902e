//! Per-stream mutual exclusion for mutating calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use paystream_core::StreamId;

/// One async lock per stream id. Mutations of the same stream queue up;
/// different streams proceed independently.
#[derive(Default)]
pub struct StreamLocks {
    locks: Mutex<HashMap<StreamId, Arc<AsyncMutex<()>>>>,
}

impl StreamLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`.
    pub async fn acquire(&self, id: StreamId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = match self.locks.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            // drop entries nobody holds or waits on
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of streams with a held or awaited lock.
    pub fn active(&self) -> usize {
        match self.locks.lock() {
            Ok(locks) => locks.values().filter(|l| Arc::strong_count(l) > 1).count(),
            Err(poisoned) => poisoned
                .into_inner()
                .values()
                .filter(|l| Arc::strong_count(l) > 1)
                .count(),
        }
    }
}
