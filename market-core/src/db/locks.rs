//! Entity lock registries
//!
//! Each product is the unit of mutual exclusion for stock and bid mutation.
//! One registry instance is shared by the catalog, the order engine, and the
//! auction engine, so a product cannot be stock-adjusted and bid on
//! concurrently; the order engine keeps a second registry keyed by order id
//! to serialize status transitions. Multi-key acquisition always runs in
//! ascending id order to keep overlapping commits deadlock-free.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-entity async mutexes, keyed by id
#[derive(Debug, Clone, Default)]
pub struct LockRegistry {
    locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: i64) -> Arc<Mutex<()>> {
        self.locks.entry(id).or_default().value().clone()
    }

    /// Lock a single entity
    pub async fn lock(&self, id: i64) -> OwnedMutexGuard<()> {
        self.entry(id).lock_owned().await
    }

    /// Lock several entities, ascending by id
    ///
    /// Duplicate ids are collapsed; guards are returned in acquisition order
    /// and release on drop.
    pub async fn lock_many(&self, ids: &[i64]) -> Vec<OwnedMutexGuard<()>> {
        let mut sorted = ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len());
        for id in sorted {
            guards.push(self.entry(id).lock_owned().await);
        }
        guards
    }

    /// Drop the registry entry for a deleted entity
    pub fn remove(&self, id: i64) {
        self.locks.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[tokio::test]
    async fn test_lock_is_exclusive() {
        let locks = LockRegistry::new();
        let guard = locks.lock(1).await;
        assert!(locks.entry(1).try_lock().is_err());
        drop(guard);
        assert!(locks.entry(1).try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_lock_many_dedups() {
        let locks = LockRegistry::new();
        let guards = locks.lock_many(&[3, 1, 3, 2, 1]).await;
        assert_eq!(guards.len(), 3);
    }

    #[tokio::test]
    async fn test_overlapping_lock_sets_serialize() {
        let locks = LockRegistry::new();
        let counter = Arc::new(AtomicI64::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                // Overlapping sets in mixed order; ascending acquisition
                // keeps this deadlock-free.
                let _guards = locks.lock_many(&[2, 1, 3]).await;
                let value = counter.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                counter.store(value + 1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }
}
