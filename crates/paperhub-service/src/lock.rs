//! Keyed mutual exclusion for read-modify-write sequences.
//!
//! One Tokio mutex per key, created on demand and dropped again once no
//! guard or waiter refers to it. Keys never contend with each other.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

use paperhub_core::types::{DocumentId, FolderId};

/// Registry of per-folder locks, shared by every service that touches
/// `used_sheets`.
pub type FolderLocks = LockRegistry<FolderId>;

/// Registry of per-document locks.
pub type DocumentLocks = LockRegistry<DocumentId>;

/// A map of lazily created per-key mutexes.
pub struct LockRegistry<K>
where
    K: Eq + Hash + Clone,
{
    locks: Arc<DashMap<K, Arc<Mutex<()>>>>,
}

impl<K> LockRegistry<K>
where
    K: Eq + Hash + Ord + Clone + fmt::Display,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Waits for exclusive access to `key`.
    pub async fn lock(&self, key: K) -> KeyGuard<K> {
        let mutex = {
            let entry = self
                .locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())));
            Arc::clone(entry.value())
        };
        let guard = mutex.lock_owned().await;
        trace!(key = %key, "Lock acquired");

        KeyGuard {
            key,
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Locks several keys in ascending order, skipping duplicates.
    ///
    /// Every caller acquiring more than one key goes through here, so two
    /// operations over the same pair of keys cannot deadlock.
    pub async fn lock_all(&self, keys: impl IntoIterator<Item = K>) -> Vec<KeyGuard<K>> {
        let mut keys: Vec<K> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            guards.push(self.lock(key).await);
        }
        guards
    }

    /// Number of keys that currently have a live mutex.
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

impl<K> Default for LockRegistry<K>
where
    K: Eq + Hash + Ord + Clone + fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for LockRegistry<K>
where
    K: Eq + Hash + Clone,
{
    fn clone(&self) -> Self {
        Self {
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<K> fmt::Debug for LockRegistry<K>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockRegistry")
            .field("active", &self.locks.len())
            .finish()
    }
}

/// Exclusive access to one key; released on drop.
pub struct KeyGuard<K>
where
    K: Eq + Hash + Clone,
{
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<K, Arc<Mutex<()>>>>,
}

impl<K> KeyGuard<K>
where
    K: Eq + Hash + Clone,
{
    /// The locked key.
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K> Drop for KeyGuard<K>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        // Release first so the map entry is the only remaining owner.
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl<K> fmt::Debug for KeyGuard<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGuard").field("key", &self.key).finish()
    }
}
