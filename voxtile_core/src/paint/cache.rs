//! Capacity-bounded memoization of bulk-operation results.

use crate::volume::Volume;
use lru::LruCache;
use parking_lot::Mutex;
use std::hash::Hash;
use std::num::NonZeroUsize;

/// An LRU cache of volume snapshots keyed by operation parameters.
///
/// Values are [`Volume`] clones, so an entry holds a refcount on its tile
/// map; eviction drops that refcount like any other owner. Lookups and
/// insertions clone the volume, which is O(1).
pub(crate) struct MemoCache<K: Eq + Hash> {
	cache: Mutex<LruCache<K, Volume>>,
}

impl<K: Eq + Hash> MemoCache<K> {
	pub fn with_capacity(capacity: usize) -> MemoCache<K> {
		MemoCache {
			cache: Mutex::new(LruCache::new(NonZeroUsize::new(capacity).unwrap())),
		}
	}

	pub fn get(&self, key: &K) -> Option<Volume> {
		self.cache.lock().get(key).cloned()
	}

	pub fn add(&self, key: K, value: Volume) {
		self.cache.lock().put(key, value);
	}

	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.cache.lock().len()
	}
}
