//! Cached tile lookup for streams of neighboring accesses.

use crate::types::{TilePayload, TilePos};
use std::sync::Arc;

/// A cursor that amortizes tile-map lookups across successive accesses.
///
/// Naive per-voxel access would re-hash the tile map on every call. An
/// accessor remembers the last tile it touched (or the fact that no tile
/// exists at that origin) together with the volume version key at the time;
/// as long as accesses stay within that tile and the volume is unchanged,
/// no hashing happens.
///
/// Every mutation bumps the volume key, so a stale cache is detected on the
/// next access and refreshed transparently; callers never observe stale
/// data. [`crate::Volume::set_at`] re-caches the accessor it is given, so a
/// mixed read/write stream through one accessor stays amortized. Use one
/// accessor per volume: an accessor holding a payload of volume A pins that
/// payload, forcing a copy if volume B writes to a tile sharing it.
///
/// # Examples
///
/// ```
/// use voxtile_core::{Accessor, Volume, Voxel};
///
/// let mut volume = Volume::new();
/// let mut acc = Accessor::new();
/// volume.set_at(&mut acc, [1, 2, 3], Voxel::new(255, 0, 0, 255));
/// assert_eq!(volume.get_at(&mut acc, [1, 2, 3]).r, 255);
/// ```
#[derive(Clone, Default)]
pub struct Accessor {
	pub(crate) origin: Option<TilePos>,
	pub(crate) payload: Option<Arc<TilePayload>>,
	pub(crate) key: u64,
}

impl Accessor {
	pub fn new() -> Accessor {
		Accessor::default()
	}

	/// True if the cache is valid for tile `origin` of a volume at `key`.
	pub(crate) fn hits(&self, origin: TilePos, key: u64) -> bool {
		self.key == key && self.origin == Some(origin)
	}

	pub(crate) fn cache(&mut self, origin: TilePos, payload: Option<Arc<TilePayload>>, key: u64) {
		self.origin = Some(origin);
		self.payload = payload;
		self.key = key;
	}

	/// Drop the cached payload so in-place tile writes stay unique.
	pub(crate) fn release(&mut self) {
		self.origin = None;
		self.payload = None;
		self.key = 0;
	}
}
