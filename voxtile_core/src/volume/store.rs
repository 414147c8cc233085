//! The volume type and its pointwise operations.

use super::Accessor;
use crate::types::{TILE_SIZE, TilePayload, TilePos, Voxel, empty_payload, next_uid};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// A sparse, copy-on-write map from integer coordinates to voxels.
///
/// Storage is a hash map from tile origins to refcounted tile payloads;
/// unoccupied tile cells are simply absent (implicit empty). Negative
/// coordinates are legal; a volume has no bounds.
///
/// Cloning a volume is O(1): the tile map is shared and the first write
/// into either copy clones the map (and the touched payload) on demand.
///
/// Every volume carries a 64-bit version key. The key strictly increases on
/// every logical mutation; two volumes with the same key hold identical
/// voxel data (the reverse need not hold: keys are identity, not content
/// hashes). The canonical empty volume has key 1. Bulk operations use the
/// key for memoization.
pub struct Volume {
	pub(crate) tiles: Arc<HashMap<TilePos, Arc<TilePayload>>>,
	pub(crate) key: u64,
}

impl Volume {
	/// Create an empty volume (key 1, no tiles).
	pub fn new() -> Volume {
		Volume {
			tiles: Arc::new(HashMap::new()),
			key: 1,
		}
	}

	/// The volume's version key.
	///
	/// Guaranteed different for volumes with different content; volumes with
	/// equal keys answer identically at every coordinate.
	pub fn key(&self) -> u64 {
		self.key
	}

	/// True iff the volume holds no tiles at all.
	///
	/// Tiles whose voxels are all empty still count; call
	/// [`Volume::remove_empty_tiles`] first to drop them.
	pub fn is_empty(&self) -> bool {
		self.tiles.is_empty()
	}

	/// Number of allocated tiles, including all-empty ones.
	pub fn tile_count(&self) -> usize {
		self.tiles.len()
	}

	/// Make this volume an alias of `other`, releasing its own tiles.
	///
	/// No-op when both already share the same tile map.
	pub fn set_from(&mut self, other: &Volume) {
		if Arc::ptr_eq(&self.tiles, &other.tiles) {
			return;
		}
		self.tiles = Arc::clone(&other.tiles);
		self.key = other.key;
	}

	/// Drop all tiles and return to the canonical empty state (key 1).
	pub fn clear(&mut self) {
		self.tiles = Arc::new(HashMap::new());
		self.key = 1;
	}

	/// Read the voxel at `pos` through an accessor. Never fails; absent
	/// tiles read as [`Voxel::EMPTY`].
	pub fn get_at(&self, acc: &mut Accessor, pos: [i32; 3]) -> Voxel {
		let origin = TilePos::of(pos);
		if !acc.hits(origin, self.key) {
			acc.cache(origin, self.tiles.get(&origin).cloned(), self.key);
		}
		match &acc.payload {
			Some(payload) => payload.voxels[origin.index_of(pos)],
			None => Voxel::EMPTY,
		}
	}

	/// Alpha channel at `pos`; 0 for absent tiles.
	pub fn alpha_at(&self, acc: &mut Accessor, pos: [i32; 3]) -> u8 {
		self.get_at(acc, pos).a
	}

	/// One-shot read without an accessor.
	pub fn voxel_at(&self, pos: [i32; 3]) -> Voxel {
		let origin = TilePos::of(pos);
		match self.tiles.get(&origin) {
			Some(payload) => payload.voxels[origin.index_of(pos)],
			None => Voxel::EMPTY,
		}
	}

	/// Write the voxel at `pos`, allocating or cloning the tile as needed.
	///
	/// The write bumps the volume key and stamps a fresh payload id on the
	/// tile. `acc` is re-cached on the written tile, so a stream of writes
	/// (or mixed reads and writes) through one accessor hashes the tile map
	/// only when it crosses a tile boundary.
	pub fn set_at(&mut self, acc: &mut Accessor, pos: [i32; 3], v: Voxel) {
		let origin = TilePos::of(pos);
		// Release the accessor's payload alias so a unique tile stays
		// unique and the write happens in place.
		acc.release();
		self.key = next_uid();
		let tiles = Arc::make_mut(&mut self.tiles);
		let tile = tiles.entry(origin).or_insert_with(empty_payload);
		let payload = Arc::make_mut(tile);
		payload.id = next_uid();
		payload.voxels[origin.index_of(pos)] = v;
		let cached = Arc::clone(tile);
		acc.cache(origin, Some(cached), self.key);
	}

	/// One-shot write without an accessor.
	pub fn set_voxel(&mut self, pos: [i32; 3], v: Voxel) {
		let mut acc = Accessor::new();
		self.set_at(&mut acc, pos, v);
	}

	/// Remove the tile cell at `pos`. No-op if absent (the key is bumped
	/// either way).
	pub fn clear_tile(&mut self, pos: TilePos) {
		self.key = next_uid();
		let tiles = Arc::make_mut(&mut self.tiles);
		tiles.remove(&pos);
	}

	/// Raw payload data and payload id of the tile at `pos`, for zero-copy
	/// rendering paths. Returns `None` for absent tiles.
	///
	/// A payload id of 0 is the shared all-empty payload; ids are globally
	/// unique otherwise and change on every write, so they can key render
	/// caches.
	pub fn tile_data(&self, pos: TilePos) -> Option<(u64, &[Voxel])> {
		self.tiles.get(&pos).map(|t| (t.id, &t.voxels[..]))
	}

	/// Payload id of the tile at `pos`, 0 when absent or all-empty.
	pub fn tile_payload_id(&self, pos: TilePos) -> u64 {
		self.tiles.get(&pos).map_or(0, |t| t.id)
	}

	/// Point the tile at `dst_pos` to the payload of `src`'s tile at
	/// `src_pos`, sharing it by refcount. O(1); no voxel data is copied.
	/// A missing source tile shares the all-empty payload.
	pub fn copy_tile_from(&mut self, src: &Volume, src_pos: TilePos, dst_pos: TilePos) {
		let payload = src.tiles.get(&src_pos).cloned().unwrap_or_else(empty_payload);
		self.key = next_uid();
		let tiles = Arc::make_mut(&mut self.tiles);
		tiles.insert(dst_pos, payload);
	}

	/// Drop tiles that contain no voxel data. With `fast`, only tiles still
	/// on the shared all-empty payload are considered; otherwise payloads
	/// are scanned voxel by voxel.
	///
	/// Never changes the logical voxel mapping and preserves the version
	/// key.
	pub fn remove_empty_tiles(&mut self, fast: bool) {
		let key = self.key;
		let tiles = Arc::make_mut(&mut self.tiles);
		let before = tiles.len();
		tiles.retain(|_, t| if fast { t.id != 0 } else { !t.is_all_empty() });
		log::trace!("removed {} empty tiles", before - tiles.len());
		self.key = key;
	}

	/// Insert (all-empty) tiles at every face-neighbor of every occupied
	/// tile, so border reads for mesh extraction can walk a one-voxel rim
	/// without missing cells. Preserves the version key.
	pub fn ensure_neighbor_tiles(&mut self) {
		const NEIGHBORS: [[i32; 3]; 6] = [
			[0, 0, -1],
			[0, 0, 1],
			[0, -1, 0],
			[0, 1, 0],
			[-1, 0, 0],
			[1, 0, 0],
		];
		let key = self.key;
		let occupied: Vec<TilePos> = self
			.tiles
			.iter()
			.filter(|(_, t)| t.id != 0)
			.map(|(p, _)| *p)
			.collect();
		let tiles = Arc::make_mut(&mut self.tiles);
		for p in occupied {
			for d in NEIGHBORS {
				let q = TilePos::new(
					p.x + d[0] * TILE_SIZE,
					p.y + d[1] * TILE_SIZE,
					p.z + d[2] * TILE_SIZE,
				);
				tiles.entry(q).or_insert_with(empty_payload);
			}
		}
		self.key = key;
	}
}

impl Default for Volume {
	fn default() -> Volume {
		Volume::new()
	}
}

impl Clone for Volume {
	/// O(1): shares the tile map and keeps the version key, so a copy is
	/// indistinguishable from its source until one of them is written.
	fn clone(&self) -> Volume {
		Volume {
			tiles: Arc::clone(&self.tiles),
			key: self.key,
		}
	}
}

impl Debug for Volume {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Volume")
			.field("key", &self.key)
			.field("tiles", &self.tiles.len())
			.finish()
	}
}
