//! Tile geometry and refcounted tile payloads.
//!
//! A volume is partitioned into cubic tiles of edge [`TILE_SIZE`]. A tile's
//! payload is the dense voxel array backing it; payloads are shared between
//! tiles (and between volumes) via `Arc` and copied on first write. The rest
//! of the engine is tuned for `TILE_SIZE == 16`: the per-tile vertex arrays
//! stay bounded, a (N+2)³ border read fits one allocation, and the tile-map
//! hash cost is amortized over a tile's worth of accesses.

use super::Aabb;
use super::Voxel;
use lazy_static::lazy_static;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Edge length of a cubic tile, in voxels.
pub const TILE_SIZE: i32 = 16;

/// Number of voxels in one tile payload.
pub const TILE_VOLUME: usize = (TILE_SIZE * TILE_SIZE * TILE_SIZE) as usize;

/// Global monotone id source for payload ids and volume version keys.
///
/// Ids 0 and 1 are reserved: 0 marks the singleton all-empty payload, 1 the
/// version key of the empty volume.
static NEXT_UID: AtomicU64 = AtomicU64::new(2);

pub(crate) fn next_uid() -> u64 {
	NEXT_UID.fetch_add(1, Ordering::Relaxed)
}

/// Origin of a tile cell. Every coordinate is a multiple of [`TILE_SIZE`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct TilePos {
	pub x: i32,
	pub y: i32,
	pub z: i32,
}

impl TilePos {
	pub const fn new(x: i32, y: i32, z: i32) -> TilePos {
		TilePos { x, y, z }
	}

	/// The origin of the tile cell containing `pos`.
	///
	/// Masking keeps negative coordinates on the lattice (`-1` lands in the
	/// tile at `-TILE_SIZE`).
	pub const fn of(pos: [i32; 3]) -> TilePos {
		TilePos {
			x: pos[0] & !(TILE_SIZE - 1),
			y: pos[1] & !(TILE_SIZE - 1),
			z: pos[2] & !(TILE_SIZE - 1),
		}
	}

	pub const fn to_array(self) -> [i32; 3] {
		[self.x, self.y, self.z]
	}

	/// The axis-aligned box covered by this tile cell.
	pub const fn aabb(&self) -> Aabb {
		Aabb {
			min: [self.x, self.y, self.z],
			max: [self.x + TILE_SIZE, self.y + TILE_SIZE, self.z + TILE_SIZE],
		}
	}

	/// Index of `pos` inside this tile's payload (x fastest, z slowest).
	///
	/// `pos` must lie inside the tile cell.
	pub fn index_of(&self, pos: [i32; 3]) -> usize {
		let x = pos[0] - self.x;
		let y = pos[1] - self.y;
		let z = pos[2] - self.z;
		debug_assert!(x >= 0 && x < TILE_SIZE);
		debug_assert!(y >= 0 && y < TILE_SIZE);
		debug_assert!(z >= 0 && z < TILE_SIZE);
		(x + y * TILE_SIZE + z * TILE_SIZE * TILE_SIZE) as usize
	}
}

/// The dense voxel array backing one tile.
///
/// Payloads are immutable while shared (refcount > 1); writers go through
/// [`crate::Volume::set_at`], which clones a shared payload first and stamps
/// a fresh id in either case. The id is the payload's identity for render
/// caching and merge memoization; id 0 is the singleton all-empty payload.
#[derive(Clone)]
pub struct TilePayload {
	pub(crate) id: u64,
	pub(crate) voxels: [Voxel; TILE_VOLUME],
}

impl TilePayload {
	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn voxels(&self) -> &[Voxel] {
		&self.voxels
	}

	/// True when every voxel has zero alpha, regardless of the payload id.
	pub fn is_all_empty(&self) -> bool {
		self.id == 0 || self.voxels.iter().all(Voxel::is_empty)
	}
}

lazy_static! {
	static ref EMPTY_PAYLOAD: Arc<TilePayload> = Arc::new(TilePayload {
		id: 0,
		voxels: [Voxel::EMPTY; TILE_VOLUME],
	});
}

/// The all-empty payload shared by every newly created tile.
pub(crate) fn empty_payload() -> Arc<TilePayload> {
	Arc::clone(&EMPTY_PAYLOAD)
}
