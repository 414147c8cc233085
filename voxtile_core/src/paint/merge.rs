//! Volume compositing, tile by tile, memoized at both granularities.

use super::mode::{color_mul, combine};
use super::{BlendMode, MemoCache};
use crate::types::{TILE_SIZE, TilePos};
use crate::volume::{Accessor, Volume};
use lazy_static::lazy_static;

#[derive(PartialEq, Eq, Hash)]
struct MergeKey {
	key1: u64,
	key2: u64,
	mode: BlendMode,
	color: Option<[u8; 4]>,
}

lazy_static! {
	/// Whole-volume merge results, keyed by both version keys.
	static ref MERGE_CACHE: MemoCache<MergeKey> = MemoCache::with_capacity(512);
	/// Single-tile merge results, keyed by both payload ids. The cached
	/// volume holds the merged tile at the origin.
	static ref TILE_CACHE: MemoCache<MergeKey> = MemoCache::with_capacity(512);
}

fn tile_merge(volume: &mut Volume, other: &Volume, pos: TilePos, mode: BlendMode, color: Option<[u8; 4]>) {
	let id1 = volume.tile_payload_id(pos);
	let id2 = other.tile_payload_id(pos);

	// Short-circuits that skip the per-voxel work entirely. The first two
	// are what make merging mostly-disjoint volumes O(shared tiles).
	if id2 == 0
		&& matches!(
			mode,
			BlendMode::Over | BlendMode::Max | BlendMode::Sub | BlendMode::SubClamp
		) {
		return;
	}
	if id1 == 0 && color.is_none() && matches!(mode, BlendMode::Over | BlendMode::Max) {
		volume.copy_tile_from(other, pos, pos);
		return;
	}
	if id1 == 0 && mode == BlendMode::MultAlpha {
		return;
	}

	let key = MergeKey {
		key1: id1,
		key2: id2,
		mode,
		color,
	};
	let tile = TILE_CACHE.get(&key).unwrap_or_else(|| {
		let mut tile = Volume::new();
		let mut a1 = Accessor::new();
		let mut a2 = Accessor::new();
		let mut a3 = Accessor::new();
		for z in 0..TILE_SIZE {
			for y in 0..TILE_SIZE {
				for x in 0..TILE_SIZE {
					let p = [pos.x + x, pos.y + y, pos.z + z];
					let v1 = volume.get_at(&mut a1, p);
					let mut v2 = other.get_at(&mut a2, p);
					if let Some(c) = color {
						v2 = color_mul(v2, c);
					}
					tile.set_at(&mut a3, [x, y, z], combine(v1, v2, mode));
				}
			}
		}
		TILE_CACHE.add(key, tile.clone());
		tile
	});

	volume.copy_tile_from(&tile, TilePos::new(0, 0, 0), pos);
}

impl Volume {
	/// Merge `other` into `self` with the given blend mode, optionally
	/// tinting the source by `color` (channel-wise multiply) first.
	///
	/// [`BlendMode::Replace`] aliases `self` to `other` outright. All other
	/// modes walk the union of both volumes' tiles and combine per voxel,
	/// with empty-tile short-circuits: an empty source tile is a no-op for
	/// over/max/sub-like modes, and an untinted over/max onto an empty
	/// destination tile just shares the source payload.
	///
	/// Results are memoized per tile pair and per volume pair, so repeated
	/// merges of unchanged volumes (layer compositing re-runs) are O(tiles)
	/// and O(1) respectively.
	pub fn merge(&mut self, other: &Volume, mode: BlendMode, color: Option<[u8; 4]>) {
		if mode == BlendMode::Replace {
			self.set_from(other);
			return;
		}

		let key = MergeKey {
			key1: self.key,
			key2: other.key,
			mode,
			color,
		};
		if let Some(hit) = MERGE_CACHE.get(&key) {
			self.set_from(&hit);
			return;
		}

		let union: Vec<TilePos> = self.union_tiles(other).collect();
		for pos in union {
			tile_merge(self, other, pos, mode, color);
		}

		MERGE_CACHE.add(key, self.clone());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::Voxel;

	const RED: Voxel = Voxel::new(255, 0, 0, 255);
	const BLUE: Voxel = Voxel::new(0, 0, 255, 255);

	#[test]
	fn over_merge_of_disjoint_volumes_shares_payloads() {
		let mut a = Volume::new();
		a.set_voxel([0, 0, 0], RED);
		let mut b = Volume::new();
		b.set_voxel([40, 0, 0], BLUE);
		a.merge(&b, BlendMode::Over, None);
		assert_eq!(a.voxel_at([0, 0, 0]), RED);
		assert_eq!(a.voxel_at([40, 0, 0]), BLUE);
		// The source tile was shared, not recomputed.
		let src = b.tile_payload_id(TilePos::new(32, 0, 0));
		let dst = a.tile_payload_id(TilePos::new(32, 0, 0));
		assert_eq!(src, dst);
	}

	#[test]
	fn replace_aliases_the_source() {
		let mut a = Volume::new();
		a.set_voxel([0, 0, 0], RED);
		let mut b = Volume::new();
		b.set_voxel([1, 1, 1], BLUE);
		a.merge(&b, BlendMode::Replace, None);
		assert_eq!(a.key(), b.key());
		assert_eq!(a.voxel_at([0, 0, 0]), Voxel::EMPTY);
		assert_eq!(a.voxel_at([1, 1, 1]), BLUE);
	}

	#[test]
	fn sub_merge_erases_overlap_only() {
		let mut a = Volume::new();
		a.set_voxel([0, 0, 0], RED);
		a.set_voxel([1, 0, 0], RED);
		let mut b = Volume::new();
		b.set_voxel([1, 0, 0], Voxel::new(0, 0, 0, 255));
		a.merge(&b, BlendMode::Sub, None);
		assert_eq!(a.voxel_at([0, 0, 0]), RED);
		assert_eq!(a.voxel_at([1, 0, 0]), Voxel::new(255, 0, 0, 0));
	}

	#[test]
	fn tint_applies_to_the_source() {
		let mut a = Volume::new();
		let mut b = Volume::new();
		b.set_voxel([0, 0, 0], Voxel::new(255, 255, 255, 255));
		a.merge(&b, BlendMode::Over, Some([255, 0, 0, 255]));
		assert_eq!(a.voxel_at([0, 0, 0]), Voxel::new(255, 0, 0, 255));
	}

	#[test]
	fn paint_merge_recolors_destination() {
		let mut a = Volume::new();
		a.set_voxel([0, 0, 0], RED);
		let mut b = Volume::new();
		b.set_voxel([0, 0, 0], BLUE);
		a.merge(&b, BlendMode::Paint, None);
		assert_eq!(a.voxel_at([0, 0, 0]), Voxel::new(0, 0, 255, 255));
		// Voxels with no source ink keep their color.
		assert_eq!(a.voxel_at([1, 0, 0]), Voxel::EMPTY);
	}

	#[test]
	fn repeated_merge_hits_the_volume_cache() {
		let mut a1 = Volume::new();
		a1.set_voxel([0, 0, 0], RED);
		let a2 = a1.clone();
		let mut b = Volume::new();
		b.set_voxel([8, 8, 8], BLUE);
		let mut m1 = a1;
		m1.merge(&b, BlendMode::Over, None);
		let mut m2 = a2;
		m2.merge(&b, BlendMode::Over, None);
		assert_eq!(m1.key(), m2.key());
	}

	#[test]
	fn mult_alpha_merge_keeps_empty_tiles_empty() {
		let mut a = Volume::new();
		let mut b = Volume::new();
		b.set_voxel([0, 0, 0], Voxel::new(255, 255, 255, 128));
		a.merge(&b, BlendMode::MultAlpha, None);
		assert_eq!(a.voxel_at([0, 0, 0]), Voxel::EMPTY);
	}
}
