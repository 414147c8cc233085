//! Iterators over voxels and tiles.
//!
//! Within one tile, voxel positions are emitted in (x, y, z) lexicographic
//! order with x innermost. Between tiles the order is the tile map's: it is
//! deterministic for a given volume state but otherwise unspecified;
//! callers that need globally sorted positions must sort.

use super::Volume;
use crate::math::box_aabb;
use crate::types::{TILE_SIZE, TILE_VOLUME, TilePayload, TilePos, Aabb};
use glam::Mat4;
use std::collections::hash_map;
use std::sync::Arc;

fn decode_index(origin: TilePos, idx: usize) -> [i32; 3] {
	let i = idx as i32;
	[
		origin.x + i % TILE_SIZE,
		origin.y + (i / TILE_SIZE) % TILE_SIZE,
		origin.z + i / (TILE_SIZE * TILE_SIZE),
	]
}

/// Iterator over every voxel position of every tile. See
/// [`Volume::voxels`].
pub struct Voxels<'a> {
	tiles: hash_map::Iter<'a, TilePos, Arc<TilePayload>>,
	skip_empty: bool,
	current: Option<(TilePos, usize)>,
}

impl Iterator for Voxels<'_> {
	type Item = [i32; 3];

	fn next(&mut self) -> Option<[i32; 3]> {
		loop {
			if let Some((origin, idx)) = &mut self.current {
				if *idx < TILE_VOLUME {
					let pos = decode_index(*origin, *idx);
					*idx += 1;
					return Some(pos);
				}
				self.current = None;
			}
			let (pos, tile) = self.tiles.next()?;
			if self.skip_empty && tile.id == 0 {
				continue;
			}
			self.current = Some((*pos, 0));
		}
	}
}

/// Iterator over the origin of each tile. See [`Volume::tile_positions`].
pub struct TilePositions<'a> {
	tiles: hash_map::Iter<'a, TilePos, Arc<TilePayload>>,
	skip_empty: bool,
}

impl Iterator for TilePositions<'_> {
	type Item = TilePos;

	fn next(&mut self) -> Option<TilePos> {
		loop {
			let (pos, tile) = self.tiles.next()?;
			if self.skip_empty && tile.id == 0 {
				continue;
			}
			return Some(*pos);
		}
	}
}

/// Iterator over every voxel position of every tile cell intersecting an
/// oriented box. See [`Volume::box_voxels`].
///
/// The walk is over whole tiles: every voxel of every intersecting tile is
/// yielded, including voxels outside the box itself. Callers filter by
/// evaluating their shape or box test per voxel. The iterator owns its
/// cursor and holds no borrow of the volume, so the volume may be mutated
/// while iterating.
pub struct BoxVoxels {
	aabb: Aabb,
	tile: Option<TilePos>,
	idx: usize,
	done: bool,
}

impl BoxVoxels {
	pub(crate) fn new(aabb: Aabb) -> BoxVoxels {
		BoxVoxels {
			aabb,
			tile: None,
			idx: 0,
			done: aabb.min[0] > aabb.max[0] || aabb.min[1] > aabb.max[1] || aabb.min[2] > aabb.max[2],
		}
	}

	fn advance_tile(&mut self) -> Option<TilePos> {
		let start = TilePos::of(self.aabb.min);
		match self.tile {
			None => {
				self.tile = Some(start);
			}
			Some(mut t) => {
				let mut coords = [t.x, t.y, t.z];
				let starts = [start.x, start.y, start.z];
				let mut i = 0;
				while i < 3 {
					coords[i] += TILE_SIZE;
					if coords[i] <= self.aabb.max[i] {
						break;
					}
					coords[i] = starts[i];
					i += 1;
				}
				if i == 3 {
					return None;
				}
				t = TilePos::new(coords[0], coords[1], coords[2]);
				self.tile = Some(t);
			}
		}
		self.tile
	}
}

impl Iterator for BoxVoxels {
	type Item = [i32; 3];

	fn next(&mut self) -> Option<[i32; 3]> {
		if self.done {
			return None;
		}
		loop {
			if let Some(tile) = self.tile {
				if self.idx < TILE_VOLUME {
					let pos = decode_index(tile, self.idx);
					self.idx += 1;
					return Some(pos);
				}
			}
			if self.advance_tile().is_none() {
				self.done = true;
				return None;
			}
			self.idx = 0;
		}
	}
}

impl Volume {
	/// Iterate every voxel position of every tile. With `skip_empty`, tiles
	/// still on the all-empty payload are skipped (voxels written back to
	/// zero alpha are still yielded; filter by alpha if needed).
	pub fn voxels(&self, skip_empty: bool) -> Voxels<'_> {
		Voxels {
			tiles: self.tiles.iter(),
			skip_empty,
			current: None,
		}
	}

	/// Iterate each tile's origin once.
	pub fn tile_positions(&self, skip_empty: bool) -> TilePositions<'_> {
		TilePositions {
			tiles: self.tiles.iter(),
			skip_empty,
		}
	}

	/// Iterate every voxel whose tile cell intersects the oriented box
	/// `mat` (a unit-cube transform).
	///
	/// The box is clipped to the hull of its corners; with `skip_empty` the
	/// hull is further clipped to the volume's tile-granular bounding box.
	/// Every voxel whose lattice center lies inside the box is yielded
	/// exactly once (plus surrounding voxels of the touched tiles).
	pub fn box_voxels(&self, mat: &Mat4, skip_empty: bool) -> BoxVoxels {
		let mut aabb = box_aabb(mat);
		if skip_empty {
			let hull = self.bbox(false);
			for i in 0..3 {
				aabb.min[i] = aabb.min[i].max(hull.min[i]);
				aabb.max[i] = aabb.max[i].min(hull.max[i]);
			}
		}
		BoxVoxels::new(aabb)
	}

	/// Iterate the tile origins present in `self` or `other`: first all of
	/// `self`'s, then those of `other` not in `self`.
	pub fn union_tiles<'a>(&'a self, other: &'a Volume) -> impl Iterator<Item = TilePos> + 'a {
		self
			.tiles
			.keys()
			.copied()
			.chain(other.tiles.keys().filter(|p| !self.tiles.contains_key(p)).copied())
	}
}
