//! Bounding boxes of a volume.

use super::Volume;
use crate::math::aabb_to_box;
use crate::types::Aabb;
use glam::Mat4;

impl Volume {
	/// Axis-aligned integer bounding box `[lo, hi)` of the volume.
	///
	/// With `exact == false` the result is tile-granular: the hull of every
	/// occupied tile cell, fast but possibly up to a tile larger than the
	/// data. With `exact == true` every voxel is visited and the hull is
	/// tight around non-zero-alpha voxels.
	///
	/// An empty volume yields [`Aabb::ZERO`].
	pub fn bbox(&self, exact: bool) -> Aabb {
		let mut ret = Aabb::inverted();
		if exact {
			let mut acc = super::Accessor::new();
			for pos in self.voxels(true) {
				if self.alpha_at(&mut acc, pos) == 0 {
					continue;
				}
				ret.include(pos);
			}
		} else {
			for (pos, tile) in self.tiles.iter() {
				if tile.id == 0 {
					continue;
				}
				let cell = pos.aabb();
				ret.include(cell.min);
				ret.include([cell.max[0] - 1, cell.max[1] - 1, cell.max[2] - 1]);
			}
		}
		ret.normalized()
	}

	/// The bounding box as an affine box matrix (unit cube to hull).
	/// An empty volume yields the null box.
	pub fn bounding_box(&self, exact: bool) -> Mat4 {
		aabb_to_box(&self.bbox(exact))
	}
}
