//! Bulk helpers built on the store and the painter.

use super::{BlendMode, Painter, Shape};
use crate::math::box_is_null;
use crate::types::Voxel;
use crate::volume::{Accessor, Volume};
use glam::{Mat4, Vec3};

/// Face neighbor offsets, shared by flood fill and vertex extraction.
pub(crate) const FACE_NEIGHBORS: [[i32; 3]; 6] = [
	[0, -1, 0],
	[0, 1, 0],
	[0, 0, -1],
	[0, 0, 1],
	[1, 0, 0],
	[-1, 0, 0],
];

impl Volume {
	/// Bulk dense write: copy `data` (RGBA voxels in (z, y, x) order, x
	/// fastest) into the region at `pos` of extents `size`. The fastest way
	/// to move externally produced voxel data into a volume.
	///
	/// Tiles left all-empty by the write are dropped afterwards.
	pub fn blit(&mut self, data: &[Voxel], pos: [i32; 3], size: [i32; 3]) {
		debug_assert_eq!(data.len(), (size[0] * size[1] * size[2]) as usize);
		let mut acc = Accessor::new();
		let mut src = data.iter();
		for z in pos[2]..pos[2] + size[2] {
			for y in pos[1]..pos[1] + size[1] {
				for x in pos[0]..pos[0] + size[0] {
					self.set_at(&mut acc, [x, y, z], *src.next().unwrap());
				}
			}
		}
		self.remove_empty_tiles(false);
	}

	/// Keep only the voxels inside `mat`: intersect with a full-opacity
	/// cube.
	pub fn crop(&mut self, mat: &Mat4) {
		let painter = Painter {
			mode: BlendMode::Intersect,
			shape: Shape::Cube,
			color: Voxel::new(255, 255, 255, 255),
			..Painter::default()
		};
		self.apply(&painter, mat);
	}

	/// Rewrite the volume under the affine transform `mat`, sampling the
	/// previous content nearest-neighbor through the inverse transform.
	pub fn transform(&mut self, mat: &Mat4) {
		let src = self.clone();
		let inv = mat.inverse();
		let mut bounds = self.bounding_box(true);
		if box_is_null(&bounds) {
			return;
		}
		bounds = *mat * bounds;
		self.fill(&bounds, |pos| {
			let p = inv.transform_point3(Vec3::new(pos[0] as f32, pos[1] as f32, pos[2] as f32));
			src.voxel_at([p.x.round() as i32, p.y.round() as i32, p.z.round() as i32])
		});
		self.remove_empty_tiles(false);
	}

	/// Clear the volume, then write `f(pos)` for every voxel whose tile
	/// intersects `bounds`.
	pub fn fill(&mut self, bounds: &Mat4, f: impl Fn([i32; 3]) -> Voxel) {
		self.clear();
		let mut acc = Accessor::new();
		for pos in self.box_voxels(bounds, false) {
			self.set_at(&mut acc, pos, f(pos));
		}
	}

	/// Shift every voxel's alpha by `v`, clamped to 0..=255.
	pub fn shift_alpha(&mut self, v: i32) {
		let positions: Vec<[i32; 3]> = self.voxels(false).collect();
		let mut acc = Accessor::new();
		for pos in positions {
			let mut value = self.get_at(&mut acc, pos);
			value.a = (i32::from(value.a) + v).clamp(0, 255) as u8;
			self.set_at(&mut acc, pos, value);
		}
	}

	/// Flood-fill a selection mask from `start` across face-connected
	/// solid voxels.
	///
	/// `cond` decides, for a candidate voxel reached from `base`, the alpha
	/// to select it with (0 rejects). The selection volume is cleared
	/// first; selected voxels are written white with the returned alpha.
	pub fn select(&self, start: [i32; 3], cond: impl Fn(&Volume, [i32; 3], [i32; 3]) -> u8, selection: &mut Volume) {
		selection.clear();
		let mut acc = Accessor::new();
		let mut sel_acc = Accessor::new();
		if self.alpha_at(&mut acc, start) == 0 {
			return;
		}
		selection.set_at(&mut sel_acc, start, Voxel::new(255, 255, 255, 255));

		let mut keep = true;
		while keep {
			keep = false;
			let positions: Vec<[i32; 3]> = selection.voxels(false).collect();
			for pos in positions {
				if selection.alpha_at(&mut sel_acc, pos) == 0 {
					continue;
				}
				for d in FACE_NEIGHBORS {
					let p = [pos[0] + d[0], pos[1] + d[1], pos[2] + d[2]];
					if selection.alpha_at(&mut sel_acc, p) != 0 {
						continue; // already selected
					}
					if self.alpha_at(&mut acc, p) == 0 {
						continue; // no voxel here
					}
					let a = cond(self, pos, p);
					if a != 0 {
						selection.set_at(&mut sel_acc, p, Voxel::new(255, 255, 255, a));
						keep = true;
					}
				}
			}
		}
	}
}
