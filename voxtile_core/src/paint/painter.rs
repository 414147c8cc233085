//! The painter aggregate and the bulk paint operation.

use super::mode::combine;
use super::{BlendMode, MemoCache, Shape};
use crate::math::{box_aabb, box_contains, box_is_null, box_size, mat_bits};
use crate::types::{TILE_SIZE, TilePos, Voxel};
use crate::volume::{Accessor, Volume};
use enumset::{EnumSet, EnumSetType};
use glam::{Mat4, Vec3};
use lazy_static::lazy_static;

/// A symmetry axis. Painting replicates the operation once per enabled
/// axis, mirrored through the painter's symmetry origin; axes combine
/// multiplicatively.
#[derive(EnumSetType, Debug, Hash)]
pub enum Axis {
	X,
	Y,
	Z,
}

/// The painting context: what to draw and how to combine it.
///
/// A painter renders its [`Shape`] into a volume through
/// [`Volume::apply`]. The shape's coverage of each voxel (0 to 1,
/// controlled by `smoothness`) scales the ink's alpha before the
/// [`BlendMode`] combines it with the existing voxel.
#[derive(Clone, Debug)]
pub struct Painter {
	pub mode: BlendMode,
	pub shape: Shape,
	/// The ink, RGBA.
	pub color: Voxel,
	/// Width of the coverage ramp around the shape surface, in voxels.
	/// 0 gives a hard-edged brush.
	pub smoothness: f32,
	pub symmetry: EnumSet<Axis>,
	pub symmetry_origin: Vec3,
	/// Optional box restricting the affected region.
	pub clip_box: Option<Mat4>,
}

impl Default for Painter {
	fn default() -> Painter {
		Painter {
			mode: BlendMode::Over,
			shape: Shape::Sphere,
			color: Voxel::new(255, 255, 255, 255),
			smoothness: 0.0,
			symmetry: EnumSet::empty(),
			symmetry_origin: Vec3::ZERO,
			clip_box: None,
		}
	}
}

#[derive(PartialEq, Eq, Hash)]
struct OpKey {
	volume_key: u64,
	mat: [u32; 16],
	mode: BlendMode,
	shape: Shape,
	color: Voxel,
	smoothness: u32,
	symmetry: u8,
	symmetry_origin: [u32; 3],
	clip: Option<[u32; 16]>,
}

impl OpKey {
	fn new(volume_key: u64, painter: &Painter, mat: &Mat4) -> OpKey {
		OpKey {
			volume_key,
			mat: mat_bits(mat),
			mode: painter.mode,
			shape: painter.shape,
			color: painter.color,
			smoothness: painter.smoothness.to_bits(),
			symmetry: painter.symmetry.as_u8(),
			symmetry_origin: painter.symmetry_origin.to_array().map(f32::to_bits),
			clip: painter.clip_box.as_ref().map(mat_bits),
		}
	}
}

lazy_static! {
	static ref OP_CACHE: MemoCache<OpKey> = MemoCache::with_capacity(32);
}

fn mirror_about(axis: Axis, origin: Vec3) -> Mat4 {
	let scale = match axis {
		Axis::X => Vec3::new(-1.0, 1.0, 1.0),
		Axis::Y => Vec3::new(1.0, -1.0, 1.0),
		Axis::Z => Vec3::new(1.0, 1.0, -1.0),
	};
	Mat4::from_translation(origin) * Mat4::from_scale(scale) * Mat4::from_translation(-origin)
}

impl Volume {
	/// Apply a paint operation: render the painter's shape into the region
	/// given by `mat`, the transform from the unit-centered cube to the
	/// target.
	///
	/// Each voxel's lattice center is mapped into the shape's local space,
	/// the shape's coverage is computed and blended into the voxel with the
	/// painter's mode. Results are memoized on the volume version key:
	/// repeating an op on an unchanged volume re-points it to the cached
	/// snapshot.
	///
	/// Painting never fails and has no bounds.
	pub fn apply(&mut self, painter: &Painter, mat: &Mat4) {
		let key = OpKey::new(self.key, painter, mat);
		if let Some(hit) = OP_CACHE.get(&key) {
			self.set_from(&hit);
			return;
		}

		if !painter.symmetry.is_empty() {
			let mut mirrored = painter.clone();
			for axis in painter.symmetry {
				mirrored.symmetry.remove(axis);
				let mat2 = mirror_about(axis, painter.symmetry_origin) * *mat;
				self.apply(&mirrored, &mat2);
			}
		}

		let size = box_size(mat);
		let local = (*mat * Mat4::from_scale(size.recip())).inverse();
		let clip_inv = painter
			.clip_box
			.filter(|b| !box_is_null(b))
			.map(|b| b.inverse());
		let skip_src = painter.mode.skips_empty_src();
		let skip_dst = painter.mode.skips_empty_dst();

		let mut acc = Accessor::new();
		if matches!(painter.mode, BlendMode::Intersect | BlendMode::IntersectFill) {
			// Tiles entirely outside the brush hull can never keep any
			// voxel; clear them first so no phantom tiles survive behind
			// the brush.
			let hull = box_aabb(mat);
			let tiles: Vec<TilePos> = self.tile_positions(false).collect();
			for tp in tiles {
				if !tp.aabb().intersects(&hull) {
					self.clear_tile(tp);
				}
			}
			let tiles: Vec<TilePos> = self.tile_positions(skip_dst).collect();
			for tp in tiles {
				for z in 0..TILE_SIZE {
					for y in 0..TILE_SIZE {
						for x in 0..TILE_SIZE {
							let pos = [tp.x + x, tp.y + y, tp.z + z];
							self.apply_at(&mut acc, pos, painter, &local, clip_inv.as_ref(), size, skip_src, skip_dst);
						}
					}
				}
			}
		} else {
			// The box walker owns its cursor, so the volume can be written
			// while it runs.
			for pos in self.box_voxels(mat, skip_dst) {
				self.apply_at(&mut acc, pos, painter, &local, clip_inv.as_ref(), size, skip_src, skip_dst);
			}
		}

		OP_CACHE.add(key, self.clone());
	}

	#[allow(clippy::too_many_arguments)]
	fn apply_at(
		&mut self,
		acc: &mut Accessor,
		pos: [i32; 3],
		painter: &Painter,
		local: &Mat4,
		clip_inv: Option<&Mat4>,
		size: Vec3,
		skip_src: bool,
		skip_dst: bool,
	) {
		let center = Vec3::new(pos[0] as f32 + 0.5, pos[1] as f32 + 0.5, pos[2] as f32 + 0.5);
		if let Some(inv) = clip_inv {
			if !box_contains(inv, center) {
				return;
			}
		}
		let p = local.transform_point3(center);
		let k = painter.shape.density(p, size, painter.smoothness);
		let coverage = if painter.smoothness > 0.0 {
			(k / painter.smoothness).clamp(-1.0, 1.0) / 2.0 + 0.5
		} else if k >= 0.0 {
			1.0
		} else {
			0.0
		};
		if coverage == 0.0 && skip_src {
			return;
		}
		let mut ink = painter.color;
		ink.a = (f32::from(ink.a) * coverage) as u8;
		if ink.a == 0 && skip_src {
			return;
		}
		let value = self.get_at(acc, pos);
		if value.a == 0 && skip_dst {
			return;
		}
		let new_value = combine(value, ink, painter.mode);
		if new_value != value {
			self.set_at(acc, pos, new_value);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sphere_painter(mode: BlendMode, color: Voxel) -> Painter {
		Painter {
			mode,
			shape: Shape::Sphere,
			color,
			..Painter::default()
		}
	}

	fn scaled_box(s: f32) -> Mat4 {
		Mat4::from_scale(Vec3::splat(s))
	}

	#[test]
	fn sphere_paint_covers_exactly_the_ball() {
		let mut v = Volume::new();
		let ink = Voxel::new(1, 2, 3, 255);
		v.apply(&sphere_painter(BlendMode::Over, ink), &scaled_box(4.0));
		let mut acc = Accessor::new();
		for x in -8..8 {
			for y in -8..8 {
				for z in -8..8 {
					let c = Vec3::new(x as f32 + 0.5, y as f32 + 0.5, z as f32 + 0.5);
					let expect = if c.length() <= 4.0 { ink } else { Voxel::EMPTY };
					assert_eq!(v.get_at(&mut acc, [x, y, z]), expect, "at {x} {y} {z}");
				}
			}
		}
	}

	#[test]
	fn sub_after_over_leaves_nothing() {
		let mut v = Volume::new();
		let cube = Painter {
			shape: Shape::Cube,
			color: Voxel::new(9, 9, 9, 255),
			..Painter::default()
		};
		v.apply(&cube, &scaled_box(4.0));
		assert!(!v.is_empty());
		let erase = Painter {
			mode: BlendMode::Sub,
			..cube
		};
		v.apply(&erase, &scaled_box(4.0));
		let mut acc = Accessor::new();
		assert!(v.voxels(false).all(|p| v.alpha_at(&mut acc, p) == 0));
		v.remove_empty_tiles(false);
		assert!(v.is_empty());
	}

	#[test]
	fn sub_does_not_touch_colors_outside_the_brush() {
		let mut v = Volume::new();
		let base = Voxel::new(10, 20, 30, 255);
		v.apply(
			&Painter {
				shape: Shape::Cube,
				color: base,
				..Painter::default()
			},
			&scaled_box(4.0),
		);
		// Erase a far-away region; colors of the cube must stay untouched.
		let erase = Painter {
			mode: BlendMode::Sub,
			shape: Shape::Cube,
			color: Voxel::new(255, 255, 255, 255),
			..Painter::default()
		};
		let far = Mat4::from_translation(Vec3::splat(100.0)) * scaled_box(2.0);
		let key_before = v.key();
		v.apply(&erase, &far);
		assert_eq!(v.voxel_at([0, 0, 0]), base);
		// Nothing was written at all: the key never moved.
		assert_eq!(v.key(), key_before);
	}

	#[test]
	fn intersect_clears_tiles_behind_the_brush() {
		let mut v = Volume::new();
		let cube = Painter {
			shape: Shape::Cube,
			color: Voxel::new(255, 255, 255, 255),
			..Painter::default()
		};
		v.apply(&cube, &scaled_box(4.0));
		let shifted = Mat4::from_translation(Vec3::new(4.0, 0.0, 0.0)) * scaled_box(4.0);
		v.apply(
			&Painter {
				mode: BlendMode::Intersect,
				..cube.clone()
			},
			&shifted,
		);
		// Only the overlap [0, 4) × [-4, 4)² remains.
		let mut acc = Accessor::new();
		for x in -8..16 {
			for y in -6..6 {
				let a = v.alpha_at(&mut acc, [x, y, 0]);
				let inside = (0..4).contains(&x) && (-4..4).contains(&y);
				assert_eq!(a != 0, inside, "at {x} {y}");
			}
		}
		// Tiles fully outside the second cube are gone entirely.
		assert_eq!(v.tile_payload_id(TilePos::new(-16, -16, -16)), 0);
	}

	#[test]
	fn symmetry_mirrors_through_the_origin() {
		let mut v = Volume::new();
		let mut p = sphere_painter(BlendMode::Over, Voxel::new(5, 5, 5, 255));
		p.symmetry = Axis::X.into();
		let mat = Mat4::from_translation(Vec3::new(8.0, 0.0, 0.0)) * scaled_box(2.0);
		v.apply(&p, &mat);
		assert!(v.voxel_at([8, 0, 0]).a != 0);
		assert!(v.voxel_at([-9, 0, 0]).a != 0);
	}

	#[test]
	fn clip_box_restricts_the_brush() {
		let mut v = Volume::new();
		let mut p = Painter {
			shape: Shape::Cube,
			color: Voxel::new(1, 1, 1, 255),
			..Painter::default()
		};
		p.clip_box = Some(Mat4::from_scale(Vec3::new(1.0, 100.0, 100.0)));
		v.apply(&p, &scaled_box(4.0));
		assert!(v.voxel_at([0, 0, 0]).a != 0);
		assert_eq!(v.voxel_at([2, 0, 0]).a, 0);
	}

	#[test]
	fn smoothness_ramps_coverage() {
		let mut v = Volume::new();
		let mut p = sphere_painter(BlendMode::Over, Voxel::new(255, 255, 255, 255));
		p.smoothness = 2.0;
		v.apply(&p, &scaled_box(4.0));
		let center = v.voxel_at([0, 0, 0]).a;
		let edge = v.voxel_at([3, 0, 0]).a;
		assert!(center > edge, "center {center} edge {edge}");
		assert!(edge > 0);
	}

	#[test]
	fn repeated_op_hits_the_memo_cache() {
		let mut base = Volume::new();
		base.set_voxel([0, 0, 0], Voxel::new(1, 1, 1, 255));
		let p = sphere_painter(BlendMode::Over, Voxel::new(7, 7, 7, 255));
		let mat = scaled_box(3.0);
		let mut a = base.clone();
		a.apply(&p, &mat);
		let mut b = base.clone();
		b.apply(&p, &mat);
		assert_eq!(a.key(), b.key());
	}
}
