//! Oriented-box helpers.
//!
//! Throughout the crate a box is a 4×4 affine matrix mapping the unit cube
//! `[-1, 1]³` to a region of voxel space. The column vectors are the box
//! half-axes, the translation column its center. An all-zero matrix is the
//! null box.

use crate::types::Aabb;
use glam::{Mat4, Vec3, Vec4};

/// Corners of the unit cube, the domain of every box matrix.
const UNIT_CORNERS: [Vec3; 8] = [
	Vec3::new(-1.0, -1.0, 1.0),
	Vec3::new(1.0, -1.0, 1.0),
	Vec3::new(1.0, 1.0, 1.0),
	Vec3::new(-1.0, 1.0, 1.0),
	Vec3::new(-1.0, -1.0, -1.0),
	Vec3::new(1.0, -1.0, -1.0),
	Vec3::new(1.0, 1.0, -1.0),
	Vec3::new(-1.0, 1.0, -1.0),
];

/// True for the all-zero matrix, the conventional "no box" value.
pub fn box_is_null(m: &Mat4) -> bool {
	*m == Mat4::ZERO
}

/// Integer bounding box of a box matrix: the floor/ceil hull of its eight
/// transformed corners.
pub fn box_aabb(m: &Mat4) -> Aabb {
	let mut min = [i32::MAX; 3];
	let mut max = [i32::MIN; 3];
	for corner in UNIT_CORNERS {
		let p = m.transform_point3(corner);
		for i in 0..3 {
			min[i] = min[i].min(p[i].floor() as i32);
			max[i] = max[i].max(p[i].ceil() as i32);
		}
	}
	Aabb::new(min, max)
}

/// Full extents of the box along its three axes (twice the half-axis norms).
pub fn box_size(m: &Mat4) -> Vec3 {
	Vec3::new(
		2.0 * m.x_axis.truncate().length(),
		2.0 * m.y_axis.truncate().length(),
		2.0 * m.z_axis.truncate().length(),
	)
}

/// Whether `p` lies inside the box, given the box's precomputed inverse.
pub fn box_contains(inv: &Mat4, p: Vec3) -> bool {
	let local = inv.transform_point3(p);
	local.abs().max_element() <= 1.0
}

/// The box matrix covering an integer AABB exactly.
pub fn aabb_to_box(aabb: &Aabb) -> Mat4 {
	if aabb.is_empty() {
		return Mat4::ZERO;
	}
	let min = Vec3::new(aabb.min[0] as f32, aabb.min[1] as f32, aabb.min[2] as f32);
	let max = Vec3::new(aabb.max[0] as f32, aabb.max[1] as f32, aabb.max[2] as f32);
	let center = (min + max) / 2.0;
	let half = (max - min) / 2.0;
	Mat4::from_cols(
		Vec4::new(half.x, 0.0, 0.0, 0.0),
		Vec4::new(0.0, half.y, 0.0, 0.0),
		Vec4::new(0.0, 0.0, half.z, 0.0),
		center.extend(1.0),
	)
}

/// Bit pattern of a matrix, usable as a hash/equality key for memoization.
pub fn mat_bits(m: &Mat4) -> [u32; 16] {
	m.to_cols_array().map(f32::to_bits)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn aabb_of_scaled_box() {
		let m = Mat4::from_scale(Vec3::splat(4.0));
		assert_eq!(box_aabb(&m), Aabb::new([-4, -4, -4], [4, 4, 4]));
	}

	#[test]
	fn aabb_of_translated_box() {
		let m = Mat4::from_translation(Vec3::new(8.0, 0.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0));
		assert_eq!(box_aabb(&m), Aabb::new([6, -2, -2], [10, 2, 2]));
	}

	#[test]
	fn size_is_full_extent() {
		let m = Mat4::from_scale(Vec3::new(4.0, 2.0, 1.0));
		assert_eq!(box_size(&m), Vec3::new(8.0, 4.0, 2.0));
	}

	#[test]
	fn contains_uses_closed_unit_cube() {
		let m = Mat4::from_scale(Vec3::splat(2.0));
		let inv = m.inverse();
		assert!(box_contains(&inv, Vec3::new(0.0, 0.0, 0.0)));
		assert!(box_contains(&inv, Vec3::new(2.0, 2.0, 2.0)));
		assert!(!box_contains(&inv, Vec3::new(2.1, 0.0, 0.0)));
	}

	#[test]
	fn aabb_box_round_trip() {
		let aabb = Aabb::new([0, -4, 8], [16, 4, 24]);
		assert_eq!(box_aabb(&aabb_to_box(&aabb)), aabb);
		assert!(box_is_null(&aabb_to_box(&Aabb::ZERO)));
	}
}
