//! Implicit brush shapes.

use glam::Vec3;

fn max3(v: Vec3) -> f32 {
	v.x.max(v.y).max(v.z)
}

/// The geometric primitives a painter can render.
///
/// Each shape is a signed scalar field over the brush's local space:
/// positive inside, negative outside, with magnitude in voxel units near the
/// surface. The selector is a plain enum, dispatched by [`Shape::density`];
/// the fields themselves are plain float functions of a local point `p` and
/// half-extents `s`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Shape {
	/// Axis-aligned ellipsoid (ellipse polar form).
	#[default]
	Sphere,
	/// Axis-aligned box.
	Cube,
	/// Ellipse cross-section extruded along Z.
	Cylinder,
}

impl Shape {
	/// Evaluate the shape's signed field at `p` for half-extents `s`.
	///
	/// `smoothness` widens the cube's inside/outside early-outs so the
	/// caller's coverage ramp stays exact; the round shapes ignore it.
	pub fn density(self, p: Vec3, s: Vec3, smoothness: f32) -> f32 {
		match self {
			Shape::Sphere => sphere_density(p, s),
			Shape::Cube => cube_density(p, s, smoothness),
			Shape::Cylinder => cylinder_density(p, s),
		}
	}
}

fn sphere_density(p: Vec3, s: Vec3) -> f32 {
	let d = p.length();
	if p == Vec3::ZERO {
		return max3(s);
	}
	// Ellipsoid radius along the direction of p, from the ellipse polar
	// form r(θ) = a·b / √((b·cosθ)² + (a·sinθ)²) generalized to 3D.
	let r = s.x * s.y * s.z
		/ Vec3::new(s.y * s.z * p.x / d, s.x * s.z * p.y / d, s.x * s.y * p.z / d).length();
	r - d
}

fn cube_density(p: Vec3, s: Vec3, sm: f32) -> f32 {
	// Outside the max cube:
	if p.x < -s.x - sm
		|| p.x >= s.x + sm
		|| p.y < -s.y - sm
		|| p.y >= s.y + sm
		|| p.z < -s.z - sm
		|| p.z >= s.z + sm
	{
		return f32::NEG_INFINITY;
	}
	// Or inside the min cube:
	if p.x >= -s.x + sm
		&& p.x < s.x - sm
		&& p.y >= -s.y + sm
		&& p.y < s.y - sm
		&& p.z >= -s.z + sm
		&& p.z < s.z - sm
	{
		return f32::INFINITY;
	}
	let mut min_v = f32::INFINITY;
	let mut ret = f32::INFINITY;
	for i in 0..3 {
		if p[i] != 0.0 {
			let v = s[i] / p[i].abs();
			if v < min_v {
				min_v = v;
				ret = s[i] - p[i].abs();
			}
		}
	}
	ret
}

fn cylinder_density(p: Vec3, s: Vec3) -> f32 {
	let d = p.truncate().length();
	let rz = s.z - p.z.abs();
	if p.x == 0.0 && p.y == 0.0 {
		return rz.min(max3(s));
	}
	// Ellipse polar form relative to center:
	// r(θ) = a·b / √((b·cosθ)² + (a·sinθ)²)
	let r = s.x * s.y / glam::Vec2::new(s.y * p.x / d, s.x * p.y / d).length();
	rz.min(r - d)
}
