//! Axis-aligned integer bounding boxes.

use std::fmt::Debug;

/// A half-open axis-aligned integer box `[min, max)`.
///
/// The empty box is represented canonically as all zeros, matching the
/// convention of [`crate::Volume::bbox`] for empty volumes. A box is treated
/// as empty whenever `min >= max` on any axis.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Aabb {
	pub min: [i32; 3],
	pub max: [i32; 3],
}

impl Aabb {
	/// The canonical empty box.
	pub const ZERO: Aabb = Aabb { min: [0; 3], max: [0; 3] };

	pub const fn new(min: [i32; 3], max: [i32; 3]) -> Aabb {
		Aabb { min, max }
	}

	pub fn is_empty(&self) -> bool {
		(0..3).any(|i| self.min[i] >= self.max[i])
	}

	pub fn contains(&self, p: [i32; 3]) -> bool {
		(0..3).all(|i| p[i] >= self.min[i] && p[i] < self.max[i])
	}

	/// Grow the box so it includes the unit cell at `p`.
	pub fn include(&mut self, p: [i32; 3]) {
		for i in 0..3 {
			self.min[i] = self.min[i].min(p[i]);
			self.max[i] = self.max[i].max(p[i] + 1);
		}
	}

	/// Component-wise intersection. The result may be empty.
	pub fn intersection(&self, other: &Aabb) -> Aabb {
		let mut ret = Aabb::ZERO;
		for i in 0..3 {
			ret.min[i] = self.min[i].max(other.min[i]);
			ret.max[i] = self.max[i].min(other.max[i]);
		}
		ret
	}

	pub fn intersects(&self, other: &Aabb) -> bool {
		!self.intersection(other).is_empty()
	}

	/// A box spanning no cell, positioned for incremental [`Aabb::include`].
	pub(crate) fn inverted() -> Aabb {
		Aabb {
			min: [i32::MAX; 3],
			max: [i32::MIN; 3],
		}
	}

	/// Collapse a never-grown [`Aabb::inverted`] box to the canonical zero.
	pub(crate) fn normalized(self) -> Aabb {
		if self.min[0] >= self.max[0] { Aabb::ZERO } else { self }
	}
}

impl Debug for Aabb {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_fmt(format_args!("Aabb({:?}..{:?})", self.min, self.max))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn include_and_contains() {
		let mut b = Aabb::inverted();
		b.include([1, 2, 3]);
		b.include([-4, 0, 5]);
		assert_eq!(b, Aabb::new([-4, 0, 3], [2, 3, 6]));
		assert!(b.contains([1, 2, 3]));
		assert!(!b.contains([2, 2, 3]));
	}

	#[test]
	fn intersection_empty() {
		let a = Aabb::new([0, 0, 0], [4, 4, 4]);
		let b = Aabb::new([4, 0, 0], [8, 4, 4]);
		assert!(a.intersection(&b).is_empty());
		assert!(!a.intersects(&b));
		let c = Aabb::new([3, 3, 3], [5, 5, 5]);
		assert_eq!(a.intersection(&c), Aabb::new([3, 3, 3], [4, 4, 4]));
	}

	#[test]
	fn normalized_collapses_to_zero() {
		assert_eq!(Aabb::inverted().normalized(), Aabb::ZERO);
		let b = Aabb::new([0, 0, 0], [1, 1, 1]);
		assert_eq!(b.normalized(), b);
	}
}
