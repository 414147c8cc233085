//! Fundamental value types: voxels, tile geometry and integer bounding boxes.

mod aabb;
mod tile;
mod voxel;

pub use aabb::*;
pub use tile::*;
pub use voxel::*;
