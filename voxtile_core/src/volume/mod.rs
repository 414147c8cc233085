//! The sparse tiled voxel store and its access protocol.

mod accessor;
mod bbox;
mod iter;
mod read;
mod store;

pub use accessor::Accessor;
pub use iter::{BoxVoxels, TilePositions, Voxels};
pub use store::Volume;
