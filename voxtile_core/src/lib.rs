//! Sparse tiled voxel storage.
//!
//! A [`Volume`] maps integer coordinates to RGBA voxels while keeping memory
//! proportional to the occupied surface: voxels live in fixed-size cubic
//! tiles ([`TILE_SIZE`]³) held in a hash map keyed by tile origin. Tile
//! payloads are shared copy-on-write, so copying a volume is O(1) and bulk
//! operations on similar volumes can be memoized by version key.
//!
//! On top of the store sit:
//! - accessors and iterators that amortize tile lookups across streams of
//!   neighboring accesses ([`Accessor`], [`Volume::voxels`],
//!   [`Volume::box_voxels`]),
//! - the painter engine that renders geometric shapes into a volume with a
//!   closed set of blend modes ([`Painter`], [`Volume::apply`],
//!   [`Volume::merge`]),
//! - per-tile quad extraction for rendering ([`vertex::generate_vertices`]).

pub mod cancel;
pub mod math;
pub mod paint;
pub mod progress;
pub mod types;
pub mod vertex;
pub mod volume;

pub use paint::{Axis, BlendMode, Painter, Shape};
pub use types::{Aabb, TILE_SIZE, TilePos, Voxel};
pub use volume::{Accessor, Volume};
