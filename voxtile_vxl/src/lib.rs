//! The Ace-of-Spades VXL column-span codec.
//!
//! VXL stores a cubic voxel map as per-column records in raster order
//! (y outer, x inner). Each column is a run of [`Span`]s describing the
//! visible surface runs and their inline colors; solid material below a
//! column's last surface run is implicit (subterranean, default-colored).
//! There is no header or footer outside the column stream.
//!
//! [`VxlMap`] is the decoder/encoder's in-memory model: a solidity bitmap
//! plus per-column-chunk arrays of colored surface blocks. It decodes from
//! and encodes to the wire format bit-exactly, including the wrapped-edge
//! border convention, and streams its encoding in fixed-size chunks through
//! [`VxlStream`]. The [`bridge`] module converts between maps and
//! [`voxtile_core::Volume`]s with the axis conventions of the editor.

mod bridge;
mod chunk;
mod map;
mod span;
mod stream;

pub use bridge::{export_volume, import_volume, import_volume_with};
pub use map::{DEFAULT_COLOR, VxlMap, guess_size};
pub use span::Span;
pub use stream::VxlStream;
