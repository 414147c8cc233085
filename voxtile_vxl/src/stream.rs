//! Column encoding and the chunked streaming writer.

use crate::chunk::{Chunk, key_discard_z, key_z, pos_key};
use crate::map::VxlMap;
use crate::span::Span;
use anyhow::{Context, Result, ensure};
use byteorder::{ByteOrder, LittleEndian};

const WIRE_ALPHA: u32 = 0x7F << 24;

/// End (exclusive) of the run of consecutive surface blocks of column
/// (x, y) starting at `start_z`, or `start_z` itself if no block is there.
/// Does not consume anything; `index` is the first candidate block.
fn run_end(chunk: &Chunk, index: usize, x: usize, y: usize, start_z: usize) -> usize {
	let blocks = chunk.blocks();
	let mut z = start_z;
	let mut i = index;
	while i < blocks.len() && blocks[i].position == pos_key(x, y, z) {
		z += 1;
		i += 1;
	}
	z
}

/// Whether the block at `index` still belongs to column (x, y).
fn in_column(chunk: &Chunk, index: usize, x: usize, y: usize) -> bool {
	chunk
		.blocks()
		.get(index)
		.is_some_and(|b| key_discard_z(b.position) == pos_key(x, y, 0))
}

/// Encode one column into `out`, advancing this chunk's block cursor in
/// `offsets`.
///
/// Walks the sorted surface blocks and the solidity bitmap to find the
/// column's alternating surface/air runs: one span per surface run, with
/// the current run's bottom colors appended whenever another surface run
/// follows below (`length = 1 + top + bottom`), and `length = 0` on the
/// last span of the column.
pub(crate) fn encode_column(
	map: &VxlMap,
	offsets: &mut [usize],
	x: usize,
	y: usize,
	out: &mut Vec<u8>,
) -> Result<()> {
	let ci = map.chunk_index(x, y);
	let chunk = &map.chunks[ci];
	let depth = map.depth();

	ensure!(
		in_column(chunk, offsets[ci], x, y),
		"column ({x}, {y}) has no surface voxels"
	);

	let mut first = true;
	let mut z = key_z(chunk.blocks()[offsets[ci]].position);
	loop {
		let top_start = if map.geometry_get(x, y, z) {
			z
		} else {
			ensure!(in_column(chunk, offsets[ci], x, y), "column ({x}, {y}) ends in mid-air");
			key_z(chunk.blocks()[offsets[ci]].position)
		};
		let top_end = run_end(chunk, offsets[ci], x, y, top_start);

		// Where the bottom surface of the current solid layer starts:
		// directly below the top run when air follows it, at the next
		// surface block when the layer continues buried, or nowhere.
		let bottom_start = if top_end == depth || !map.geometry_get(x, y, top_end) {
			top_end
		} else if in_column(chunk, offsets[ci] + (top_end - top_start), x, y) {
			key_z(chunk.blocks()[offsets[ci] + (top_end - top_start)].position)
		} else {
			depth
		};

		let header_at = out.len();
		Span {
			length: 0, // patched below
			color_start: top_start as u8,
			color_end: (top_end - 1) as u8,
			air_start: if first { 0 } else { z as u8 },
		}
		.write(out);
		first = false;

		for _ in top_start..top_end {
			push_color(out, chunk.blocks()[offsets[ci]].color);
			offsets[ci] += 1;
		}

		if bottom_start >= depth {
			// Solid (or colored) to the very bottom: the column ends here.
			break;
		}
		if bottom_start == top_end && !map.any_solid_below(x, y, top_end) {
			// Nothing but air below this run: no further span follows.
			break;
		}

		let bottom_end = run_end(chunk, offsets[ci], x, y, bottom_start);
		if bottom_end < depth {
			let words = 1 + (top_end - top_start) + (bottom_end - bottom_start);
			debug_assert!(words <= 255, "span length overflows its byte");
			out[header_at] = words as u8;
			for _ in bottom_start..bottom_end {
				push_color(out, chunk.blocks()[offsets[ci]].color);
				offsets[ci] += 1;
			}
			z = bottom_end;
		} else {
			// The bottom run reaches the floor; its colors are emitted as
			// the next span's top run instead.
			out[header_at] = (1 + (top_end - top_start)) as u8;
			z = bottom_start;
		}
	}
	Ok(())
}

fn push_color(out: &mut Vec<u8>, color: u32) {
	let mut word = [0u8; 4];
	LittleEndian::write_u32(&mut word, (color & 0xFF_FF_FF) | WIRE_ALPHA);
	out.extend_from_slice(&word);
}

impl VxlMap {
	/// Encode the whole map to VXL wire data.
	///
	/// Fails if any column holds no solid voxel at all; the format cannot
	/// express an all-air column.
	pub fn encode(&self) -> Result<Vec<u8>> {
		let mut offsets = vec![0usize; self.chunks.len()];
		let mut out = Vec::new();
		for y in 0..self.height() {
			for x in 0..self.width() {
				encode_column(self, &mut offsets, x, y, &mut out)
					.with_context(|| format!("encoding column ({x}, {y})"))?;
			}
		}
		Ok(out)
	}

	/// Start streaming this map's encoding in chunks of at most
	/// `chunk_size` bytes.
	///
	/// The stream borrows the map shared, so the map cannot be mutated
	/// while a stream is open.
	pub fn stream(&self, chunk_size: usize) -> VxlStream<'_> {
		VxlStream {
			map: self,
			offsets: vec![0usize; self.chunks.len()],
			chunk_size,
			buffer: Vec::with_capacity(chunk_size * 2),
			x: 0,
			y: 0,
		}
	}
}

/// Incremental encoder: emits the map's columns in raster order, handing
/// out at most `chunk_size` bytes per [`VxlStream::read`] call.
pub struct VxlStream<'a> {
	map: &'a VxlMap,
	offsets: Vec<usize>,
	chunk_size: usize,
	buffer: Vec<u8>,
	x: usize,
	y: usize,
}

impl VxlStream<'_> {
	/// Fill `out` with up to `chunk_size` encoded bytes; returns the byte
	/// count, 0 at the end of the map.
	pub fn read(&mut self, out: &mut [u8]) -> Result<usize> {
		ensure!(out.len() >= self.chunk_size, "output buffer smaller than the chunk size");
		if self.y >= self.map.height() && self.buffer.is_empty() {
			return Ok(0);
		}
		while self.buffer.len() < self.chunk_size && self.y < self.map.height() {
			encode_column(self.map, &mut self.offsets, self.x, self.y, &mut self.buffer)?;
			self.x += 1;
			if self.x == self.map.width() {
				self.x = 0;
				self.y += 1;
			}
		}
		let n = self.buffer.len().min(self.chunk_size);
		out[..n].copy_from_slice(&self.buffer[..n]);
		self.buffer.drain(..n);
		Ok(n)
	}
}
