//! The decoder/encoder's in-memory map model.

use crate::chunk::{CHUNK_SIZE, Chunk, key_z, pos_key};
use crate::span::Span;
use anyhow::{Context, Result, ensure};
use byteorder::{ByteOrder, LittleEndian};

/// Color used for solid blocks that carry no color on the wire, e.g.
/// subterranean blocks not visible from any surface. `0x00RRGGBB`.
pub const DEFAULT_COLOR: u32 = 0x674028;

const FACE_NEIGHBORS: [[i32; 3]; 6] = [
	[0, 1, 0],
	[0, -1, 0],
	[1, 0, 0],
	[-1, 0, 0],
	[0, 0, 1],
	[0, 0, -1],
];

/// A decoded VXL map: a per-voxel solidity bitmap plus, per 16×16-column
/// chunk, the sorted colored surface blocks.
///
/// Coordinates run `x` east, `y` south, `z` down: `z == 0` is the world
/// top. Memory is proportional to the surface area, not the cube volume:
/// buried solid voxels occupy a single bit.
pub struct VxlMap {
	width: usize,
	height: usize,
	depth: usize,
	pub(crate) chunks: Vec<Chunk>,
	geometry: Vec<u64>,
}

impl VxlMap {
	/// Create an empty map: all air above a ground plane of default-colored
	/// blocks at `z == depth - 1`.
	pub fn new_empty(width: usize, height: usize, depth: usize) -> Result<VxlMap> {
		let mut map = VxlMap::with_dimensions(width, height, depth, false)?;
		for y in 0..height {
			for x in 0..width {
				map.set(x as i32, y as i32, depth as i32 - 1, DEFAULT_COLOR);
			}
		}
		Ok(map)
	}

	/// Decode a map from VXL wire data.
	///
	/// Malformed input (a span extending beyond the buffer, inconsistent
	/// length arithmetic) is an error; no partial map escapes.
	pub fn decode(width: usize, height: usize, depth: usize, data: &[u8]) -> Result<VxlMap> {
		let mut map = VxlMap::with_dimensions(width, height, depth, true)?;
		let mut offset = 0usize;
		for y in 0..height {
			for x in 0..width {
				offset = map
					.decode_column(x, y, data, offset)
					.with_context(|| format!("in column ({x}, {y})"))?;
			}
		}
		map.close_borders();
		Ok(map)
	}

	fn with_dimensions(width: usize, height: usize, depth: usize, solid: bool) -> Result<VxlMap> {
		ensure!(width > 0 && height > 0 && depth > 0, "map dimensions must be positive");
		ensure!(width <= 4096 && height <= 4096, "map side exceeds the 12-bit position key");
		ensure!(depth <= 256, "map depth exceeds the 8-bit position key");
		let chunk_count = Self::chunk_count(width) * Self::chunk_count(height);
		let words = (width * height * depth).div_ceil(64);
		Ok(VxlMap {
			width,
			height,
			depth,
			chunks: (0..chunk_count).map(|_| Chunk::new()).collect(),
			geometry: vec![if solid { u64::MAX } else { 0 }; words],
		})
	}

	fn chunk_count(side: usize) -> usize {
		side.div_ceil(CHUNK_SIZE)
	}

	pub fn width(&self) -> usize {
		self.width
	}

	pub fn height(&self) -> usize {
		self.height
	}

	pub fn depth(&self) -> usize {
		self.depth
	}

	pub(crate) fn chunk_index(&self, x: usize, y: usize) -> usize {
		debug_assert!(x < self.width && y < self.height);
		x / CHUNK_SIZE + y / CHUNK_SIZE * Self::chunk_count(self.width)
	}

	fn chunk_at(&mut self, x: usize, y: usize) -> &mut Chunk {
		let i = self.chunk_index(x, y);
		&mut self.chunks[i]
	}

	pub(crate) fn geometry_get(&self, x: usize, y: usize, z: usize) -> bool {
		debug_assert!(x < self.width && y < self.height && z < self.depth);
		let offset = z + (x + y * self.width) * self.depth;
		self.geometry[offset / 64] & (1 << (offset % 64)) != 0
	}

	fn geometry_set(&mut self, x: usize, y: usize, z: usize, solid: bool) {
		debug_assert!(x < self.width && y < self.height && z < self.depth);
		let offset = z + (x + y * self.width) * self.depth;
		let word = &mut self.geometry[offset / 64];
		let bit = 1u64 << (offset % 64);
		*word = if solid { *word | bit } else { *word & !bit };
	}

	/// Whether any solid voxel exists in this column at or below `from`.
	pub(crate) fn any_solid_below(&self, x: usize, y: usize, from: usize) -> bool {
		(from..self.depth).any(|z| self.geometry_get(x, y, z))
	}

	fn decode_column(&mut self, x: usize, y: usize, data: &[u8], mut offset: usize) -> Result<usize> {
		loop {
			let span = Span::read(&data[offset.min(data.len())..])?;
			ensure!(
				offset + span.wire_length() <= data.len(),
				"span at byte {offset} extends beyond the buffer"
			);
			ensure!(
				(span.color_end as usize) < self.depth,
				"span color run reaches below the map floor"
			);
			ensure!(
				span.air_start <= span.color_start,
				"span air run overlaps its color run"
			);
			let top_len = span.top_length();
			ensure!(
				span.length == 0 || span.length as usize >= 1 + top_len,
				"span length {} too small for its {top_len} top colors",
				span.length
			);
			let colors = &data[offset + Span::WIRE_SIZE..offset + span.wire_length()];

			for z in span.air_start as usize..span.color_start as usize {
				self.geometry_set(x, y, z, false);
			}
			let chunk = self.chunk_at(x, y);
			for z in span.color_start as usize..=span.color_end as usize {
				let word = LittleEndian::read_u32(&colors[(z - span.color_start as usize) * 4..]);
				chunk.push(pos_key(x, y, z), word);
			}

			if span.length == 0 {
				// Last span of the column: geometry below the surface run
				// stays solid (subterranean material, color implied).
				return Ok(offset + span.wire_length());
			}

			let bottom_len = span.length as usize - 1 - top_len;

			let next = Span::read(&data[(offset + span.wire_length()).min(data.len())..])
				.context("span links to a truncated successor")?;
			let next_air = next.air_start as usize;
			ensure!(
				next_air >= bottom_len && next_air <= self.depth,
				"bottom color run of {bottom_len} does not fit above z = {next_air}"
			);
			ensure!(
				bottom_len == 0 || next_air - bottom_len > span.color_end as usize,
				"bottom color run overlaps the top run"
			);
			let chunk = self.chunk_at(x, y);
			for z in next_air - bottom_len..next_air {
				let word =
					LittleEndian::read_u32(&colors[(z - (next_air - bottom_len) + top_len) * 4..]);
				chunk.push(pos_key(x, y, z), word);
			}
			offset += span.wire_length();
		}
	}

	/// Recover the wrapped-edge convention of the on-disk format: where a
	/// Z-slice is solid on one X (or Y) boundary of the map but not the
	/// opposite one, insert a default-colored block on the solid side.
	/// A format quirk, matched rather than fixed; it only affects the outermost
	/// X and Y slabs.
	fn close_borders(&mut self) {
		for z in 0..self.depth {
			for x in 0..self.width {
				let a = self.geometry_get(x, 0, z);
				let b = self.geometry_get(x, self.height - 1, z);
				if a != b {
					let y = if a { 0 } else { self.height - 1 };
					let key = pos_key(x, y, z);
					let chunk = self.chunk_at(x, y);
					if chunk.find(key).is_none() {
						chunk.insert(key, DEFAULT_COLOR);
					}
				}
			}
			for y in 0..self.height {
				let a = self.geometry_get(0, y, z);
				let b = self.geometry_get(self.width - 1, y, z);
				if a != b {
					let x = if a { 0 } else { self.width - 1 };
					let key = pos_key(x, y, z);
					let chunk = self.chunk_at(x, y);
					if chunk.find(key).is_none() {
						chunk.insert(key, DEFAULT_COLOR);
					}
				}
			}
		}
	}

	pub fn is_inside(&self, x: i32, y: i32, z: i32) -> bool {
		x >= 0
			&& y >= 0 && z >= 0
			&& x < self.width as i32
			&& y < self.height as i32
			&& z < self.depth as i32
	}

	/// Whether the block at (x, y, z) is solid. Positions above the world
	/// are air, positions below it solid; x and y wrap around the map.
	pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
		if z < 0 {
			return false;
		}
		if z >= self.depth as i32 {
			return true;
		}
		let x = x.rem_euclid(self.width as i32) as usize;
		let y = y.rem_euclid(self.height as i32) as usize;
		self.geometry_get(x, y, z as usize)
	}

	/// Whether the block at (x, y, z) is exposed to air on any face.
	pub fn on_surface(&self, x: i32, y: i32, z: i32) -> bool {
		FACE_NEIGHBORS
			.iter()
			.any(|d| !self.is_solid(x + d[0], y + d[1], z + d[2]))
	}

	/// Color of the block at (x, y, z) in `0x00RRGGBB`, 0 for air or
	/// out-of-bounds positions. Buried blocks read as [`DEFAULT_COLOR`].
	pub fn get(&self, x: i32, y: i32, z: i32) -> u32 {
		if !self.is_inside(x, y, z) {
			return 0;
		}
		if !self.geometry_get(x as usize, y as usize, z as usize) {
			return 0;
		}
		let chunk = &self.chunks[self.chunk_index(x as usize, y as usize)];
		chunk
			.find(pos_key(x as usize, y as usize, z as usize))
			.map_or(DEFAULT_COLOR, |b| b.color)
	}

	/// Color and height of the topmost block of column (x, y), as seen
	/// from above. `None` outside the map.
	pub fn get_top(&self, x: i32, y: i32) -> Option<(u32, usize)> {
		if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
			return None;
		}
		let chunk = &self.chunks[self.chunk_index(x as usize, y as usize)];
		let column = pos_key(x as usize, y as usize, 0);
		let block = chunk.blocks().get(chunk.lower_bound(column))?;
		if block.position & 0xFF_FF_FF_00 != column {
			return None;
		}
		Some((block.color, key_z(block.position)))
	}

	fn set_internal(&mut self, x: i32, y: i32, z: i32, color: u32) {
		if z < 0 || z >= self.depth as i32 {
			return;
		}
		let x = x.rem_euclid(self.width as i32) as usize;
		let y = y.rem_euclid(self.height as i32) as usize;
		let z = z as usize;
		// Buried blocks carry no color.
		if self.geometry_get(x, y, z) && !self.on_surface(x as i32, y as i32, z as i32) {
			return;
		}
		self.chunk_at(x, y).insert(pos_key(x, y, z), color);
	}

	fn set_air_internal(&mut self, x: i32, y: i32, z: i32) {
		if z < 0 || z >= self.depth as i32 {
			return;
		}
		let x = x.rem_euclid(self.width as i32) as usize;
		let y = y.rem_euclid(self.height as i32) as usize;
		let z = z as usize;
		if !self.geometry_get(x, y, z) {
			return;
		}
		self.chunk_at(x, y).remove(pos_key(x, y, z));
	}

	/// Place a solid block of `color` (`0x00RRGGBB`) at (x, y, z).
	///
	/// Neighbors that stop being surface blocks lose their stored color.
	/// No-op outside the map.
	pub fn set(&mut self, x: i32, y: i32, z: i32, color: u32) {
		if !self.is_inside(x, y, z) {
			return;
		}
		self.geometry_set(x as usize, y as usize, z as usize, true);
		self.set_internal(x, y, z, color);
		for d in FACE_NEIGHBORS {
			let (nx, ny, nz) = (x + d[0], y + d[1], z + d[2]);
			if !self.on_surface(nx, ny, nz) {
				self.set_air_internal(nx, ny, nz);
			}
		}
	}

	/// Turn (x, y, z) into air, destroying any block there.
	///
	/// Neighbors that become surface blocks gain the default color. The
	/// bottom layer (`z == depth - 1`) cannot be removed; no-op outside
	/// the map.
	pub fn set_air(&mut self, x: i32, y: i32, z: i32) {
		if x < 0
			|| y < 0 || z < 0
			|| x >= self.width as i32
			|| y >= self.height as i32
			|| z >= self.depth as i32 - 1
		{
			return;
		}

		let surface_before: Vec<bool> = FACE_NEIGHBORS
			.iter()
			.map(|d| {
				let (nx, ny, nz) = (x + d[0], y + d[1], z + d[2]);
				if self.is_solid(nx, ny, nz) {
					self.on_surface(nx, ny, nz)
				} else {
					true
				}
			})
			.collect();

		self.set_air_internal(x, y, z);
		self.geometry_set(x as usize, y as usize, z as usize, false);

		for (d, was_surface) in FACE_NEIGHBORS.iter().zip(surface_before) {
			let (nx, ny, nz) = (x + d[0], y + d[1], z + d[2]);
			if !was_surface && self.on_surface(nx, ny, nz) {
				self.set_internal(nx, ny, nz, DEFAULT_COLOR);
			}
		}
	}
}

/// Infer the geometry of unknown VXL data: the maximum span depth rounded
/// up to a power of two, and the square root of the column count (maps are
/// assumed square).
pub fn guess_size(data: &[u8]) -> Result<(usize, usize)> {
	ensure!(!data.is_empty(), "no data");
	let mut offset = 0usize;
	let mut columns = 0usize;
	let mut depth = 0usize;
	while offset + Span::WIRE_SIZE <= data.len() {
		let span = Span::read(&data[offset..])?;
		depth = depth.max(span.color_end as usize + 1);
		if span.length == 0 {
			columns += 1;
		}
		offset += span.wire_length();
	}
	ensure!(columns > 0, "no columns found");
	let size = (columns as f64).sqrt() as usize;
	Ok((size, depth.next_power_of_two()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_map_has_a_default_ground_plane() {
		let map = VxlMap::new_empty(16, 16, 32).unwrap();
		assert!(map.is_solid(3, 5, 31));
		assert!(!map.is_solid(3, 5, 30));
		assert_eq!(map.get(3, 5, 31), DEFAULT_COLOR);
		assert_eq!(map.get_top(3, 5), Some((DEFAULT_COLOR, 31)));
	}

	#[test]
	fn out_of_bounds_rules() {
		let map = VxlMap::new_empty(8, 8, 16).unwrap();
		assert!(!map.is_solid(0, 0, -1)); // above the world: air
		assert!(map.is_solid(0, 0, 16)); // below the world: solid
		assert!(map.is_solid(-1, 0, 15)); // x wraps
		assert!(!map.is_inside(-1, 0, 0));
		assert_eq!(map.get(99, 0, 0), 0);
	}

	#[test]
	fn set_and_get_round_trip() {
		let mut map = VxlMap::new_empty(8, 8, 16).unwrap();
		map.set(2, 3, 7, 0x112233);
		assert!(map.is_solid(2, 3, 7));
		assert!(map.on_surface(2, 3, 7));
		assert_eq!(map.get(2, 3, 7), 0x112233);
		assert_eq!(map.get_top(2, 3), Some((0x112233, 7)));
	}

	#[test]
	fn burying_a_block_discards_its_color() {
		let mut map = VxlMap::new_empty(8, 8, 16).unwrap();
		map.set(4, 4, 8, 0x111111);
		// Enclose it on all six sides.
		for d in FACE_NEIGHBORS {
			map.set(4 + d[0], 4 + d[1], 8 + d[2], 0x222222);
		}
		assert!(map.is_solid(4, 4, 8));
		assert!(!map.on_surface(4, 4, 8));
		// The color array no longer stores it; reads fall back.
		assert_eq!(map.get(4, 4, 8), DEFAULT_COLOR);
	}

	#[test]
	fn set_air_recolors_newly_exposed_neighbors() {
		let mut map = VxlMap::new_empty(8, 8, 16).unwrap();
		map.set(4, 4, 8, 0x111111);
		for d in FACE_NEIGHBORS {
			map.set(4 + d[0], 4 + d[1], 8 + d[2], 0x222222);
		}
		map.set_air(4, 4, 7); // expose the buried block from above
		assert!(!map.is_solid(4, 4, 7));
		assert!(map.on_surface(4, 4, 8));
		assert_eq!(map.get(4, 4, 8), DEFAULT_COLOR);
	}

	#[test]
	fn bottom_layer_cannot_become_air() {
		let mut map = VxlMap::new_empty(8, 8, 16).unwrap();
		map.set_air(0, 0, 15);
		assert!(map.is_solid(0, 0, 15));
	}

	#[test]
	fn decode_rejects_truncated_data() {
		assert!(VxlMap::decode(2, 2, 16, &[0, 0, 3, 0]).is_err());
		let column = [0u8, 0, 0, 0, 0xAA, 0xBB, 0xCC, 0x7F];
		// Only one column of the four present.
		assert!(VxlMap::decode(2, 2, 16, &column).is_err());
	}

	#[test]
	fn decode_rejects_inconsistent_length_arithmetic() {
		// length = 1 cannot hold one top color.
		let data = [1u8, 0, 0, 0, 0xAA, 0xBB, 0xCC, 0x7F];
		assert!(VxlMap::decode(1, 1, 16, &data).is_err());
	}

	#[test]
	fn guess_size_rounds_depth_and_squares_columns() {
		let mut data = Vec::new();
		for _ in 0..16 {
			Span {
				length: 0,
				color_start: 0,
				color_end: 5,
				air_start: 0,
			}
			.write(&mut data);
			for _ in 0..6 {
				data.extend_from_slice(&0x7F00_0000u32.to_le_bytes());
			}
		}
		let (size, depth) = guess_size(&data).unwrap();
		assert_eq!(size, 4);
		assert_eq!(depth, 8);
	}
}
