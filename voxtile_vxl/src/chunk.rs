//! Column chunks: sorted arrays of colored surface blocks.

/// Edge length of a chunk, in columns. The map is split into square chunks
/// so single-block edits touch a small sorted array.
pub(crate) const CHUNK_SIZE: usize = 16;

/// Factor by which a chunk's block array grows when full.
const CHUNK_GROWTH: usize = 2;

/// A chunk shrinks once fewer than 1/CHUNK_SHRINK of it is used.
const CHUNK_SHRINK: usize = 4;

/// A colored surface voxel. The position packs `(y << 20) | (x << 8) | z`,
/// so blocks sort by column (y, then x), then by depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Block {
	pub position: u32,
	pub color: u32,
}

pub(crate) fn pos_key(x: usize, y: usize, z: usize) -> u32 {
	((y as u32) << 20) | ((x as u32) << 8) | z as u32
}

pub(crate) fn key_discard_z(key: u32) -> u32 {
	key & 0xFF_FF_FF_00
}

pub(crate) fn key_z(key: u32) -> usize {
	(key & 0xFF) as usize
}

/// The sorted block array of one 16×16-column region.
///
/// Capacity management is explicit so decoded chunk memory stays
/// proportional to surface area: the array doubles when full and halves
/// once three quarters of it are unused. A fresh chunk has room for two
/// fully filled layers.
pub(crate) struct Chunk {
	blocks: Vec<Block>,
}

impl Chunk {
	pub fn new() -> Chunk {
		Chunk {
			blocks: Vec::with_capacity(CHUNK_SIZE * CHUNK_SIZE * 2),
		}
	}

	pub fn blocks(&self) -> &[Block] {
		&self.blocks
	}

	pub fn len(&self) -> usize {
		self.blocks.len()
	}

	fn grow_if_full(&mut self) {
		if self.blocks.len() == self.blocks.capacity() {
			self.blocks.reserve_exact(self.blocks.capacity() * (CHUNK_GROWTH - 1));
		}
	}

	/// Append a block; positions must arrive in strictly increasing order
	/// (the decoder's natural emission order).
	pub fn push(&mut self, position: u32, color: u32) {
		debug_assert!(self.blocks.last().is_none_or(|b| b.position < position));
		self.grow_if_full();
		self.blocks.push(Block { position, color });
	}

	/// Index of the first block with a position >= `position`.
	pub fn lower_bound(&self, position: u32) -> usize {
		self.blocks.partition_point(|b| b.position < position)
	}

	pub fn find(&self, position: u32) -> Option<&Block> {
		self
			.blocks
			.binary_search_by_key(&position, |b| b.position)
			.ok()
			.map(|i| &self.blocks[i])
	}

	/// Insert a block in sorted position, replacing the color if present.
	pub fn insert(&mut self, position: u32, color: u32) {
		match self.blocks.binary_search_by_key(&position, |b| b.position) {
			Ok(i) => self.blocks[i].color = color,
			Err(i) => {
				self.grow_if_full();
				self.blocks.insert(i, Block { position, color });
			}
		}
	}

	/// Remove the block at `position`, if any, shrinking the array when
	/// mostly unused.
	pub fn remove(&mut self, position: u32) {
		if let Ok(i) = self.blocks.binary_search_by_key(&position, |b| b.position) {
			self.blocks.remove(i);
			if self.blocks.len() * CHUNK_SHRINK <= self.blocks.capacity() {
				self.blocks.shrink_to(self.blocks.capacity() / CHUNK_GROWTH);
			}
		}
	}
}
