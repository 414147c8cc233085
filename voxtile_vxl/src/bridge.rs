//! Conversion between [`Volume`]s and VXL maps.
//!
//! Imported maps are centered about the volume origin, with the VXL X axis
//! mirrored and VXL Z (down) mapped to volume Z (up); exporting applies the
//! inverse mapping relative to the volume's exact bounding box. A volume
//! whose bounding box is `[-s/2, s/2)² × [-d/2, d/2)` round-trips onto
//! itself.

use crate::map::{VxlMap, guess_size};
use anyhow::{Context, Result, ensure};
use voxtile_core::cancel::CancelToken;
use voxtile_core::progress::{Progress, get_progress};
use voxtile_core::types::Voxel;
use voxtile_core::volume::{Accessor, Volume};

fn color_to_voxel(c: u32) -> Voxel {
	Voxel::new((c >> 16) as u8, (c >> 8) as u8, c as u8, 255)
}

fn voxel_to_color(v: Voxel) -> u32 {
	(u32::from(v.r) << 16) | (u32::from(v.g) << 8) | u32::from(v.b)
}

/// Import VXL wire data as a volume, inferring the map geometry.
pub fn import_volume(data: &[u8]) -> Result<Volume> {
	import_volume_with(data, None)
}

/// Import VXL wire data, polling `cancel` once per column. A cancelled
/// import returns the partial volume built so far.
pub fn import_volume_with(data: &[u8], cancel: Option<&CancelToken>) -> Result<Volume> {
	let (size, depth) = guess_size(data).context("could not infer the map geometry")?;
	let map = VxlMap::decode(size, size, depth, data)
		.with_context(|| format!("decoding a {size}x{size}x{depth} map"))?;

	let mut volume = Volume::new();
	let mut acc = Accessor::new();
	let mut progress = get_progress("vxl import", (size * size) as u64);
	let half = size as i32 / 2;
	let half_d = depth as i32 / 2;
	for x in 0..size as i32 {
		for y in 0..size as i32 {
			if cancel.is_some_and(CancelToken::is_cancelled) {
				log::info!("vxl import cancelled at column ({x}, {y})");
				return Ok(volume);
			}
			for z in 0..depth as i32 {
				if map.is_solid(x, y, z) {
					let pos = [half - 1 - x, y - half, half_d - 1 - z];
					volume.set_at(&mut acc, pos, color_to_voxel(map.get(x, y, z)));
				}
			}
			progress.inc(1);
		}
	}
	progress.finish();
	log::info!("imported a {size}x{size}x{depth} vxl map, {} tiles", volume.tile_count());
	Ok(volume)
}

/// Export a volume to VXL wire data.
///
/// The map spans the volume's exact bounding box; every column of the map
/// gets at least the format's ground plane at its deepest layer. Fails on
/// an empty volume or a bounding box exceeding the format's limits
/// (4096×4096×256).
pub fn export_volume(volume: &Volume) -> Result<Vec<u8>> {
	let bbox = volume.bbox(true);
	ensure!(!bbox.is_empty(), "cannot export an empty volume");
	let w = (bbox.max[0] - bbox.min[0]) as usize;
	let h = (bbox.max[1] - bbox.min[1]) as usize;
	let d = (bbox.max[2] - bbox.min[2]) as usize;
	let mut map = VxlMap::new_empty(w, h, d)
		.with_context(|| format!("creating a {w}x{h}x{d} map"))?;

	let mut acc = Accessor::new();
	for pos in volume.voxels(true) {
		let v = volume.get_at(&mut acc, pos);
		if v.a > 0 {
			map.set(
				bbox.max[0] - 1 - pos[0],
				pos[1] - bbox.min[1],
				bbox.max[2] - 1 - pos[2],
				voxel_to_color(v),
			);
		}
	}

	// Total output size is unknown up front; report bytes as they come.
	let mut progress = get_progress("vxl export", 0);
	let mut out = Vec::new();
	let mut stream = map.stream(4096);
	let mut buf = vec![0u8; 4096];
	loop {
		let n = stream.read(&mut buf)?;
		if n == 0 {
			break;
		}
		out.extend_from_slice(&buf[..n]);
		progress.inc(n as u64);
	}
	progress.finish();
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn export_of_empty_volume_fails() {
		assert!(export_volume(&Volume::new()).is_err());
	}

	#[test]
	fn single_voxel_exports_and_reimports() {
		let mut v = Volume::new();
		v.set_voxel([0, 0, 0], Voxel::new(10, 20, 30, 255));
		let data = export_volume(&v).unwrap();
		// One 1x1x1 map column, one span, one color word.
		assert_eq!(data.len(), 8);
		let back = import_volume(&data).unwrap();
		// A 1x1x1 map imports centered at (-1, 0, -1)... with size 1 the
		// centering offsets collapse to (-1, -1, -1) relative flips.
		assert_eq!(back.bbox(true).max[0] - back.bbox(true).min[0], 1);
		let pos = back.voxels(true).find(|p| back.voxel_at(*p).a != 0).unwrap();
		assert_eq!(back.voxel_at(pos), Voxel::new(10, 20, 30, 255));
	}

	#[test]
	fn cancelled_import_returns_cleanly() {
		let mut v = Volume::new();
		for x in -2..2 {
			for y in -2..2 {
				v.set_voxel([x, y, 0], Voxel::new(1, 1, 1, 255));
			}
		}
		let data = export_volume(&v).unwrap();
		let cancel = CancelToken::new();
		cancel.cancel();
		let partial = import_volume_with(&data, Some(&cancel)).unwrap();
		assert!(partial.is_empty());
	}

	#[test]
	fn centered_surface_slab_round_trips_exactly() {
		// A one-voxel-thick 4×4 slab whose bbox is [-2, 2)² × [-1, 0):
		// every voxel is a surface voxel, so geometry and colors survive.
		let mut v = Volume::new();
		for x in -2..2 {
			for y in -2..2 {
				let shade = (70 + 10 * (x + 2) + 40 * (y + 2)) as u8;
				v.set_voxel([x, y, -1], Voxel::new(shade, 0xBB, 0xCC, 255));
			}
		}
		let data = export_volume(&v).unwrap();
		let back = import_volume(&data).unwrap();
		assert_eq!(back.bbox(true), v.bbox(true));
		for x in -2..2 {
			for y in -2..2 {
				assert_eq!(back.voxel_at([x, y, -1]), v.voxel_at([x, y, -1]), "at {x} {y}");
			}
		}
	}
}
