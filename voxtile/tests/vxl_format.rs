//! Wire-format scenarios for the VXL codec and its volume bridge.

use voxtile::vxl::{Span, VxlMap, export_volume, guess_size, import_volume};
use voxtile::{Volume, Voxel};

fn init_logging() {
	let _ = env_logger::builder().is_test(true).try_init();
}

/// A 16×16 map of depth 64, solid in z = 0..=3 colored (10, 20, 30),
/// encodes each column as one span `air_start=0, color_start=0,
/// color_end=3, length=0` followed by four words `0x7F0A141E`, the
/// subterranean part being implied rather than painted.
#[test]
fn column_encoding_is_bit_exact() {
	let mut wire = Vec::new();
	for _ in 0..16 * 16 {
		Span {
			length: 0,
			color_start: 0,
			color_end: 3,
			air_start: 0,
		}
		.write(&mut wire);
		for _ in 0..4 {
			wire.extend_from_slice(&0x7F0A141Eu32.to_le_bytes());
		}
	}

	let map = VxlMap::decode(16, 16, 64, &wire).unwrap();
	for x in 0..16 {
		for y in 0..16 {
			for z in 0..4 {
				assert!(map.is_solid(x, y, z));
				assert_eq!(map.get(x, y, z) & 0xFF_FF_FF, 0x0A141E);
			}
		}
	}

	// Re-encoding reproduces the input byte for byte.
	assert_eq!(map.encode().unwrap(), wire);
}

#[test]
fn geometry_inference_from_raw_data() {
	let mut map = VxlMap::new_empty(32, 32, 64).unwrap();
	for x in 0..32 {
		for y in 0..32 {
			map.set(x, y, 5, 0x123456);
		}
	}
	let data = map.encode().unwrap();
	let (size, depth) = guess_size(&data).unwrap();
	assert_eq!(size, 32);
	assert_eq!(depth, 64);
}

#[test]
fn decode_of_garbage_fails_without_panicking() {
	for data in [&[0xFFu8; 3][..], &[0xFF; 64][..], &[0x01, 0x00, 0x00, 0x00][..]] {
		assert!(VxlMap::decode(4, 4, 16, data).is_err());
	}
}

#[test]
fn bridge_round_trip_on_a_centered_volume() {
	// Width = height = 8 (square), depth = 2 (a power of two), all voxels
	// within the centered bounds and at least one voxel per column. The
	// bottom layer is a checkerboard, so every bottom voxel is exposed
	// and keeps its color on the wire.
	init_logging();
	let mut v = Volume::new();
	for x in -4..4 {
		for y in -4..4 {
			let r = (10 + (x + 4) * 10) as u8;
			let g = (10 + (y + 4) * 10) as u8;
			v.set_voxel([x, y, 0], Voxel::new(r, g, 200, 255));
			if (x + y).rem_euclid(2) == 0 {
				v.set_voxel([x, y, -1], Voxel::new(r, g, 7, 255));
			}
		}
	}
	let data = export_volume(&v).unwrap();
	let back = import_volume(&data).unwrap();
	assert_eq!(back.bbox(true), v.bbox(true));
	for x in -4..4 {
		for y in -4..4 {
			assert_eq!(back.voxel_at([x, y, 0]), v.voxel_at([x, y, 0]), "top at {x} {y}");
			if (x + y).rem_euclid(2) == 0 {
				assert_eq!(back.voxel_at([x, y, -1]), v.voxel_at([x, y, -1]), "bottom at {x} {y}");
			} else {
				// The format has no air below a column's last surface
				// run: the checkerboard holes come back as subterranean
				// default-colored material.
				assert_eq!(back.voxel_at([x, y, -1]), Voxel::new(0x67, 0x40, 0x28, 255));
			}
		}
	}
}

#[test]
fn buried_voxels_come_back_default_colored() {
	// The bottom layer is full except one hole, so its voxels are buried
	// (the map wraps laterally) and their colors cannot be represented on
	// the wire; only the hole's neighbors stay on the surface.
	let mut v = Volume::new();
	for x in -2..2 {
		for y in -2..2 {
			v.set_voxel([x, y, 0], Voxel::new(4, 5, 6, 255));
			if (x, y) != (1, 1) {
				v.set_voxel([x, y, -1], Voxel::new(1, 2, 3, 255));
			}
		}
	}
	let data = export_volume(&v).unwrap();
	let back = import_volume(&data).unwrap();
	assert_eq!(back.voxel_at([-2, -2, 0]), Voxel::new(4, 5, 6, 255));
	// Far from the hole: buried, color lost to the default.
	assert_eq!(back.voxel_at([-2, -2, -1]), Voxel::new(0x67, 0x40, 0x28, 255));
	// Next to the hole: still a surface block, color preserved.
	assert_eq!(back.voxel_at([1, 0, -1]), Voxel::new(1, 2, 3, 255));
	// The hole itself is below the last surface run: solid default.
	assert_eq!(back.voxel_at([1, 1, -1]), Voxel::new(0x67, 0x40, 0x28, 255));
}

#[test]
fn streamed_and_whole_encodings_agree() {
	let mut map = VxlMap::new_empty(16, 16, 32).unwrap();
	for x in 0..16 {
		for y in 0..16 {
			for z in 10..14 {
				map.set(x, y, z, 0x010203 * (z as u32));
			}
		}
	}
	let whole = map.encode().unwrap();
	let mut stream = map.stream(128);
	let mut collected = Vec::new();
	let mut buf = [0u8; 128];
	loop {
		let n = stream.read(&mut buf).unwrap();
		if n == 0 {
			break;
		}
		collected.extend_from_slice(&buf[..n]);
	}
	assert_eq!(collected, whole);
}
