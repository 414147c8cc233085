//! Umbrella crate: the sparse voxel engine and the VXL codec under one
//! roof.
//!
//! ```
//! use voxtile::{Volume, Voxel};
//!
//! let mut volume = Volume::new();
//! volume.set_voxel([0, 0, 0], Voxel::new(255, 0, 0, 255));
//! assert!(!volume.is_empty());
//! ```

pub use voxtile_core::*;
pub use voxtile_vxl as vxl;
