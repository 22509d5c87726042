//! Bounded voxel sets
//!
//! [`DenseVoxelSet`] is a fixed-size bit grid in local coordinates.
//! [`OriginVoxelSet`] pins one to a world-space origin and owns the
//! binary encoding every search hands back to its caller.

pub mod dense;
pub mod origin;

pub use dense::DenseVoxelSet;
pub use origin::OriginVoxelSet;

use glam::IVec3;
use thiserror::Error;

/// Largest extent of a voxel set along any axis
pub const MAX_DIMENSION: i32 = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoxelSetError {
    #[error("invalid voxel set size {size} (each axis must be 1..=256)")]
    InvalidDimensions { size: IVec3 },

    #[error("payload is {actual} bytes, expected {expected}")]
    PayloadLength { expected: usize, actual: usize },
}

/// Whether every axis of `size` lies in `1..=MAX_DIMENSION`
#[inline]
pub fn is_valid_size(size: IVec3) -> bool {
    size.cmpge(IVec3::ONE).all() && size.cmple(IVec3::splat(MAX_DIMENSION)).all()
}
