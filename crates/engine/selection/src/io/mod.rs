//! Binary selection format
//!
//! Every value on the wire is a sequence of big-endian 4-byte signed
//! integers, single-byte booleans and single-byte type tags:
//!
//! ```text
//! OriginVoxelSet
//!   origin.x origin.y origin.z   i32 x3
//!   xSize ySize zSize            i32 x3, each in 1..=256
//!   payload                      ceil(xSize*ySize*zSize / 8) bytes, LSB first
//!
//! FillMatcher
//!   typeId                       u8
//!   variant payload              OnlySpecified: id i32, variant i32
//!                                ContourFollower: normal face index i32
//!
//! FillSettings
//!   propagation                  i32 (0 = flood fill, 1 = contour)
//!   diagonal                     bool
//!   automaticLowerBound          bool
//!   start.x start.y start.z      i32 x3
//!   normal face index            i32
//!   matcher                      FillMatcher
//! ```
//!
//! Decoders never panic. They return a [`CodecError`] on truncated input,
//! unknown tags or out-of-range values.

pub mod reader;
pub mod writer;

pub use reader::ByteReader;
pub use writer::ByteWriter;

use thiserror::Error;

/// Failure decoding a selection buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("truncated data: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("invalid voxel set dimensions {x}x{y}x{z} (each axis must be 1..=256)")]
    InvalidDimensions { x: i32, y: i32, z: i32 },

    #[error("unknown matcher type id {type_id}")]
    UnknownMatcher { type_id: u8 },

    #[error("unknown propagation mode {value}")]
    UnknownPropagation { value: i32 },

    #[error("unknown face index {value}")]
    UnknownFacing { value: i32 },

    #[error("invalid boolean byte {value:#04x}")]
    InvalidBool { value: u8 },

    #[error("{count} trailing bytes after value")]
    TrailingBytes { count: usize },
}
