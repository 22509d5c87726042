use super::{is_valid_size, VoxelSetError};
use crate::bounds::VoxelBox;
use glam::IVec3;

/// Fixed-size 3D bit grid addressed by local coordinates
///
/// Cells are stored one bit each at linear index `x + xs * (y + ys * z)`,
/// least significant bit first within each byte. Every accessor clamps its
/// coordinate to the nearest cell, so probing one cell past an edge reads
/// (or writes) the edge cell instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseVoxelSet {
    size: IVec3,
    bits: Vec<u8>,
}

/// Bytes needed to hold one bit per cell of `size`
#[inline]
pub fn payload_len(size: IVec3) -> usize {
    let cells = size.x as usize * size.y as usize * size.z as usize;
    cells.div_ceil(8)
}

impl DenseVoxelSet {
    /// Create an empty set; each axis must be in `1..=256`
    pub fn new(size: IVec3) -> Result<Self, VoxelSetError> {
        if !is_valid_size(size) {
            return Err(VoxelSetError::InvalidDimensions { size });
        }
        Ok(Self {
            size,
            bits: vec![0; payload_len(size)],
        })
    }

    /// Empty 1x1x1 set
    pub fn single() -> Self {
        Self {
            size: IVec3::ONE,
            bits: vec![0],
        }
    }

    /// Rebuild a set from its packed payload
    ///
    /// `payload` must be exactly [`payload_len`] bytes. Bits past the last
    /// cell are ignored.
    pub fn from_payload(size: IVec3, payload: &[u8]) -> Result<Self, VoxelSetError> {
        let mut set = Self::new(size)?;
        if payload.len() != set.bits.len() {
            return Err(VoxelSetError::PayloadLength {
                expected: set.bits.len(),
                actual: payload.len(),
            });
        }
        set.bits.copy_from_slice(payload);
        let cells = set.cell_count();
        let tail = cells % 8;
        if tail != 0 {
            if let Some(last) = set.bits.last_mut() {
                *last &= (1u8 << tail) - 1;
            }
        }
        Ok(set)
    }

    #[inline]
    pub fn size(&self) -> IVec3 {
        self.size
    }

    /// Number of cells in the grid, set or not
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.size.x as usize * self.size.y as usize * self.size.z as usize
    }

    /// Packed bit payload, LSB first
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.bits
    }

    #[inline]
    fn index(&self, pos: IVec3) -> usize {
        let p = pos.clamp(IVec3::ZERO, self.size - IVec3::ONE);
        p.x as usize + self.size.x as usize * (p.y as usize + self.size.y as usize * p.z as usize)
    }

    #[inline]
    fn position(&self, index: usize) -> IVec3 {
        let xs = self.size.x as usize;
        let ys = self.size.y as usize;
        IVec3::new(
            (index % xs) as i32,
            ((index / xs) % ys) as i32,
            (index / (xs * ys)) as i32,
        )
    }

    /// Read a cell, clamping out-of-range coordinates
    #[inline]
    pub fn get(&self, pos: IVec3) -> bool {
        let i = self.index(pos);
        self.bits[i >> 3] & (1 << (i & 7)) != 0
    }

    /// Set a cell, clamping out-of-range coordinates
    #[inline]
    pub fn set(&mut self, pos: IVec3) {
        let i = self.index(pos);
        self.bits[i >> 3] |= 1 << (i & 7);
    }

    /// Clear a cell, clamping out-of-range coordinates
    #[inline]
    pub fn clear(&mut self, pos: IVec3) {
        let i = self.index(pos);
        self.bits[i >> 3] &= !(1 << (i & 7));
    }

    /// Clear every cell
    pub fn clear_all(&mut self) {
        self.bits.fill(0);
    }

    /// Change the size and clear every cell
    ///
    /// On error the set is left untouched.
    pub fn resize_and_clear(&mut self, size: IVec3) -> Result<(), VoxelSetError> {
        if !is_valid_size(size) {
            return Err(VoxelSetError::InvalidDimensions { size });
        }
        self.size = size;
        self.bits.clear();
        self.bits.resize(payload_len(size), 0);
        Ok(())
    }

    /// Number of set cells
    pub fn count(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    /// Local coordinates of every set cell, in linear index order
    pub fn iter(&self) -> impl Iterator<Item = IVec3> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &byte)| byte != 0)
            .flat_map(move |(byte_index, &byte)| {
                (0..8)
                    .filter(move |bit| byte & (1 << bit) != 0)
                    .map(move |bit| self.position(byte_index * 8 + bit))
            })
    }

    /// Smallest local box holding every set cell, or `None` when empty
    pub fn occupied_bounds(&self) -> Option<VoxelBox> {
        self.iter().fold(None, |acc: Option<VoxelBox>, p| {
            Some(match acc {
                Some(b) => VoxelBox {
                    min: b.min.min(p),
                    max: b.max.max(p),
                },
                None => VoxelBox { min: p, max: p },
            })
        })
    }
}
