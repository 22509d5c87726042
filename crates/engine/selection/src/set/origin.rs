use super::dense::payload_len;
use super::{is_valid_size, DenseVoxelSet, VoxelSetError};
use crate::bounds::VoxelBox;
use crate::io::{ByteReader, ByteWriter, CodecError};
use glam::IVec3;
use tracing::warn;

/// A [`DenseVoxelSet`] placed in the world
///
/// `world = local + origin`. World accessors clamp like the local ones,
/// so use [`OriginVoxelSet::contains`] when a position may lie outside the
/// grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginVoxelSet {
    origin: IVec3,
    voxels: DenseVoxelSet,
}

impl OriginVoxelSet {
    pub fn new(origin: IVec3, size: IVec3) -> Result<Self, VoxelSetError> {
        Ok(Self {
            origin,
            voxels: DenseVoxelSet::new(size)?,
        })
    }

    /// Empty 1x1x1 set at `origin`
    pub fn single(origin: IVec3) -> Self {
        Self {
            origin,
            voxels: DenseVoxelSet::single(),
        }
    }

    /// Empty set covering exactly a world-space box
    pub fn covering(region: VoxelBox) -> Result<Self, VoxelSetError> {
        Self::new(region.min, region.size())
    }

    #[inline]
    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    #[inline]
    pub fn size(&self) -> IVec3 {
        self.voxels.size()
    }

    /// The local grid
    #[inline]
    pub fn voxels(&self) -> &DenseVoxelSet {
        &self.voxels
    }

    /// World-space box covered by the grid
    pub fn bounds(&self) -> VoxelBox {
        VoxelBox {
            min: self.origin,
            max: self.origin + self.voxels.size() - IVec3::ONE,
        }
    }

    /// Read a cell by world position, clamping to the grid
    #[inline]
    pub fn get(&self, pos: IVec3) -> bool {
        self.voxels.get(pos - self.origin)
    }

    /// Whether a world position lies inside the grid and is set
    #[inline]
    pub fn contains(&self, pos: IVec3) -> bool {
        self.bounds().contains(pos) && self.get(pos)
    }

    #[inline]
    pub fn set(&mut self, pos: IVec3) {
        self.voxels.set(pos - self.origin);
    }

    #[inline]
    pub fn clear(&mut self, pos: IVec3) {
        self.voxels.clear(pos - self.origin);
    }

    /// Move the grid and clear it
    pub fn reset(&mut self, origin: IVec3, size: IVec3) -> Result<(), VoxelSetError> {
        self.voxels.resize_and_clear(size)?;
        self.origin = origin;
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.voxels.count()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// World positions of every set cell
    pub fn iter(&self) -> impl Iterator<Item = IVec3> + '_ {
        let origin = self.origin;
        self.voxels.iter().map(move |p| p + origin)
    }

    /// Smallest world box holding every set cell
    pub fn occupied_bounds(&self) -> Option<VoxelBox> {
        self.voxels.occupied_bounds().map(|b| VoxelBox {
            min: b.min + self.origin,
            max: b.max + self.origin,
        })
    }

    /// Copy of the set re-based onto `region`
    ///
    /// Cells outside `region` are dropped.
    pub fn cropped(&self, region: VoxelBox) -> Result<Self, VoxelSetError> {
        let mut out = Self::covering(region)?;
        for pos in self.iter().filter(|p| region.contains(*p)) {
            out.set(pos);
        }
        Ok(out)
    }

    /// Append the wire encoding to a writer
    pub fn encode(&self, writer: &mut ByteWriter) {
        let size = self.voxels.size();
        writer.write_i32(self.origin.x);
        writer.write_i32(self.origin.y);
        writer.write_i32(self.origin.z);
        writer.write_i32(size.x);
        writer.write_i32(size.y);
        writer.write_i32(size.z);
        writer.write_bytes(self.voxels.payload());
    }

    /// Decode one set from a reader
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let origin = IVec3::new(reader.read_i32()?, reader.read_i32()?, reader.read_i32()?);
        let size = IVec3::new(reader.read_i32()?, reader.read_i32()?, reader.read_i32()?);
        if !is_valid_size(size) {
            return Err(CodecError::InvalidDimensions {
                x: size.x,
                y: size.y,
                z: size.z,
            });
        }
        let payload = reader.read_bytes(payload_len(size))?;
        let voxels = DenseVoxelSet::from_payload(size, payload).map_err(|_| {
            CodecError::InvalidDimensions {
                x: size.x,
                y: size.y,
                z: size.z,
            }
        })?;
        Ok(Self { origin, voxels })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(24 + self.voxels.payload().len());
        self.encode(&mut writer);
        writer.into_bytes()
    }

    /// Decode a buffer holding exactly one set
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = ByteReader::new(bytes);
        let set = Self::decode(&mut reader)?;
        reader.finish()?;
        Ok(set)
    }

    /// Replace this set with a decoded one
    ///
    /// On failure the current contents are kept.
    pub fn read_from_bytes(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        match Self::from_bytes(bytes) {
            Ok(set) => {
                *self = set;
                Ok(())
            }
            Err(e) => {
                warn!(len = bytes.len(), error = %e, "rejected voxel set buffer");
                Err(e)
            }
        }
    }
}
