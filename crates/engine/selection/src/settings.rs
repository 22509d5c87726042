use crate::facing::Facing;
use crate::io::{ByteReader, ByteWriter, CodecError};
use crate::matcher::FillMatcher;
use glam::IVec3;
use tracing::warn;

/// How a fill spreads from its seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Propagation {
    /// Full 3D, 6- or 26-connected
    #[default]
    FloodFill = 0,
    /// Confined to the plane selected by the normal
    Contour = 1,
}

impl Propagation {
    pub fn from_index(value: i32) -> Option<Self> {
        match value {
            0 => Some(Propagation::FloodFill),
            1 => Some(Propagation::Contour),
            _ => None,
        }
    }
}

/// Everything needed to start a fill, in transportable form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillSettings {
    propagation: Propagation,
    diagonal: bool,
    automatic_lower_bound: bool,
    start: IVec3,
    normal: Facing,
    matcher: FillMatcher,
}

impl Default for FillSettings {
    fn default() -> Self {
        Self {
            propagation: Propagation::FloodFill,
            diagonal: false,
            automatic_lower_bound: true,
            start: IVec3::ZERO,
            normal: Facing::Up,
            matcher: FillMatcher::Null,
        }
    }
}

impl FillSettings {
    pub fn new(propagation: Propagation, start: IVec3, matcher: FillMatcher) -> Self {
        Self {
            propagation,
            start,
            matcher,
            ..Self::default()
        }
    }

    pub fn propagation(&self) -> Propagation {
        self.propagation
    }

    pub fn diagonal(&self) -> bool {
        self.diagonal
    }

    /// Whether the fill's lowest Y is pinned to the start voxel's Y
    pub fn automatic_lower_bound(&self) -> bool {
        self.automatic_lower_bound
    }

    pub fn start(&self) -> IVec3 {
        self.start
    }

    /// Plane normal used by contour propagation
    pub fn normal(&self) -> Facing {
        self.normal
    }

    pub fn matcher(&self) -> FillMatcher {
        self.matcher
    }

    pub fn set_propagation(&mut self, propagation: Propagation) {
        self.propagation = propagation;
    }

    pub fn set_diagonal(&mut self, diagonal: bool) {
        self.diagonal = diagonal;
    }

    pub fn set_automatic_lower_bound(&mut self, automatic: bool) {
        self.automatic_lower_bound = automatic;
    }

    pub fn set_start(&mut self, start: IVec3) {
        self.start = start;
    }

    pub fn set_normal(&mut self, normal: Facing) {
        self.normal = normal;
    }

    pub fn set_matcher(&mut self, matcher: FillMatcher) {
        self.matcher = matcher;
    }

    pub fn encode(&self, writer: &mut ByteWriter) {
        writer.write_i32(self.propagation as i32);
        writer.write_bool(self.diagonal);
        writer.write_bool(self.automatic_lower_bound);
        writer.write_i32(self.start.x);
        writer.write_i32(self.start.y);
        writer.write_i32(self.start.z);
        writer.write_i32(self.normal.index());
        self.matcher.encode(writer);
    }

    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let value = reader.read_i32()?;
        let propagation =
            Propagation::from_index(value).ok_or(CodecError::UnknownPropagation { value })?;
        let diagonal = reader.read_bool()?;
        let automatic_lower_bound = reader.read_bool()?;
        let start = IVec3::new(reader.read_i32()?, reader.read_i32()?, reader.read_i32()?);
        let value = reader.read_i32()?;
        let normal = Facing::from_index(value).ok_or(CodecError::UnknownFacing { value })?;
        let matcher = FillMatcher::decode(reader)?;
        Ok(Self {
            propagation,
            diagonal,
            automatic_lower_bound,
            start,
            normal,
            matcher,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(32);
        self.encode(&mut writer);
        writer.into_bytes()
    }

    /// Decode a buffer holding exactly one settings value
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = ByteReader::new(bytes);
        let settings = Self::decode(&mut reader).and_then(|s| reader.finish().map(|_| s));
        if let Err(e) = &settings {
            warn!(len = bytes.len(), error = %e, "rejected fill settings buffer");
        }
        settings
    }

    /// Replace these settings with decoded ones, keeping the old value on failure
    pub fn read_from_bytes(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        *self = Self::from_bytes(bytes)?;
        Ok(())
    }
}
