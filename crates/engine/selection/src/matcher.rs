//! Match predicates deciding which voxels a search accepts
//!
//! The variant set is closed, so [`FillMatcher`] is an enum and the two
//! places that care about the variant (evaluation and the wire tag) match
//! on it directly.

use crate::facing::Facing;
use crate::io::{ByteReader, ByteWriter, CodecError};
use crate::world::{classify, ChunkView, Occupant, OccupantKind, VoxelWorld};
use crate::world::{WORLD_MAX_Y, WORLD_MIN_Y};
use glam::IVec3;
use tracing::warn;

/// Outcome of testing one voxel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchResult {
    /// Add the voxel to the selection
    Match,
    /// Leave the voxel out
    NoMatch,
    /// Needed data is not resident; the voxel is unavailable, not excluded
    NotLoaded,
    /// The chunk-local test needed a neighbouring chunk; retry with the world
    OutOfBounds,
}

/// Predicate over a voxel (and for contours, its neighbour)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMatcher {
    /// Anything that is not empty
    AnyNonEmpty,
    /// Solid or fluid occupants
    AnySolid,
    /// One occupant id and variant; fluids match on id alone
    OnlySpecified { id: i32, variant: i32 },
    /// Never matches
    #[default]
    Null,
    /// An open voxel whose neighbour through `normal` is solid
    ContourFollower { normal: Facing },
}

const TYPE_ANY_NON_EMPTY: u8 = 1;
const TYPE_ANY_SOLID: u8 = 3;
const TYPE_ONLY_SPECIFIED: u8 = 5;
const TYPE_NULL: u8 = 7;
const TYPE_CONTOUR_FOLLOWER: u8 = 9;

#[inline]
fn verdict(matched: bool) -> MatchResult {
    if matched {
        MatchResult::Match
    } else {
        MatchResult::NoMatch
    }
}

#[inline]
fn in_world_y(y: i32) -> bool {
    (WORLD_MIN_Y..=WORLD_MAX_Y).contains(&y)
}

impl FillMatcher {
    /// Matcher selecting exactly the occupant found at `pos`
    pub fn starting_occupant<W: VoxelWorld + ?Sized>(world: &W, pos: IVec3) -> Self {
        let occupant = classify(world, pos);
        FillMatcher::OnlySpecified {
            id: occupant.id,
            variant: occupant.variant,
        }
    }

    /// Wire tag of this variant
    pub fn type_id(&self) -> u8 {
        match self {
            FillMatcher::AnyNonEmpty => TYPE_ANY_NON_EMPTY,
            FillMatcher::AnySolid => TYPE_ANY_SOLID,
            FillMatcher::OnlySpecified { .. } => TYPE_ONLY_SPECIFIED,
            FillMatcher::Null => TYPE_NULL,
            FillMatcher::ContourFollower { .. } => TYPE_CONTOUR_FOLLOWER,
        }
    }

    /// Test a single occupant against the occupant-only variants
    fn accepts(&self, occupant: Occupant) -> bool {
        match *self {
            FillMatcher::AnyNonEmpty => !occupant.is_empty(),
            FillMatcher::AnySolid => occupant.is_solid_or_fluid(),
            FillMatcher::OnlySpecified { id, variant } => {
                occupant.id == id
                    && (occupant.kind == OccupantKind::Fluid || occupant.variant == variant)
            }
            FillMatcher::Null | FillMatcher::ContourFollower { .. } => false,
        }
    }

    /// Test a voxel using only the chunk it lives in
    ///
    /// `local` is chunk-local: X and Z in `0..16`, Y is world Y.
    pub fn matches_in_chunk<W: VoxelWorld + ?Sized>(
        &self,
        chunk: &ChunkView<'_, W>,
        local: IVec3,
    ) -> MatchResult {
        if !chunk.is_resident() {
            return MatchResult::NotLoaded;
        }
        match *self {
            FillMatcher::Null => MatchResult::NoMatch,
            FillMatcher::ContourFollower { normal } => {
                if !chunk.occupant(local).is_open() {
                    return MatchResult::NoMatch;
                }
                let neighbour = local + normal.offset();
                if !chunk.contains_local(neighbour) {
                    return MatchResult::OutOfBounds;
                }
                if !in_world_y(neighbour.y) {
                    return MatchResult::NoMatch;
                }
                verdict(chunk.occupant(neighbour).kind == OccupantKind::Solid)
            }
            _ => verdict(self.accepts(chunk.occupant(local))),
        }
    }

    /// Test a voxel with access to the whole world
    pub fn matches_in_world<W: VoxelWorld + ?Sized>(&self, world: &W, pos: IVec3) -> MatchResult {
        let (chunk, local) = ChunkView::containing(world, pos);
        if !chunk.is_resident() {
            return MatchResult::NotLoaded;
        }
        match *self {
            FillMatcher::ContourFollower { normal } => {
                if !chunk.occupant(local).is_open() {
                    return MatchResult::NoMatch;
                }
                let neighbour = pos + normal.offset();
                if !in_world_y(neighbour.y) {
                    return MatchResult::NoMatch;
                }
                let (next, next_local) = ChunkView::containing(world, neighbour);
                if !next.is_resident() {
                    return MatchResult::NotLoaded;
                }
                verdict(next.occupant(next_local).kind == OccupantKind::Solid)
            }
            _ => self.matches_in_chunk(&chunk, local),
        }
    }

    /// Chunk-local test, falling back to the world when it reports
    /// [`MatchResult::OutOfBounds`]
    pub fn evaluate<W: VoxelWorld + ?Sized>(&self, world: &W, pos: IVec3) -> MatchResult {
        let (chunk, local) = ChunkView::containing(world, pos);
        match self.matches_in_chunk(&chunk, local) {
            MatchResult::OutOfBounds => self.matches_in_world(world, pos),
            result => result,
        }
    }

    pub fn encode(&self, writer: &mut ByteWriter) {
        writer.write_u8(self.type_id());
        match *self {
            FillMatcher::OnlySpecified { id, variant } => {
                writer.write_i32(id);
                writer.write_i32(variant);
            }
            FillMatcher::ContourFollower { normal } => writer.write_i32(normal.index()),
            _ => {}
        }
    }

    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let type_id = reader.read_u8()?;
        let matcher = match type_id {
            TYPE_ANY_NON_EMPTY => FillMatcher::AnyNonEmpty,
            TYPE_ANY_SOLID => FillMatcher::AnySolid,
            TYPE_ONLY_SPECIFIED => FillMatcher::OnlySpecified {
                id: reader.read_i32()?,
                variant: reader.read_i32()?,
            },
            TYPE_NULL => FillMatcher::Null,
            TYPE_CONTOUR_FOLLOWER => {
                let value = reader.read_i32()?;
                let normal = Facing::from_index(value).ok_or(CodecError::UnknownFacing { value })?;
                FillMatcher::ContourFollower { normal }
            }
            _ => return Err(CodecError::UnknownMatcher { type_id }),
        };
        Ok(matcher)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(9);
        self.encode(&mut writer);
        writer.into_bytes()
    }

    /// Decode a buffer holding exactly one matcher
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = ByteReader::new(bytes);
        let matcher = Self::decode(&mut reader).and_then(|m| reader.finish().map(|_| m));
        if let Err(e) = &matcher {
            warn!(len = bytes.len(), error = %e, "rejected matcher buffer");
        }
        matcher
    }
}
