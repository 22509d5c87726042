//! World collaborator
//!
//! The selection core never owns world data. It reads occupants and asks
//! whether a chunk column is resident through [`VoxelWorld`], and works in
//! chunk-local terms through [`ChunkView`]. Residency queries must answer
//! immediately: "not resident" is a normal result, never a reason to wait.
//!
//! [`MemoryWorld`] is a sparse, fully synchronous implementation used by the
//! tests, the benches and the `voxsel` tool.

use crate::bounds::VoxelBox;
use glam::IVec3;
use std::collections::{HashMap, HashSet};

/// Edge length of a chunk column along X and Z
pub const CHUNK_SIZE: i32 = 16;

/// Lowest valid voxel Y
pub const WORLD_MIN_Y: i32 = 0;

/// Highest valid voxel Y
pub const WORLD_MAX_Y: i32 = 255;

/// What fills a voxel, as far as selection cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccupantKind {
    /// Nothing there (air)
    Empty,
    /// Water, lava and other liquids
    Fluid,
    /// Present but can be walked through (grass, flowers, torches)
    Passable,
    /// Blocks movement
    Solid,
}

/// The occupant of a voxel: its type id, sub-variant and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occupant {
    pub id: i32,
    pub variant: i32,
    pub kind: OccupantKind,
}

impl Occupant {
    pub const EMPTY: Occupant = Occupant {
        id: 0,
        variant: 0,
        kind: OccupantKind::Empty,
    };

    pub const fn new(id: i32, variant: i32, kind: OccupantKind) -> Self {
        Self { id, variant, kind }
    }

    pub const fn solid(id: i32) -> Self {
        Self::new(id, 0, OccupantKind::Solid)
    }

    pub const fn fluid(id: i32, variant: i32) -> Self {
        Self::new(id, variant, OccupantKind::Fluid)
    }

    pub const fn passable(id: i32) -> Self {
        Self::new(id, 0, OccupantKind::Passable)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kind == OccupantKind::Empty
    }

    /// Solid or fluid; the voxels a line or contour treats as a surface
    #[inline]
    pub fn is_solid_or_fluid(&self) -> bool {
        matches!(self.kind, OccupantKind::Solid | OccupantKind::Fluid)
    }

    /// Empty or passable; a voxel something could be placed into
    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self.kind, OccupantKind::Empty | OccupantKind::Passable)
    }
}

/// Chunk column coordinates (world X and Z divided by [`CHUNK_SIZE`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk column holding a world voxel
    #[inline]
    pub fn containing(pos: IVec3) -> Self {
        Self {
            x: pos.x.div_euclid(CHUNK_SIZE),
            z: pos.z.div_euclid(CHUNK_SIZE),
        }
    }

    /// World X/Z of the chunk's lowest corner
    #[inline]
    pub fn min_corner(&self) -> IVec3 {
        IVec3::new(self.x * CHUNK_SIZE, WORLD_MIN_Y, self.z * CHUNK_SIZE)
    }

    /// The whole column as a world-space box over the valid Y range
    pub fn footprint(&self) -> VoxelBox {
        let min = self.min_corner();
        VoxelBox {
            min,
            max: IVec3::new(min.x + CHUNK_SIZE - 1, WORLD_MAX_Y, min.z + CHUNK_SIZE - 1),
        }
    }
}

/// Read access to a partially resident voxel world
pub trait VoxelWorld {
    /// Occupant at a world position
    ///
    /// Only meaningful when the containing chunk is resident; callers check
    /// [`VoxelWorld::is_chunk_resident`] first.
    fn occupant(&self, pos: IVec3) -> Occupant;

    /// Whether a chunk column is loaded and can be queried synchronously
    fn is_chunk_resident(&self, chunk: ChunkPos) -> bool;
}

impl<W: VoxelWorld + ?Sized> VoxelWorld for &W {
    fn occupant(&self, pos: IVec3) -> Occupant {
        (**self).occupant(pos)
    }

    fn is_chunk_resident(&self, chunk: ChunkPos) -> bool {
        (**self).is_chunk_resident(chunk)
    }
}

/// Occupant at a position, treating anything outside `[0,255]` as empty
pub fn classify<W: VoxelWorld + ?Sized>(world: &W, pos: IVec3) -> Occupant {
    if !(WORLD_MIN_Y..=WORLD_MAX_Y).contains(&pos.y) {
        return Occupant::EMPTY;
    }
    world.occupant(pos)
}

/// Chunk-local window onto the world
///
/// Local X and Z run over `0..CHUNK_SIZE`; Y is the world Y.
pub struct ChunkView<'a, W: ?Sized> {
    world: &'a W,
    chunk: ChunkPos,
    resident: bool,
}

impl<'a, W: VoxelWorld + ?Sized> ChunkView<'a, W> {
    pub fn new(world: &'a W, chunk: ChunkPos) -> Self {
        Self {
            world,
            chunk,
            resident: world.is_chunk_resident(chunk),
        }
    }

    /// View of the chunk holding a world position, plus that position's local coordinates
    pub fn containing(world: &'a W, pos: IVec3) -> (Self, IVec3) {
        let chunk = ChunkPos::containing(pos);
        let view = Self::new(world, chunk);
        let local = pos - chunk.min_corner().with_y(0);
        (view, local)
    }

    #[inline]
    pub fn chunk(&self) -> ChunkPos {
        self.chunk
    }

    #[inline]
    pub fn is_resident(&self) -> bool {
        self.resident
    }

    #[inline]
    pub fn world(&self) -> &'a W {
        self.world
    }

    /// Whether local X and Z fall inside this chunk
    #[inline]
    pub fn contains_local(&self, local: IVec3) -> bool {
        (0..CHUNK_SIZE).contains(&local.x) && (0..CHUNK_SIZE).contains(&local.z)
    }

    /// World position for a local coordinate
    #[inline]
    pub fn world_position(&self, local: IVec3) -> IVec3 {
        local + self.chunk.min_corner().with_y(0)
    }

    /// Occupant at a local coordinate; empty outside the valid Y range
    pub fn occupant(&self, local: IVec3) -> Occupant {
        classify(self.world, self.world_position(local))
    }
}

/// Sparse in-memory world
///
/// Every chunk is resident unless it has been marked otherwise with
/// [`MemoryWorld::set_chunk_resident`]. Occupants of non-resident chunks
/// read as empty, like an unloaded column.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorld {
    voxels: HashMap<IVec3, Occupant>,
    unresident: HashSet<ChunkPos>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an occupant; placing [`Occupant::EMPTY`] clears the voxel
    pub fn set(&mut self, pos: IVec3, occupant: Occupant) {
        if occupant.is_empty() {
            self.voxels.remove(&pos);
        } else {
            self.voxels.insert(pos, occupant);
        }
    }

    /// Fill every voxel of a box with one occupant
    pub fn fill_box(&mut self, region: VoxelBox, occupant: Occupant) {
        for z in region.min.z..=region.max.z {
            for y in region.min.y..=region.max.y {
                for x in region.min.x..=region.max.x {
                    self.set(IVec3::new(x, y, z), occupant);
                }
            }
        }
    }

    pub fn set_chunk_resident(&mut self, chunk: ChunkPos, resident: bool) {
        if resident {
            self.unresident.remove(&chunk);
        } else {
            self.unresident.insert(chunk);
        }
    }

    /// Number of non-empty voxels stored
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }
}

impl VoxelWorld for MemoryWorld {
    fn occupant(&self, pos: IVec3) -> Occupant {
        if self.unresident.contains(&ChunkPos::containing(pos)) {
            return Occupant::EMPTY;
        }
        self.voxels.get(&pos).copied().unwrap_or(Occupant::EMPTY)
    }

    fn is_chunk_resident(&self, chunk: ChunkPos) -> bool {
        !self.unresident.contains(&chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_of_negative_coordinates() {
        assert_eq!(ChunkPos::containing(IVec3::new(0, 5, 15)), ChunkPos::new(0, 0));
        assert_eq!(ChunkPos::containing(IVec3::new(16, 5, -1)), ChunkPos::new(1, -1));
        assert_eq!(ChunkPos::containing(IVec3::new(-16, 5, -17)), ChunkPos::new(-1, -2));
    }

    #[test]
    fn test_chunk_footprint() {
        let footprint = ChunkPos::new(-1, 2).footprint();
        assert_eq!(footprint.min, IVec3::new(-16, 0, 32));
        assert_eq!(footprint.max, IVec3::new(-1, 255, 47));
    }

    #[test]
    fn test_memory_world_set_and_clear() {
        let mut world = MemoryWorld::new();
        let pos = IVec3::new(3, 10, -4);
        world.set(pos, Occupant::solid(1));
        assert_eq!(world.occupant(pos), Occupant::solid(1));
        world.set(pos, Occupant::EMPTY);
        assert!(world.occupant(pos).is_empty());
        assert!(world.is_empty());
    }

    #[test]
    fn test_unresident_chunk_reads_empty() {
        let mut world = MemoryWorld::new();
        let pos = IVec3::new(20, 1, 1);
        world.set(pos, Occupant::solid(1));
        world.set_chunk_resident(ChunkPos::new(1, 0), false);
        assert!(!world.is_chunk_resident(ChunkPos::new(1, 0)));
        assert!(world.occupant(pos).is_empty());
        world.set_chunk_resident(ChunkPos::new(1, 0), true);
        assert_eq!(world.occupant(pos), Occupant::solid(1));
    }

    #[test]
    fn test_chunk_view_local_coordinates() {
        let mut world = MemoryWorld::new();
        world.set(IVec3::new(-3, 7, 18), Occupant::solid(4));
        let (view, local) = ChunkView::containing(&world, IVec3::new(-3, 7, 18));
        assert_eq!(view.chunk(), ChunkPos::new(-1, 1));
        assert_eq!(local, IVec3::new(13, 7, 2));
        assert!(view.contains_local(local));
        assert_eq!(view.occupant(local), Occupant::solid(4));
        assert!(view.occupant(IVec3::new(13, -1, 2)).is_empty());
    }
}
