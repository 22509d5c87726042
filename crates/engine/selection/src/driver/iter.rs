//! Voxel walks grouped by chunk column
//!
//! The driver pulls one voxel at a time from a [`ChunkwiseIterator`]. When
//! the walk moves into a different chunk column the iterator says so, which
//! is where the driver checks residency; a non-resident column is skipped as
//! a whole and never comes back.

use crate::bounds::VoxelBox;
use crate::search::{Advance, BreadthSearch, NeighborTable};
use crate::set::{OriginVoxelSet, VoxelSetError};
use crate::world::ChunkPos;
use glam::IVec3;
use std::collections::HashSet;

pub trait ChunkwiseIterator {
    /// Voxel waiting to be evaluated, `None` once the walk is over
    fn current(&self) -> Option<IVec3>;

    /// Whether [`ChunkwiseIterator::current`] lies in a different chunk than
    /// the voxel before it
    fn entered_new_chunk(&self) -> bool;

    /// Abandon the current voxel and every other voxel of its chunk column
    fn skip_chunk(&mut self);

    /// Move past the current voxel, reporting whether it matched
    fn advance(&mut self, matched: bool);

    /// Rough progress in `[0, 1]`
    fn fraction_complete(&self) -> f32;

    fn current_chunk(&self) -> Option<ChunkPos> {
        self.current().map(ChunkPos::containing)
    }
}

/// Chunk columns overlapping a box, X fastest
pub fn chunks_overlapping(bounds: VoxelBox) -> impl Iterator<Item = ChunkPos> {
    let low = ChunkPos::containing(bounds.min);
    let high = ChunkPos::containing(bounds.max);
    (low.z..=high.z).flat_map(move |z| (low.x..=high.x).map(move |x| ChunkPos::new(x, z)))
}

/// Every voxel of a box, one chunk column at a time
///
/// Columns are visited in X-then-Z order; inside a column X runs fastest,
/// then Z, then Y.
#[derive(Debug, Clone)]
pub struct BoxChunkIterator {
    bounds: VoxelBox,
    chunks: Vec<ChunkPos>,
    chunk_index: usize,
    region: Option<VoxelBox>,
    cursor: IVec3,
    new_chunk: bool,
    consumed_in_region: u64,
    consumed: u64,
    volume: u64,
}

impl BoxChunkIterator {
    pub fn new(bounds: VoxelBox) -> Self {
        let chunks = chunks_overlapping(bounds).collect();
        let mut iter = Self {
            bounds,
            chunks,
            chunk_index: 0,
            region: None,
            cursor: IVec3::ZERO,
            new_chunk: false,
            consumed_in_region: 0,
            consumed: 0,
            volume: bounds.volume(),
        };
        iter.enter_chunk(0);
        iter
    }

    fn enter_chunk(&mut self, index: usize) {
        self.chunk_index = index;
        self.consumed_in_region = 0;
        self.region = self
            .chunks
            .get(index)
            .and_then(|chunk| chunk.footprint().intersection(&self.bounds));
        if let Some(region) = self.region {
            self.cursor = region.min;
            self.new_chunk = true;
        }
    }
}

impl ChunkwiseIterator for BoxChunkIterator {
    fn current(&self) -> Option<IVec3> {
        self.region.map(|_| self.cursor)
    }

    fn entered_new_chunk(&self) -> bool {
        self.new_chunk
    }

    fn skip_chunk(&mut self) {
        if let Some(region) = self.region {
            self.consumed += region.volume() - self.consumed_in_region;
            self.enter_chunk(self.chunk_index + 1);
        }
    }

    fn advance(&mut self, _matched: bool) {
        let Some(region) = self.region else {
            return;
        };
        self.new_chunk = false;
        self.consumed += 1;
        self.consumed_in_region += 1;

        let c = &mut self.cursor;
        c.x += 1;
        if c.x > region.max.x {
            c.x = region.min.x;
            c.z += 1;
            if c.z > region.max.z {
                c.z = region.min.z;
                c.y += 1;
                if c.y > region.max.y {
                    self.enter_chunk(self.chunk_index + 1);
                }
            }
        }
    }

    fn fraction_complete(&self) -> f32 {
        if self.volume == 0 {
            return 1.0;
        }
        (self.consumed as f64 / self.volume as f64).clamp(0.0, 1.0) as f32
    }
}

/// Breadth-first flood over a bounded region
///
/// The first voxel offered is the seed; if it does not match the walk ends.
/// Matched voxels are expanded through the neighbour table in breadth order.
/// Candidates falling in a skipped column are dropped without being offered.
#[derive(Debug, Clone)]
pub struct FillChunkIterator {
    search: BreadthSearch,
    visited: OriginVoxelSet,
    skipped: HashSet<ChunkPos>,
    pending: Option<IVec3>,
    previous_chunk: Option<ChunkPos>,
    new_chunk: bool,
    added: u64,
    volume: u64,
}

impl FillChunkIterator {
    pub fn new(seed: IVec3, table: NeighborTable, bounds: VoxelBox) -> Result<Self, VoxelSetError> {
        let mut visited = OriginVoxelSet::covering(bounds)?;
        visited.set(seed);
        Ok(Self {
            search: BreadthSearch::new(table, bounds),
            visited,
            skipped: HashSet::new(),
            pending: Some(seed),
            previous_chunk: None,
            new_chunk: true,
            added: 0,
            volume: bounds.volume(),
        })
    }

    /// Voxels matched so far
    pub fn added(&self) -> u64 {
        self.added
    }

    fn offer(&mut self, pos: Option<IVec3>) {
        if let Some(current) = self.pending {
            self.previous_chunk = Some(ChunkPos::containing(current));
        }
        self.pending = pos;
        self.new_chunk = match pos {
            Some(p) => self.previous_chunk != Some(ChunkPos::containing(p)),
            None => false,
        };
    }

    fn find_next(&mut self) {
        loop {
            match self.search.advance(&mut self.visited) {
                Advance::Exhausted => return self.offer(None),
                Advance::Skipped => {}
                Advance::Candidate(pos) => {
                    if !self.skipped.contains(&ChunkPos::containing(pos)) {
                        return self.offer(Some(pos));
                    }
                }
            }
        }
    }
}

impl ChunkwiseIterator for FillChunkIterator {
    fn current(&self) -> Option<IVec3> {
        self.pending
    }

    fn entered_new_chunk(&self) -> bool {
        self.new_chunk
    }

    fn skip_chunk(&mut self) {
        if let Some(chunk) = self.current_chunk() {
            self.skipped.insert(chunk);
            self.find_next();
        }
    }

    fn advance(&mut self, matched: bool) {
        let Some(pos) = self.pending else {
            return;
        };
        if matched {
            self.added += 1;
            self.search.accept(pos);
        }
        self.find_next();
    }

    /// `1 - ln(added / volume) / (ln(1 / volume) - 1)`
    ///
    /// Grows with the log of the filled fraction because a fill front's
    /// final extent is unknown. Only monotonicity matters.
    fn fraction_complete(&self) -> f32 {
        if self.pending.is_none() {
            return 1.0;
        }
        if self.added == 0 || self.volume <= 1 {
            return 0.0;
        }
        let volume = self.volume as f64;
        let ratio = self.added as f64 / volume;
        let fraction = 1.0 - ratio.ln() / ((1.0 / volume).ln() - 1.0);
        fraction.clamp(0.0, 1.0) as f32
    }
}
