//! Breadth-layered searches
//!
//! Contour and flood fill share one algorithm and differ only in their
//! [`NeighborTable`]. [`BreadthSearch`] walks the frontier one direction at a
//! time and hands back candidates; the caller decides whether each matches.
//! The resumable driver drives the same stepper across time slices.

pub mod contour;
pub mod fill;
pub mod frontier;
pub mod neighbors;

pub use contour::{select_contour_bounded, select_contour_unbounded};
pub use fill::{select_fill_bounded, select_fill_unbounded};
pub use frontier::{Frontier, SearchPosition};
pub use neighbors::{NeighborTable, SearchPlane};

use crate::bounds::VoxelBox;
use crate::matcher::{FillMatcher, MatchResult};
use crate::set::OriginVoxelSet;
use crate::world::VoxelWorld;
use glam::IVec3;
use std::collections::HashSet;

/// Result of a direct (single call) search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Accepted voxels in breadth order, seed first
    pub selected: Vec<IVec3>,
    /// Voxels whose match could not be decided because data was not resident
    pub unavailable: Vec<IVec3>,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// Record of which voxels a search has already examined
pub trait VisitedSet {
    fn is_visited(&self, pos: IVec3) -> bool;
    fn mark_visited(&mut self, pos: IVec3);
}

impl VisitedSet for HashSet<IVec3> {
    fn is_visited(&self, pos: IVec3) -> bool {
        self.contains(&pos)
    }

    fn mark_visited(&mut self, pos: IVec3) {
        self.insert(pos);
    }
}

impl VisitedSet for OriginVoxelSet {
    fn is_visited(&self, pos: IVec3) -> bool {
        self.contains(pos)
    }

    fn mark_visited(&mut self, pos: IVec3) {
        self.set(pos);
    }
}

/// One step of a breadth search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A new in-bounds voxel to evaluate; already marked visited
    Candidate(IVec3),
    /// The direction tried led outside the bounds or to a visited voxel
    Skipped,
    /// Nothing left to expand
    Exhausted,
}

/// Frontier plus neighbour table and bounds
#[derive(Debug, Clone)]
pub struct BreadthSearch {
    frontier: Frontier,
    table: NeighborTable,
    bounds: VoxelBox,
}

impl BreadthSearch {
    /// Search with an empty frontier; accept the seed to start expanding
    pub fn new(table: NeighborTable, bounds: VoxelBox) -> Self {
        Self {
            frontier: Frontier::new(),
            table,
            bounds,
        }
    }

    /// Search that expands from `seed` straight away
    pub fn with_seed(seed: IVec3, table: NeighborTable, bounds: VoxelBox) -> Self {
        Self {
            frontier: Frontier::with_seed(seed),
            table,
            bounds,
        }
    }

    pub fn bounds(&self) -> VoxelBox {
        self.bounds
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Queue an accepted voxel for expansion at the next depth
    pub fn accept(&mut self, pos: IVec3) {
        self.frontier.push(pos);
    }

    /// Try the next direction of the front position
    pub fn advance<V: VisitedSet + ?Sized>(&mut self, visited: &mut V) -> Advance {
        let Some(front) = self.frontier.front_mut() else {
            return Advance::Exhausted;
        };
        let offset = self.table.offset(front.next_direction);
        let origin = front.pos;
        front.next_direction = self.table.next_index(front.next_direction);
        if self.table.offset(front.next_direction).is_none() {
            self.frontier.pop_front();
        }

        let Some(offset) = offset else {
            return Advance::Skipped;
        };
        let candidate = origin + offset;
        if !self.bounds.contains(candidate) || visited.is_visited(candidate) {
            return Advance::Skipped;
        }
        visited.mark_visited(candidate);
        Advance::Candidate(candidate)
    }
}

/// Run a search to completion, evaluating each candidate against `matcher`
///
/// Stops when the frontier is exhausted or `outcome.selected` reaches
/// `max_count`.
pub(crate) fn expand<W, V>(
    world: &W,
    matcher: &FillMatcher,
    search: &mut BreadthSearch,
    visited: &mut V,
    max_count: usize,
    outcome: &mut SearchOutcome,
) where
    W: VoxelWorld + ?Sized,
    V: VisitedSet + ?Sized,
{
    while outcome.selected.len() < max_count {
        match search.advance(visited) {
            Advance::Exhausted => break,
            Advance::Skipped => {}
            Advance::Candidate(pos) => match matcher.evaluate(world, pos) {
                MatchResult::Match => {
                    outcome.selected.push(pos);
                    search.accept(pos);
                }
                MatchResult::NotLoaded => outcome.unavailable.push(pos),
                MatchResult::NoMatch | MatchResult::OutOfBounds => {}
            },
        }
    }
}
