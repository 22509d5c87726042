//! Resumable, time-sliced selection over a partially resident world
//!
//! [`SelectionDriver`] is a small state machine:
//!
//! ```text
//! Idle --start_box--> AllInBox --+
//!   |                            +--> Complete
//!   +--start_fill---> Fill ------+
//! ```
//!
//! The host calls [`SelectionDriver::resume`] once per tick with a time
//! budget. Each call does at least one voxel of work, returns
//! [`Progress::InProgress`] when the budget runs out, and
//! [`Progress::Complete`] once the walk is over. On completion the selection
//! and the unavailable set are cropped to the smallest box enclosing both.
//!
//! Chunk columns that are not resident when the walk reaches them are
//! recorded wholesale in the unavailable set instead of being matched.

pub mod iter;

pub use iter::{BoxChunkIterator, ChunkwiseIterator, FillChunkIterator};

use crate::bounds::VoxelBox;
use crate::matcher::{FillMatcher, MatchResult};
use crate::search::{NeighborTable, SearchPlane};
use crate::set::{OriginVoxelSet, VoxelSetError, MAX_DIMENSION};
use crate::settings::{FillSettings, Propagation};
use crate::world::{ChunkPos, VoxelWorld, WORLD_MAX_Y, WORLD_MIN_Y};
use glam::IVec3;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, trace, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("selection driver resumed before a selection was started")]
    NotStarted,

    #[error("fill start {start} lies outside the region {min}..={max}")]
    StartOutsideBounds { start: IVec3, min: IVec3, max: IVec3 },

    #[error("selection region {size} exceeds 256 voxels on an axis")]
    TooLarge { size: IVec3 },

    #[error("selection region lies entirely outside the world's Y range")]
    EmptyRegion,

    #[error(transparent)]
    VoxelSet(#[from] VoxelSetError),
}

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverState {
    Idle,
    AllInBox,
    Fill,
    Complete,
}

/// What a call to [`SelectionDriver::resume`] achieved
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Budget ran out; estimated fraction done in `[0, 1]`
    InProgress(f32),
    /// Nothing left to do
    Complete,
}

impl Progress {
    /// Fraction done, or `-1.0` once complete
    pub fn as_f32(&self) -> f32 {
        match self {
            Progress::InProgress(fraction) => *fraction,
            Progress::Complete => -1.0,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Progress::Complete)
    }
}

/// Owned result of a finished (or abandoned) selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    pub selection: OriginVoxelSet,
    pub unavailable: OriginVoxelSet,
}

impl SelectionResult {
    pub fn contains_unavailable_voxels(&self) -> bool {
        !self.unavailable.is_empty()
    }
}

/// Region an unbounded fill may cover around its start
///
/// X and Z extend `128 - border` either side of the start. Y starts at the
/// start voxel when `automatic_lower_bound`, or `128 - border` below it
/// otherwise, and spans at most the same height. Y is clamped to the world.
pub fn unbound_fill_region(start: IVec3, automatic_lower_bound: bool, border: i32) -> VoxelBox {
    let half = (MAX_DIMENSION / 2 - border).clamp(0, MAX_DIMENSION / 2 - 1);
    let min_y = if automatic_lower_bound {
        start.y
    } else {
        start.y - half
    }
    .max(WORLD_MIN_Y);
    let max_y = (min_y + 2 * half).min(WORLD_MAX_Y);
    VoxelBox {
        min: IVec3::new(start.x - half, min_y, start.z - half),
        max: IVec3::new(start.x + half, max_y, start.z + half),
    }
}

/// Resumable selection state machine
///
/// Owns every piece of in-flight state; nothing is shared. Dropping the
/// driver cancels the selection. Partial results stay readable throughout.
pub struct SelectionDriver {
    state: DriverState,
    matcher: FillMatcher,
    bounds: VoxelBox,
    selection: OriginVoxelSet,
    unavailable: OriginVoxelSet,
    /// Smallest box holding every selected or unavailable voxel so far
    range: Option<VoxelBox>,
    resident_chunks: HashSet<ChunkPos>,
    walk: Option<Box<dyn ChunkwiseIterator>>,
}

impl Default for SelectionDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SelectionDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionDriver")
            .field("state", &self.state)
            .field("matcher", &self.matcher)
            .field("bounds", &self.bounds)
            .field("selected", &self.selection.count())
            .field("unavailable", &self.unavailable.count())
            .finish()
    }
}

fn grow(range: &mut Option<VoxelBox>, region: VoxelBox) {
    *range = Some(match *range {
        Some(r) => VoxelBox {
            min: r.min.min(region.min),
            max: r.max.max(region.max),
        },
        None => region,
    });
}

impl SelectionDriver {
    pub fn new() -> Self {
        Self {
            state: DriverState::Idle,
            matcher: FillMatcher::Null,
            bounds: VoxelBox {
                min: IVec3::ZERO,
                max: IVec3::ZERO,
            },
            selection: OriginVoxelSet::single(IVec3::ZERO),
            unavailable: OriginVoxelSet::single(IVec3::ZERO),
            range: None,
            resident_chunks: HashSet::new(),
            walk: None,
        }
    }

    /// Clamp to the world, check size, and reset both sets over `bounds`
    fn prepare(&mut self, bounds: VoxelBox, matcher: FillMatcher) -> Result<VoxelBox, DriverError> {
        let bounds = bounds.clamp_y(WORLD_MIN_Y, WORLD_MAX_Y);
        if bounds.min.y > bounds.max.y {
            warn!(?bounds, "selection region outside world");
            return Err(DriverError::EmptyRegion);
        }
        let size = bounds.size();
        if size.max_element() > MAX_DIMENSION {
            warn!(%size, "selection region too large");
            return Err(DriverError::TooLarge { size });
        }
        self.selection.reset(bounds.min, size)?;
        self.unavailable.reset(bounds.min, size)?;
        self.matcher = matcher;
        self.bounds = bounds;
        self.range = None;
        self.resident_chunks.clear();
        Ok(bounds)
    }

    /// Select every voxel between two corners that satisfies `matcher`
    pub fn start_box(&mut self, corner1: IVec3, corner2: IVec3, matcher: FillMatcher) -> Result<(), DriverError> {
        let bounds = self.prepare(VoxelBox::from_corners(corner1, corner2), matcher)?;
        self.walk = Some(Box::new(BoxChunkIterator::new(bounds)));
        self.state = DriverState::AllInBox;
        debug!(min = %bounds.min, max = %bounds.max, ?matcher, "started box selection");
        Ok(())
    }

    /// Fill from `settings.start()` within `bounds`
    ///
    /// Flood propagation uses the 6 or 26 neighbour table, contour
    /// propagation the in-plane table for `settings.normal()`.
    pub fn start_fill(&mut self, settings: &FillSettings, bounds: VoxelBox) -> Result<(), DriverError> {
        let start = settings.start();
        let clamped = bounds.clamp_y(WORLD_MIN_Y, WORLD_MAX_Y);
        if !clamped.contains(start) {
            warn!(%start, ?bounds, "fill start outside region");
            return Err(DriverError::StartOutsideBounds {
                start,
                min: bounds.min,
                max: bounds.max,
            });
        }
        let bounds = self.prepare(clamped, settings.matcher())?;
        let table = match settings.propagation() {
            Propagation::FloodFill => NeighborTable::flood(settings.diagonal()),
            Propagation::Contour => {
                NeighborTable::contour(SearchPlane::from_normal(settings.normal()), settings.diagonal())
            }
        };
        self.walk = Some(Box::new(FillChunkIterator::new(start, table, bounds)?));
        self.state = DriverState::Fill;
        debug!(
            %start,
            min = %bounds.min,
            max = %bounds.max,
            propagation = ?settings.propagation(),
            diagonal = settings.diagonal(),
            "started fill selection"
        );
        Ok(())
    }

    /// Fill within [`unbound_fill_region`] around the start
    pub fn start_unbound_fill(&mut self, settings: &FillSettings, border: i32) -> Result<(), DriverError> {
        let region = unbound_fill_region(settings.start(), settings.automatic_lower_bound(), border);
        self.start_fill(settings, region)
    }

    /// Run until the walk ends or `budget` has elapsed
    ///
    /// At least one voxel is processed per call. Resuming a completed driver
    /// is a no-op; resuming an idle one is an error.
    pub fn resume<W: VoxelWorld + ?Sized>(&mut self, world: &W, budget: Duration) -> Result<Progress, DriverError> {
        match self.state {
            DriverState::Idle => {
                error!("selection driver resumed while idle");
                return Err(DriverError::NotStarted);
            }
            DriverState::Complete => return Ok(Progress::Complete),
            DriverState::AllInBox | DriverState::Fill => {}
        }
        let Some(walk) = self.walk.as_mut() else {
            self.finish();
            return Ok(Progress::Complete);
        };

        let started = Instant::now();
        let mut processed = 0u64;
        while let Some(pos) = walk.current() {
            if processed > 0 && started.elapsed() > budget {
                let fraction = walk.fraction_complete();
                trace!(processed, fraction, "selection slice ended");
                return Ok(Progress::InProgress(fraction));
            }
            processed += 1;

            if walk.entered_new_chunk() {
                let chunk = ChunkPos::containing(pos);
                if !self.resident_chunks.contains(&chunk) {
                    if world.is_chunk_resident(chunk) {
                        self.resident_chunks.insert(chunk);
                    } else {
                        if let Some(region) = chunk.footprint().intersection(&self.bounds) {
                            for z in region.min.z..=region.max.z {
                                for y in region.min.y..=region.max.y {
                                    for x in region.min.x..=region.max.x {
                                        self.unavailable.set(IVec3::new(x, y, z));
                                    }
                                }
                            }
                            grow(&mut self.range, region);
                        }
                        trace!(x = chunk.x, z = chunk.z, "chunk not resident, marked unavailable");
                        walk.skip_chunk();
                        continue;
                    }
                }
            }

            match self.matcher.evaluate(world, pos) {
                MatchResult::Match => {
                    self.selection.set(pos);
                    grow(&mut self.range, VoxelBox { min: pos, max: pos });
                    walk.advance(true);
                }
                MatchResult::NotLoaded => {
                    self.unavailable.set(pos);
                    grow(&mut self.range, VoxelBox { min: pos, max: pos });
                    walk.advance(false);
                }
                MatchResult::NoMatch | MatchResult::OutOfBounds => walk.advance(false),
            }
        }

        self.finish();
        Ok(Progress::Complete)
    }

    /// Crop both sets to the range they actually use and stop
    fn finish(&mut self) {
        self.walk = None;
        self.state = DriverState::Complete;
        let region = self.range.unwrap_or(VoxelBox {
            min: self.bounds.min,
            max: self.bounds.min,
        });
        match (self.selection.cropped(region), self.unavailable.cropped(region)) {
            (Ok(selection), Ok(unavailable)) => {
                self.selection = selection;
                self.unavailable = unavailable;
            }
            (Err(e), _) | (_, Err(e)) => warn!(error = %e, "could not shrink selection"),
        }
        debug!(
            origin = %self.selection.origin(),
            size = %self.selection.size(),
            selected = self.selection.count(),
            unavailable = self.unavailable.count(),
            "selection complete"
        );
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Selected voxels so far
    pub fn selection(&self) -> &OriginVoxelSet {
        &self.selection
    }

    /// Voxels that could not be evaluated because their data was not resident
    pub fn unavailable_voxels(&self) -> &OriginVoxelSet {
        &self.unavailable
    }

    pub fn contains_unavailable_voxels(&self) -> bool {
        !self.unavailable.is_empty()
    }

    /// Whether nothing has been selected
    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    /// World position of the selection's local origin
    pub fn world_origin(&self) -> IVec3 {
        self.selection.origin()
    }

    /// Region the running operation is confined to
    pub fn bounds(&self) -> VoxelBox {
        self.bounds
    }

    /// Smallest box enclosing everything selected or unavailable so far
    pub fn occupied_range(&self) -> Option<VoxelBox> {
        self.range
    }

    /// Progress estimate in `[0, 1]`
    pub fn estimated_fraction_complete(&self) -> f32 {
        match (self.state, &self.walk) {
            (DriverState::Idle, _) => 0.0,
            (DriverState::Complete, _) | (_, None) => 1.0,
            (_, Some(walk)) => walk.fraction_complete(),
        }
    }

    /// Wire encoding of the selection
    pub fn write_to_bytes(&self) -> Vec<u8> {
        self.selection.to_bytes()
    }

    /// Take the result, leaving nothing behind
    pub fn into_result(self) -> SelectionResult {
        SelectionResult {
            selection: self.selection,
            unavailable: self.unavailable,
        }
    }
}
