//! Straight-line selection

use crate::geometry::{deflect, snap_to_canonical_direction, to_delta};
use crate::world::{classify, ChunkPos, VoxelWorld, WORLD_MAX_Y, WORLD_MIN_Y};
use glam::{IVec3, Vec3};

/// What a line does when it runs into something solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// End the line at the first obstacle (deflecting once on the first step)
    #[default]
    StopAtSolid,
    /// Ignore obstacles
    ContinueThroughSolid,
}

/// Solid or fluid voxels block a line; anything outside `[0,255]` does not
pub fn is_obstacle<W: VoxelWorld + ?Sized>(world: &W, pos: IVec3) -> bool {
    classify(world, pos).is_solid_or_fluid()
}

#[inline]
fn is_walkable<W: VoxelWorld + ?Sized>(world: &W, pos: IVec3) -> bool {
    (WORLD_MIN_Y..=WORLD_MAX_Y).contains(&pos.y) && world.is_chunk_resident(ChunkPos::containing(pos))
}

/// Select up to `max_count` voxels in a straight line from `start`
///
/// The direction is snapped to one of the 6 axes (or 26 directions with
/// `allow_diagonal`); a degenerate direction selects nothing. The start voxel
/// always comes first. The line ends at the count, at the edge of the valid
/// Y range, at a non-resident chunk, or at the first obstacle when stopping at
/// solids. An obstacle on the very first step gets one chance to slide along
/// the surface via [`deflect`].
pub fn select_line<W: VoxelWorld + ?Sized>(
    world: &W,
    start: IVec3,
    direction: Vec3,
    max_count: usize,
    allow_diagonal: bool,
    policy: CollisionPolicy,
) -> Vec<IVec3> {
    if max_count == 0 {
        return Vec::new();
    }
    let Some(snapped) = snap_to_canonical_direction(direction, allow_diagonal) else {
        return Vec::new();
    };
    let mut delta = to_delta(snapped);

    let mut line = Vec::with_capacity(max_count.min(256));
    line.push(start);
    let mut next = start;
    while line.len() < max_count {
        next += delta;
        if !is_walkable(world, next) {
            break;
        }
        if policy == CollisionPolicy::StopAtSolid && is_obstacle(world, next) {
            if line.len() > 1 {
                break;
            }
            delta = deflect(start, direction, delta, |p| is_obstacle(world, p));
            next = start + delta;
            if !is_walkable(world, next) || is_obstacle(world, next) {
                break;
            }
        }
        line.push(next);
    }
    line
}
