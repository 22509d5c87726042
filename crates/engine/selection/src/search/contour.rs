//! Contour selection: a breadth search confined to one world-aligned plane
//!
//! Starting from the seed, the search follows matching voxels across the
//! plane perpendicular to `normal`, closest (by steps along the contour)
//! first. With a [`FillMatcher::ContourFollower`] this selects the open layer
//! lying on top of a surface; with an occupant matcher it selects the top
//! layer of the surface itself.

use super::{expand, BreadthSearch, NeighborTable, SearchOutcome, SearchPlane};
use crate::bounds::VoxelBox;
use crate::facing::Facing;
use crate::matcher::FillMatcher;
use crate::world::{VoxelWorld, WORLD_MAX_Y, WORLD_MIN_Y};
use glam::IVec3;
use std::collections::HashSet;

/// Contour search limited to an inclusive box
///
/// The seed is always selected first, whatever the matcher says about it,
/// as long as it lies inside `bounds`.
pub fn select_contour_bounded<W: VoxelWorld + ?Sized>(
    world: &W,
    seed: IVec3,
    max_count: usize,
    diagonal: bool,
    matcher: &FillMatcher,
    normal: Facing,
    bounds: VoxelBox,
) -> SearchOutcome {
    let mut outcome = SearchOutcome::default();
    if max_count == 0 || !bounds.contains(seed) {
        return outcome;
    }

    let table = NeighborTable::contour(SearchPlane::from_normal(normal), diagonal);
    let mut search = BreadthSearch::with_seed(seed, table, bounds);
    let mut visited = HashSet::from([seed]);
    outcome.selected.push(seed);
    expand(world, matcher, &mut search, &mut visited, max_count, &mut outcome);
    outcome
}

/// Contour search limited only by the valid Y range
pub fn select_contour_unbounded<W: VoxelWorld + ?Sized>(
    world: &W,
    seed: IVec3,
    max_count: usize,
    diagonal: bool,
    matcher: &FillMatcher,
    normal: Facing,
) -> SearchOutcome {
    let bounds = VoxelBox {
        min: IVec3::new(i32::MIN, WORLD_MIN_Y, i32::MIN),
        max: IVec3::new(i32::MAX, WORLD_MAX_Y, i32::MAX),
    };
    select_contour_bounded(world, seed, max_count, diagonal, matcher, normal, bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{ChunkPos, MemoryWorld, Occupant};

    /// Stone floor at y = 9 over x, z in [-5, 5], with a wall at x = 3
    fn terrace() -> MemoryWorld {
        let mut world = MemoryWorld::new();
        world.fill_box(
            VoxelBox::from_corners(IVec3::new(-5, 9, -5), IVec3::new(5, 9, 5)),
            Occupant::solid(1),
        );
        world.fill_box(
            VoxelBox::from_corners(IVec3::new(3, 10, -5), IVec3::new(3, 12, 5)),
            Occupant::solid(1),
        );
        world
    }

    fn follower() -> FillMatcher {
        FillMatcher::ContourFollower {
            normal: Facing::Down,
        }
    }

    #[test]
    fn test_follows_floor_up_to_wall() {
        let world = terrace();
        let outcome = select_contour_unbounded(&world, IVec3::new(0, 10, 0), 1000, false, &follower(), Facing::Down);
        // x in [-5, 2], z in [-5, 5]
        assert_eq!(outcome.selected.len(), 8 * 11);
        assert!(outcome.selected.iter().all(|p| p.y == 10 && p.x <= 2));
        assert!(outcome.unavailable.is_empty());
    }

    #[test]
    fn test_breadth_order_and_cap() {
        let world = terrace();
        let outcome = select_contour_unbounded(&world, IVec3::new(0, 10, 0), 5, false, &follower(), Facing::Up);
        assert_eq!(
            outcome.selected,
            vec![
                IVec3::new(0, 10, 0),
                IVec3::new(0, 10, 1),
                IVec3::new(-1, 10, 0),
                IVec3::new(0, 10, -1),
                IVec3::new(1, 10, 0),
            ]
        );
    }

    #[test]
    fn test_bounds_and_zero_count() {
        let world = terrace();
        let bounds = VoxelBox::from_corners(IVec3::new(-1, 10, -1), IVec3::new(1, 10, 1));
        let outcome = select_contour_bounded(&world, IVec3::new(0, 10, 0), 100, true, &follower(), Facing::Down, bounds);
        assert_eq!(outcome.selected.len(), 9);

        let outside = select_contour_bounded(&world, IVec3::new(4, 10, 0), 100, true, &follower(), Facing::Down, bounds);
        assert!(outside.is_empty());

        let none = select_contour_unbounded(&world, IVec3::new(0, 10, 0), 0, true, &follower(), Facing::Down);
        assert!(none.is_empty());
    }

    #[test]
    fn test_unresident_neighbours_are_reported() {
        let mut world = MemoryWorld::new();
        world.fill_box(
            VoxelBox::from_corners(IVec3::new(12, 9, 0), IVec3::new(20, 9, 0)),
            Occupant::solid(1),
        );
        world.set_chunk_resident(ChunkPos::new(1, 0), false);
        let outcome = select_contour_unbounded(&world, IVec3::new(12, 10, 0), 100, false, &follower(), Facing::Down);
        assert_eq!(
            outcome.selected,
            vec![IVec3::new(12, 10, 0), IVec3::new(13, 10, 0), IVec3::new(14, 10, 0), IVec3::new(15, 10, 0)]
        );
        assert_eq!(outcome.unavailable, vec![IVec3::new(16, 10, 0)]);
    }

    #[test]
    fn test_unbounded_contour_stays_inside_world() {
        // a follower looking up from under the y = 0 floor would match at y = -1
        let mut world = MemoryWorld::new();
        world.fill_box(
            VoxelBox::from_corners(IVec3::new(-3, 0, 0), IVec3::new(3, 0, 0)),
            Occupant::solid(1),
        );
        let under = FillMatcher::ContourFollower { normal: Facing::Up };
        let seed = IVec3::new(4, 0, 0);
        let outcome = select_contour_unbounded(&world, seed, 100, true, &under, Facing::East);
        assert_eq!(outcome.selected, vec![seed]);

        let below = select_contour_unbounded(&world, IVec3::new(0, -1, 0), 100, true, &under, Facing::East);
        assert!(below.is_empty());
    }
}
