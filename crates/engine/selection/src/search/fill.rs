use super::{expand, BreadthSearch, NeighborTable, SearchOutcome};
use crate::bounds::VoxelBox;
use crate::matcher::{FillMatcher, MatchResult};
use crate::world::{VoxelWorld, WORLD_MAX_Y, WORLD_MIN_Y};
use glam::IVec3;
use std::collections::HashSet;

/// Flood fill from `seed` within an inclusive box
///
/// Spreads 6-connected, or 26-connected with `diagonal`, selecting voxels in
/// order of graph distance from the seed. Nothing is selected unless the seed
/// itself matches.
pub fn select_fill_bounded<W: VoxelWorld + ?Sized>(
    world: &W,
    seed: IVec3,
    max_count: usize,
    diagonal: bool,
    matcher: &FillMatcher,
    bounds: VoxelBox,
) -> SearchOutcome {
    let mut outcome = SearchOutcome::default();
    if max_count == 0 || !bounds.contains(seed) {
        return outcome;
    }
    match matcher.evaluate(world, seed) {
        MatchResult::Match => outcome.selected.push(seed),
        MatchResult::NotLoaded => {
            outcome.unavailable.push(seed);
            return outcome;
        }
        MatchResult::NoMatch | MatchResult::OutOfBounds => return outcome,
    }

    let mut search = BreadthSearch::with_seed(seed, NeighborTable::flood(diagonal), bounds);
    let mut visited = HashSet::from([seed]);
    expand(world, matcher, &mut search, &mut visited, max_count, &mut outcome);
    outcome
}

/// Flood fill limited only by the valid Y range
pub fn select_fill_unbounded<W: VoxelWorld + ?Sized>(
    world: &W,
    seed: IVec3,
    max_count: usize,
    diagonal: bool,
    matcher: &FillMatcher,
) -> SearchOutcome {
    let bounds = VoxelBox {
        min: IVec3::new(i32::MIN, WORLD_MIN_Y, i32::MIN),
        max: IVec3::new(i32::MAX, WORLD_MAX_Y, i32::MAX),
    };
    select_fill_bounded(world, seed, max_count, diagonal, matcher, bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{MemoryWorld, Occupant};

    fn cube(half: i32) -> MemoryWorld {
        let mut world = MemoryWorld::new();
        world.fill_box(
            VoxelBox::from_corners(IVec3::new(-half, 10 - half, -half), IVec3::new(half, 10 + half, half)),
            Occupant::solid(1),
        );
        world
    }

    fn manhattan(a: IVec3, b: IVec3) -> i32 {
        (a - b).abs().element_sum()
    }

    #[test]
    fn test_fills_cube() {
        let world = cube(1);
        let seed = IVec3::new(0, 10, 0);
        let outcome = select_fill_unbounded(&world, seed, 100, false, &FillMatcher::AnyNonEmpty);
        assert_eq!(outcome.selected.len(), 27);
        assert_eq!(outcome.selected[0], seed);

        let diagonal = select_fill_unbounded(&world, seed, 100, true, &FillMatcher::AnyNonEmpty);
        assert_eq!(diagonal.selected.len(), 27);
    }

    #[test]
    fn test_insertion_order_follows_distance() {
        let world = cube(3);
        let seed = IVec3::new(0, 10, 0);
        let outcome = select_fill_unbounded(&world, seed, 1000, false, &FillMatcher::AnySolid);
        assert_eq!(outcome.selected.len(), 7 * 7 * 7);
        let distances: Vec<i32> = outcome.selected.iter().map(|p| manhattan(*p, seed)).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_cap_and_bounds() {
        let world = cube(3);
        let seed = IVec3::new(0, 10, 0);
        let capped = select_fill_unbounded(&world, seed, 7, false, &FillMatcher::AnySolid);
        assert_eq!(capped.selected.len(), 7);

        let bounds = VoxelBox::from_corners(IVec3::new(0, 10, 0), IVec3::new(1, 11, 1));
        let bounded = select_fill_bounded(&world, seed, 100, true, &FillMatcher::AnySolid, bounds);
        assert_eq!(bounded.selected.len(), 8);
        assert!(bounded.selected.iter().all(|p| bounds.contains(*p)));
    }

    #[test]
    fn test_seed_must_match() {
        let world = cube(1);
        let outcome = select_fill_unbounded(&world, IVec3::new(5, 10, 0), 100, false, &FillMatcher::AnyNonEmpty);
        assert!(outcome.is_empty());
        let outcome = select_fill_unbounded(&world, IVec3::new(0, 10, 0), 0, false, &FillMatcher::AnyNonEmpty);
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_unbounded_fill_stays_in_world() {
        let mut world = MemoryWorld::new();
        world.fill_box(
            VoxelBox::from_corners(IVec3::new(0, 0, 0), IVec3::new(0, 2, 0)),
            Occupant::solid(1),
        );
        let outcome = select_fill_unbounded(&world, IVec3::ZERO, 100, true, &FillMatcher::AnyNonEmpty);
        assert_eq!(outcome.selected.len(), 3);
    }
}
