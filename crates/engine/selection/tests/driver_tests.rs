//! Time-sliced selection through the driver

use selection::glam::IVec3;
use selection::{
    select_fill_bounded, ChunkPos, DriverState, Facing, FillMatcher, FillSettings, MemoryWorld, Occupant,
    OriginVoxelSet, Progress, Propagation, SelectionDriver, VoxelBox,
};
use std::time::Duration;

const STONE: Occupant = Occupant::solid(1);

/// Solid slab spanning two chunk columns, the second one not resident
fn split_slab() -> MemoryWorld {
    let mut world = MemoryWorld::new();
    world.fill_box(
        VoxelBox::from_corners(IVec3::new(0, 64, 0), IVec3::new(31, 65, 3)),
        STONE,
    );
    world.set_chunk_resident(ChunkPos::new(1, 0), false);
    world
}

/// Bumpy ground over four chunk columns with one of them missing
fn terrain() -> MemoryWorld {
    let mut world = MemoryWorld::new();
    for x in -16i32..32 {
        for z in -16..16 {
            let top = 40 + (x * x + 3 * z).rem_euclid(5);
            for y in 36..=top {
                world.set(IVec3::new(x, y, z), STONE);
            }
        }
    }
    world.set_chunk_resident(ChunkPos::new(1, -1), false);
    world
}

fn run_sliced(driver: &mut SelectionDriver, world: &MemoryWorld) -> usize {
    let mut calls = 0;
    loop {
        calls += 1;
        if driver.resume(world, Duration::ZERO).unwrap().is_complete() {
            return calls;
        }
    }
}

fn region() -> VoxelBox {
    VoxelBox::from_corners(IVec3::new(0, 60, 0), IVec3::new(31, 70, 15))
}

#[test]
fn test_box_over_unresident_chunk() {
    let world = split_slab();
    let mut driver = SelectionDriver::new();
    let bounds = region();
    driver
        .start_box(bounds.min, bounds.max, FillMatcher::AnyNonEmpty)
        .unwrap();
    assert_eq!(driver.resume(&world, Duration::MAX), Ok(Progress::Complete));

    assert_eq!(driver.selection().count(), 16 * 2 * 4);
    assert!(driver.selection().iter().all(|p| p.x < 16));
    assert!(driver.contains_unavailable_voxels());
    assert_eq!(driver.unavailable_voxels().count(), 16 * 11 * 16);
    assert!(driver
        .unavailable_voxels()
        .iter()
        .all(|p| ChunkPos::containing(p) == ChunkPos::new(1, 0)));

    // cropped to the union of both sets
    assert_eq!(driver.world_origin(), IVec3::new(0, 60, 0));
    assert_eq!(driver.selection().size(), IVec3::new(32, 11, 16));
}

#[test]
fn test_fill_over_unresident_chunk() {
    let world = split_slab();
    let settings = FillSettings::new(
        Propagation::FloodFill,
        IVec3::new(0, 64, 0),
        FillMatcher::AnyNonEmpty,
    );
    let mut driver = SelectionDriver::new();
    driver.start_fill(&settings, region()).unwrap();
    driver.resume(&world, Duration::MAX).unwrap();

    let result = driver.into_result();
    assert_eq!(result.selection.count(), 16 * 2 * 4);
    assert_eq!(result.unavailable.count(), 16 * 11 * 16);
    assert!(result.contains_unavailable_voxels());
}

#[test]
fn test_fill_of_cube_around_seed() {
    let mut world = MemoryWorld::new();
    let seed = IVec3::new(0, 64, 0);
    world.fill_box(
        VoxelBox::from_corners(seed - IVec3::ONE, seed + IVec3::ONE),
        STONE,
    );
    let settings = FillSettings::new(Propagation::FloodFill, seed, FillMatcher::AnyNonEmpty);
    let mut driver = SelectionDriver::new();
    driver.start_unbound_fill(&settings, 2).unwrap();
    run_sliced(&mut driver, &world);

    assert_eq!(driver.selection().count(), 27);
    assert_eq!(driver.world_origin(), seed - IVec3::ONE);
    assert_eq!(driver.selection().size(), IVec3::splat(3));
    assert!(!driver.contains_unavailable_voxels());
}

#[test]
fn test_fill_matches_direct_search() {
    let world = terrain();
    let seed = IVec3::new(2, 38, 2);
    let bounds = VoxelBox::from_corners(IVec3::new(-16, 30, -16), IVec3::new(31, 50, 15));
    let settings = FillSettings::new(Propagation::FloodFill, seed, FillMatcher::AnySolid);

    let mut driver = SelectionDriver::new();
    driver.start_fill(&settings, bounds).unwrap();
    driver.resume(&world, Duration::MAX).unwrap();

    let direct = select_fill_bounded(&world, seed, usize::MAX, false, &FillMatcher::AnySolid, bounds);
    let mut expected = direct.selected.clone();
    expected.sort_by_key(|p| (p.z, p.y, p.x));
    let mut got: Vec<IVec3> = driver
        .selection()
        .iter()
        .filter(|p| ChunkPos::containing(*p) != ChunkPos::new(1, -1))
        .collect();
    got.sort_by_key(|p| (p.z, p.y, p.x));
    assert_eq!(got, expected);
    assert!(driver.contains_unavailable_voxels());
}

#[test]
fn test_sliced_and_single_call_agree() {
    let world = terrain();
    let bounds = VoxelBox::from_corners(IVec3::new(-10, 35, -10), IVec3::new(25, 46, 9));

    for propagation in [Propagation::FloodFill, Propagation::Contour] {
        let mut settings = FillSettings::new(propagation, IVec3::new(0, 40, 0), FillMatcher::AnySolid);
        settings.set_diagonal(true);

        let mut whole = SelectionDriver::new();
        whole.start_fill(&settings, bounds).unwrap();
        whole.resume(&world, Duration::MAX).unwrap();

        let mut sliced = SelectionDriver::new();
        sliced.start_fill(&settings, bounds).unwrap();
        assert!(run_sliced(&mut sliced, &world) > 1);

        assert_eq!(sliced.write_to_bytes(), whole.write_to_bytes());
        assert_eq!(sliced.unavailable_voxels(), whole.unavailable_voxels());
    }

    let mut whole = SelectionDriver::new();
    whole.start_box(bounds.min, bounds.max, FillMatcher::AnyNonEmpty).unwrap();
    whole.resume(&world, Duration::MAX).unwrap();
    let mut sliced = SelectionDriver::new();
    sliced.start_box(bounds.min, bounds.max, FillMatcher::AnyNonEmpty).unwrap();
    run_sliced(&mut sliced, &world);
    assert_eq!(sliced.selection(), whole.selection());
    assert_eq!(sliced.unavailable_voxels(), whole.unavailable_voxels());
}

#[test]
fn test_progress_is_monotonic_for_box() {
    let world = terrain();
    let mut driver = SelectionDriver::new();
    driver
        .start_box(IVec3::new(-16, 36, -16), IVec3::new(31, 44, 15), FillMatcher::AnySolid)
        .unwrap();
    assert_eq!(driver.state(), DriverState::AllInBox);
    let mut last = 0.0;
    loop {
        match driver.resume(&world, Duration::ZERO).unwrap() {
            Progress::InProgress(fraction) => {
                assert!(fraction >= last);
                assert!(fraction <= 1.0);
                last = fraction;
            }
            Progress::Complete => break,
        }
    }
    assert_eq!(driver.state(), DriverState::Complete);
    assert_eq!(driver.estimated_fraction_complete(), 1.0);
}

#[test]
fn test_nothing_selected_leaves_single_voxel() {
    let world = MemoryWorld::new();
    let mut driver = SelectionDriver::new();
    driver
        .start_box(IVec3::new(5, 10, 5), IVec3::new(9, 12, 9), FillMatcher::AnySolid)
        .unwrap();
    driver.resume(&world, Duration::MAX).unwrap();
    assert!(driver.is_empty());
    assert_eq!(driver.world_origin(), IVec3::new(5, 10, 5));
    assert_eq!(driver.selection().size(), IVec3::ONE);

    let decoded = OriginVoxelSet::from_bytes(&driver.write_to_bytes()).unwrap();
    assert_eq!(&decoded, driver.selection());
}

#[test]
fn test_follower_at_chunk_edge_marks_single_voxels() {
    // open column at x = 15 whose east neighbours live in a missing chunk
    let mut world = MemoryWorld::new();
    world.set(IVec3::new(15, 64, 0), STONE);
    world.set_chunk_resident(ChunkPos::new(1, 0), false);

    let mut settings = FillSettings::new(
        Propagation::Contour,
        IVec3::new(14, 64, 0),
        FillMatcher::ContourFollower { normal: Facing::East },
    );
    settings.set_normal(Facing::East);
    settings.set_diagonal(true);

    let mut driver = SelectionDriver::new();
    driver
        .start_fill(&settings, VoxelBox::from_corners(IVec3::new(0, 60, 0), IVec3::new(31, 70, 0)))
        .unwrap();
    run_sliced(&mut driver, &world);

    let selected: Vec<IVec3> = driver.selection().iter().collect();
    assert_eq!(selected, vec![IVec3::new(14, 64, 0)]);

    let mut unavailable: Vec<IVec3> = driver.unavailable_voxels().iter().collect();
    unavailable.sort_by_key(|p| p.y);
    assert_eq!(unavailable, vec![IVec3::new(15, 63, 0), IVec3::new(15, 65, 0)]);
    assert!(unavailable.iter().all(|p| !driver.selection().contains(*p)));
    assert!(driver
        .unavailable_voxels()
        .iter()
        .all(|p| ChunkPos::containing(p) != ChunkPos::new(1, 0)));
    assert_eq!(driver.world_origin(), IVec3::new(14, 63, 0));
}
